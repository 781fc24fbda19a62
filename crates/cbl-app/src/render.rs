// Plain-text and CSV output of a formatted table.

use std::io::Write;

use cbl_core::table::{header_label, render_cell, ColumnFormats, Table};

/// Column indices in display order: pinned columns, then the rest, then
/// links. Table order is kept within each group.
fn display_order(table: &Table, formats: &ColumnFormats) -> Vec<usize> {
    let rank = |column: &String| match formats.get(column) {
        Some(f) if f.pinned => 0,
        Some(f) if f.link => 2,
        _ => 1,
    };
    let mut order: Vec<usize> = (0..table.columns().len()).collect();
    order.sort_by_key(|&i| rank(&table.columns()[i]));
    order
}

fn is_link(formats: &ColumnFormats, column: &str) -> bool {
    formats.get(column).is_some_and(|f| f.link)
}

/// Header labels and formatted cell text, row by row, in display order.
fn formatted(table: &Table, formats: &ColumnFormats) -> (Vec<String>, Vec<Vec<String>>) {
    let order = display_order(table, formats);
    let columns = table.columns();
    let headers = order
        .iter()
        .map(|&i| header_label(formats, &columns[i]).to_string())
        .collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            order
                .iter()
                .map(|&i| render_cell(formats, &columns[i], &row[i]))
                .collect()
        })
        .collect();
    (headers, rows)
}

/// Render `table` as space-aligned text. Numeric-looking cells are
/// right-aligned, everything else (and every link) left-aligned.
pub fn render_text(table: &Table, formats: &ColumnFormats) -> String {
    let (headers, rows) = formatted(table, formats);
    let links: Vec<bool> = display_order(table, formats)
        .into_iter()
        .map(|i| is_link(formats, &table.columns()[i]))
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{h:<w$}"))
        .collect();
    out.push_str(header_line.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(widths.iter().zip(&links))
            .map(|(cell, (&w, &link))| {
                if !link && looks_numeric(cell) {
                    format!("{cell:>w$}")
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn looks_numeric(s: &str) -> bool {
    !s.is_empty() && s.trim_end_matches('%').parse::<f64>().is_ok()
}

/// Write `table` as CSV with display labels and formatted cells.
pub fn write_csv<W: Write>(
    table: &Table,
    formats: &ColumnFormats,
    writer: W,
) -> Result<(), csv::Error> {
    let (headers, rows) = formatted(table, formats);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&headers)?;
    for row in &rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
