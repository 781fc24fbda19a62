// Plain in-memory tables handed to the presentation layer.
//
// A `Table` is an ordered list of column names plus rows of `Cell`s. Display
// formatting lives beside the data as a `ColumnFormat` descriptor per column,
// so a renderer never needs per-column special cases.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("row has {got} cells but table has {expected} columns")]
    RowWidth { expected: usize, got: usize },

    #[error("column `{0}` already exists")]
    DuplicateColumn(String),

    #[error("column `{name}` has {got} cells but table has {expected} rows")]
    ColumnHeight {
        name: String,
        expected: usize,
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One value in a table. `Null` stands in for anything missing or
/// unparsable upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell; text and booleans are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(f) if !f.is_nan() => Cell::Float(f),
            _ => Cell::Null,
        }
    }
}

impl From<Option<i64>> for Cell {
    fn from(v: Option<i64>) -> Self {
        v.map_or(Cell::Null, Cell::Int)
    }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        v.map_or(Cell::Null, Cell::Text)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Look up a cell by row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// All cells of one column, top to bottom. `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Append a column; `cells` must have one entry per existing row.
    pub fn push_column(&mut self, name: &str, cells: Vec<Cell>) -> Result<(), TableError> {
        if self.column_index(name).is_some() {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        if cells.len() != self.rows.len() {
            return Err(TableError::ColumnHeight {
                name: name.to_string(),
                expected: self.rows.len(),
                got: cells.len(),
            });
        }
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }

    /// Remove the named columns. Names that are not present are ignored.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&RowView<'_>) -> bool,
    {
        let columns = &self.columns;
        self.rows.retain(|cells| keep(&RowView { columns, cells }));
    }

    pub fn row_views(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |cells| RowView {
            columns: &self.columns,
            cells,
        })
    }
}

/// Borrowed view of a single row with by-name access.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.cells.get(idx)
    }
}

// ---------------------------------------------------------------------------
// Display formatting descriptors
// ---------------------------------------------------------------------------

/// How one column should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFormat {
    pub label: String,
    /// Fixed number of decimal places for numeric cells.
    pub precision: Option<usize>,
    /// Append a `%` suffix (values are already scaled to 0-100).
    pub percent: bool,
    /// Rendered ahead of all other columns.
    pub pinned: bool,
    /// Cell text is a URL. Rendered after all other columns, untruncated
    /// and left-aligned.
    pub link: bool,
}

impl ColumnFormat {
    pub fn plain(label: &str) -> Self {
        Self {
            label: label.to_string(),
            precision: None,
            percent: false,
            pinned: false,
            link: false,
        }
    }

    pub fn number(label: &str, precision: usize) -> Self {
        Self {
            precision: Some(precision),
            ..Self::plain(label)
        }
    }

    pub fn percent(label: &str, precision: usize) -> Self {
        Self {
            precision: Some(precision),
            percent: true,
            ..Self::plain(label)
        }
    }

    pub fn pinned(label: &str) -> Self {
        Self {
            pinned: true,
            ..Self::plain(label)
        }
    }

    pub fn link(label: &str) -> Self {
        Self {
            link: true,
            ..Self::plain(label)
        }
    }

    /// Render a cell according to this descriptor.
    pub fn render(&self, cell: &Cell) -> String {
        match (cell.as_f64(), self.precision) {
            (Some(v), Some(p)) if self.percent => format!("{v:.p$}%"),
            (Some(v), Some(p)) => format!("{v:.p$}"),
            _ => render_plain(cell),
        }
    }
}

/// Column name → display descriptor. Columns without an entry render plainly.
pub type ColumnFormats = HashMap<String, ColumnFormat>;

/// Render a cell with no column-specific formatting.
pub fn render_plain(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Bool(b) => b.to_string(),
        Cell::Int(v) => v.to_string(),
        Cell::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
            format!("{v:.0}")
        }
        Cell::Float(v) => v.to_string(),
        Cell::Text(s) => s.clone(),
    }
}

/// Render a cell using the descriptor registered for `column`, if any.
pub fn render_cell(formats: &ColumnFormats, column: &str, cell: &Cell) -> String {
    match formats.get(column) {
        Some(format) => format.render(cell),
        None => render_plain(cell),
    }
}

/// Header text for `column`: the descriptor label, or the column name.
pub fn header_label<'a>(formats: &'a ColumnFormats, column: &'a str) -> &'a str {
    formats.get(column).map_or(column, |f| f.label.as_str())
}
