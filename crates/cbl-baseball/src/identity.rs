// Player identifier map.
//
// Parses the published identity spreadsheet (HTML export) into a lookup table
// keyed by FanGraphs ID. The export carries a decorative header row of column
// letters, then the real header row, and a leading row-number column.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

const COL_FANGRAPHS_ID: &str = "IDFANGRAPHS";
const COL_BATS: &str = "BATS";
const COL_THROWS: &str = "THROWS";
const COL_MLB_NAME: &str = "MLBNAME";
const COL_MLB_ID: &str = "MLBID";

/// Index of the header row within the exported table.
const HEADER_ROW: usize = 1;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("no table found in identity sheet")]
    NoTable,

    #[error("identity sheet has no header row")]
    NoHeader,

    #[error("identity sheet is missing column `{0}`")]
    MissingColumn(&'static str),
}

/// One row of the identifier map.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerIdentity {
    pub fangraphs_id: Option<i64>,
    pub bats: Option<String>,
    pub throws: Option<String>,
    pub mlb_name: Option<String>,
    pub mlb_id: Option<f64>,
}

/// Identifier map with first-match lookup by FanGraphs ID.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    rows: Vec<PlayerIdentity>,
    by_fangraphs_id: HashMap<i64, usize>,
}

impl IdentityMap {
    pub fn from_rows(rows: Vec<PlayerIdentity>) -> Self {
        let mut by_fangraphs_id = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            if let Some(id) = row.fangraphs_id {
                by_fangraphs_id.entry(id).or_insert(idx);
            }
        }
        Self {
            rows,
            by_fangraphs_id,
        }
    }

    /// First identity row carrying `fangraphs_id`.
    pub fn get(&self, fangraphs_id: i64) -> Option<&PlayerIdentity> {
        self.by_fangraphs_id
            .get(&fangraphs_id)
            .map(|&idx| &self.rows[idx])
    }

    pub fn rows(&self) -> &[PlayerIdentity] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Parse a numeric cell, ignoring surrounding whitespace and thousands
/// separators. Anything unparsable or non-finite is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an external stats ID. Integral floats such as `"1234.0"` are
/// accepted; fractional or non-numeric values are `None`.
pub fn parse_stats_id(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if let Ok(id) = cleaned.parse::<i64>() {
        return Some(id);
    }
    let v = parse_number(&cleaned)?;
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// HTML parsing
// ---------------------------------------------------------------------------

fn selector(css: &str) -> Result<Selector, IdentityError> {
    Selector::parse(css).map_err(|e| IdentityError::Selector {
        selector: css.to_string(),
        message: format!("{e:?}"),
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Parse the published identity sheet into an `IdentityMap`.
///
/// Only the first `<table>` in the document is read. Rows whose cells are all
/// empty are dropped, then the leading row-number column is discarded.
pub fn parse_identity_html(html: &str) -> Result<IdentityMap, IdentityError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or(IdentityError::NoTable)?;

    let grid: Vec<Vec<String>> = table
        .select(&row_sel)
        .map(|tr| tr.select(&cell_sel).map(cell_text).collect())
        .collect();

    let mut rows = grid.into_iter().skip(HEADER_ROW);
    let header: Vec<String> = rows
        .next()
        .ok_or(IdentityError::NoHeader)?
        .into_iter()
        .skip(1)
        .collect();

    let column = |name: &'static str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or(IdentityError::MissingColumn(name))
    };
    let fg_col = column(COL_FANGRAPHS_ID)?;
    let bats_col = column(COL_BATS)?;
    let throws_col = column(COL_THROWS)?;
    let name_col = column(COL_MLB_NAME)?;
    let mlb_id_col = column(COL_MLB_ID)?;

    let mut identities = Vec::new();
    let mut unparsed_ids = 0usize;
    for raw in rows {
        if raw.iter().all(|c| c.is_empty()) {
            continue;
        }
        let fields: Vec<&str> = raw.iter().skip(1).map(String::as_str).collect();
        let field = |idx: usize| fields.get(idx).copied().unwrap_or("");

        let fangraphs_id = parse_stats_id(field(fg_col));
        if fangraphs_id.is_none() && !field(fg_col).is_empty() {
            unparsed_ids += 1;
        }

        identities.push(PlayerIdentity {
            fangraphs_id,
            bats: non_empty(field(bats_col)),
            throws: non_empty(field(throws_col)),
            mlb_name: non_empty(field(name_col)),
            mlb_id: parse_number(field(mlb_id_col)),
        });
    }

    if unparsed_ids > 0 {
        warn!("{unparsed_ids} identity rows have a non-numeric {COL_FANGRAPHS_ID}");
    }
    debug!("parsed {} identity rows", identities.len());

    Ok(IdentityMap::from_rows(identities))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(body_rows: &str) -> String {
        format!(
            "<html><body><table class=\"waffle\">\
             <thead><tr><th></th><th>A</th><th>B</th><th>C</th><th>D</th><th>E</th><th>F</th></tr></thead>\
             <tbody>\
             <tr><th>1</th><td>IDPLAYER</td><td>IDFANGRAPHS</td><td>BATS</td><td>THROWS</td><td>MLBNAME</td><td>MLBID</td></tr>\
             {body_rows}\
             </tbody></table>\
             <table><tr><td>second table ignored</td></tr></table></body></html>"
        )
    }

    #[test]
    fn parses_rows_after_second_header() {
        let html = sheet(
            "<tr><th>2</th><td>troutmi01</td><td>10155</td><td>R</td><td>R</td><td>Mike Trout</td><td>545361</td></tr>\
             <tr><th>3</th><td>judgeaa01</td><td>15640</td><td>R</td><td>R</td><td>Aaron Judge</td><td>592450</td></tr>",
        );
        let map = parse_identity_html(&html).unwrap();
        assert_eq!(map.len(), 2);

        let trout = map.get(10155).unwrap();
        assert_eq!(trout.mlb_name.as_deref(), Some("Mike Trout"));
        assert_eq!(trout.bats.as_deref(), Some("R"));
        assert_eq!(trout.throws.as_deref(), Some("R"));
        assert_eq!(trout.mlb_id, Some(545361.0));
    }

    #[test]
    fn drops_fully_empty_rows() {
        let html = sheet(
            "<tr><th></th><td></td><td></td><td></td><td></td><td></td><td></td></tr>\
             <tr><th>3</th><td>x</td><td>1</td><td>L</td><td>L</td><td>Some One</td><td>1</td></tr>",
        );
        let map = parse_identity_html(&html).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn unparsable_id_becomes_none() {
        let html = sheet(
            "<tr><th>2</th><td>x</td><td>sa12345</td><td>L</td><td>L</td><td>Prospect Guy</td><td></td></tr>\
             <tr><th>3</th><td>y</td><td>19,755</td><td>S</td><td>R</td><td>Switch Hitter</td><td>660,271</td></tr>",
        );
        let map = parse_identity_html(&html).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.rows()[0].fangraphs_id, None);
        assert_eq!(map.rows()[0].mlb_id, None);
        assert_eq!(map.get(19755).unwrap().mlb_id, Some(660271.0));
    }

    #[test]
    fn duplicate_ids_resolve_to_first_row() {
        let html = sheet(
            "<tr><th>2</th><td>a</td><td>7</td><td>L</td><td>L</td><td>First Match</td><td>1</td></tr>\
             <tr><th>3</th><td>b</td><td>7</td><td>R</td><td>R</td><td>Second Match</td><td>2</td></tr>",
        );
        let map = parse_identity_html(&html).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(7).unwrap().mlb_name.as_deref(), Some("First Match"));
    }

    #[test]
    fn short_rows_pad_with_none() {
        let html = sheet("<tr><th>2</th><td>a</td><td>8</td><td>L</td></tr>");
        let map = parse_identity_html(&html).unwrap();
        let row = map.get(8).unwrap();
        assert_eq!(row.bats.as_deref(), Some("L"));
        assert_eq!(row.throws, None);
        assert_eq!(row.mlb_name, None);
    }

    #[test]
    fn missing_column_is_an_error() {
        let html = "<table><tr><th></th><th>A</th></tr>\
                    <tr><th>1</th><td>IDFANGRAPHS</td></tr></table>";
        let err = parse_identity_html(html).unwrap_err();
        assert!(matches!(err, IdentityError::MissingColumn("BATS")));
    }

    #[test]
    fn no_table_is_an_error() {
        let err = parse_identity_html("<html><body><p>gone</p></body></html>").unwrap_err();
        assert!(matches!(err, IdentityError::NoTable));
    }

    #[test]
    fn stats_id_parsing() {
        assert_eq!(parse_stats_id("12345"), Some(12345));
        assert_eq!(parse_stats_id(" 12345.0 "), Some(12345));
        assert_eq!(parse_stats_id("1,234"), Some(1234));
        assert_eq!(parse_stats_id("12.5"), None);
        assert_eq!(parse_stats_id("sa3011"), None);
        assert_eq!(parse_stats_id(""), None);
    }
}
