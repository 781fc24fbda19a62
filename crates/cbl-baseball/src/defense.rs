// Defensive appearance table.
//
// Reads the league's fielding CSV, keeps batter rows only and exposes games
// per fielding position.

use cbl_core::table::{Cell, Table, TableError};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::identity::parse_number;

/// `B/P` value marking a batter row.
pub const BATTER_TAG: &str = "BAT";

pub const LEAGUE: &str = "LG";
pub const CLUB: &str = "TM";

/// Fielding positions, in output order.
pub const FIELDING_POSITIONS: [&str; 9] = ["P", "C", "1B", "2B", "3B", "SS", "LF", "CF", "RF"];

#[derive(Debug, thiserror::Error)]
pub enum DefenseError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Deserialize)]
struct RawDefenseRow {
    #[serde(rename = "B/P", default)]
    role: Option<String>,
    #[serde(rename = "LG", default)]
    league: Option<String>,
    #[serde(rename = "TM", default)]
    team: Option<String>,
    #[serde(rename = "FIRST", default)]
    first: Option<String>,
    #[serde(rename = "LAST", default)]
    last: Option<String>,
    #[serde(rename = "P", default)]
    p: Option<String>,
    #[serde(rename = "C", default)]
    c: Option<String>,
    #[serde(rename = "1B", default)]
    first_base: Option<String>,
    #[serde(rename = "2B", default)]
    second_base: Option<String>,
    #[serde(rename = "3B", default)]
    third_base: Option<String>,
    #[serde(rename = "SS", default)]
    ss: Option<String>,
    #[serde(rename = "LF", default)]
    lf: Option<String>,
    #[serde(rename = "CF", default)]
    cf: Option<String>,
    #[serde(rename = "RF", default)]
    rf: Option<String>,
}

impl RawDefenseRow {
    fn counts(&self) -> [&Option<String>; 9] {
        [
            &self.p,
            &self.c,
            &self.first_base,
            &self.second_base,
            &self.third_base,
            &self.ss,
            &self.lf,
            &self.cf,
            &self.rf,
        ]
    }
}

/// Output columns of the defense table.
pub fn defense_columns() -> Vec<&'static str> {
    let mut cols = vec![LEAGUE, CLUB, crate::schema::NAME];
    cols.extend_from_slice(&FIELDING_POSITIONS);
    cols
}

fn defense_from_reader<R: Read>(rdr: R, source: &str) -> Result<Table, DefenseError> {
    let mut reader = csv::Reader::from_reader(rdr);
    reader.headers().map_err(|e| DefenseError::Csv {
        path: source.to_string(),
        source: e,
    })?;

    let mut table = Table::new(defense_columns());
    let mut pitcher_rows = 0usize;

    for result in reader.deserialize::<RawDefenseRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed defense row: {}", e);
                continue;
            }
        };
        if raw.role.as_deref() != Some(BATTER_TAG) {
            pitcher_rows += 1;
            continue;
        }

        let name = match (&raw.first, &raw.last) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        };

        let mut cells = vec![
            Cell::from(raw.league.clone()),
            Cell::from(raw.team.clone()),
            Cell::from(name),
        ];
        cells.extend(
            raw.counts()
                .iter()
                .map(|v| Cell::from(v.as_deref().and_then(parse_number))),
        );
        table.push_row(cells)?;
    }

    debug!(batters = table.len(), excluded = pitcher_rows, "loaded defense table");
    Ok(table)
}

/// Load the defense CSV as a table of batter rows.
pub fn load_defense(path: &Path) -> Result<Table, DefenseError> {
    let file = std::fs::File::open(path).map_err(|e| DefenseError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    defense_from_reader(file, &path.display().to_string())
}
