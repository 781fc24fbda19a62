// League roster supplement loading.
//
// Locally maintained CSVs (one for batters, one for pitchers) that attach
// league-specific attributes to a FanGraphs ID: card label and tier, league
// position eligibility, and optionally team and age.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::identity::{parse_number, parse_stats_id};
use crate::schema::NOT_CARDED;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// League attributes for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub fangraphs_id: Option<i64>,
    /// Displayed card label.
    pub card: Option<String>,
    /// Card tier; the literal `"NC"` marks an uncarded player.
    pub card_tier: Option<String>,
    /// Slash-delimited position eligibility, e.g. `"1B/OF"`.
    pub position: Option<String>,
    pub team: Option<String>,
    pub age: Option<f64>,
}

impl RosterEntry {
    /// True unless the card tier is exactly `"NC"`. A missing tier counts as
    /// carded.
    pub fn is_carded(&self) -> bool {
        self.card_tier.as_deref() != Some(NOT_CARDED)
    }
}

/// Raw roster CSV row. Every field is optional so that a single bad cell only
/// nulls that value instead of dropping the row.
#[derive(Debug, Deserialize)]
struct RawRosterRow {
    #[serde(rename = "FanGraph ID", default)]
    fangraphs_id: Option<String>,
    #[serde(rename = "CBLCard", default)]
    card: Option<String>,
    #[serde(rename = "CBL5Percent", default)]
    card_tier: Option<String>,
    #[serde(rename = "CBLPos", default)]
    position: Option<String>,
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(rename = "Age", default)]
    age: Option<String>,
}

fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        match result {
            Ok(raw) => {
                let fangraphs_id = raw.fangraphs_id.as_deref().and_then(parse_stats_id);
                if fangraphs_id.is_none() {
                    debug!(
                        "roster row {:?} has no usable FanGraph ID",
                        raw.card.as_deref().unwrap_or("")
                    );
                }
                entries.push(RosterEntry {
                    fangraphs_id,
                    card: raw.card,
                    card_tier: raw.card_tier,
                    position: raw.position,
                    team: raw.team,
                    age: raw.age.as_deref().and_then(parse_number),
                });
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(entries)
}

/// Load a roster supplement CSV.
pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, RosterError> {
    let file = std::fs::File::open(path).map_err(|e| RosterError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_roster_from_reader(file).map_err(|e| RosterError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}
