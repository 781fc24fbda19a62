// Full-season leaderboard parsing.
//
// The stats provider returns `{"data": [ {...}, ... ]}` with one object per
// player. Keys are mapped onto the display column names used by the tables;
// values that are not numbers (or numeric strings) are dropped, but the key
// is still recorded so an all-null column is told apart from a missing one.

use scraper::Html;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

use crate::identity::{parse_number, parse_stats_id};
use crate::schema::StatKind;

/// Provider key → display column, where the two differ.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("xAVG", "xBA"),
    ("sp_stuff", "Stuff+"),
    ("sp_location", "Location+"),
    ("sp_pitching", "Pitching+"),
];

const ID_KEYS: &[&str] = &["playerid", "IDfg"];

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("malformed leaderboard response: {0}")]
    Json(#[from] serde_json::Error),
}

/// One player's season line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeasonStatLine {
    pub fangraphs_id: i64,
    pub name: Option<String>,
    pub team: Option<String>,
    pub age: Option<f64>,
    values: HashMap<String, f64>,
    present: HashSet<String>,
}

impl SeasonStatLine {
    pub fn new(fangraphs_id: i64) -> Self {
        Self {
            fangraphs_id,
            ..Self::default()
        }
    }

    /// Builder-style setter used by fixtures and tests.
    pub fn with_value(mut self, column: &str, value: f64) -> Self {
        self.present.insert(column.to_string());
        self.values.insert(column.to_string(), value);
        self
    }

    /// Mark `column` as sent without a usable value.
    pub fn with_null(mut self, column: &str) -> Self {
        self.present.insert(column.to_string());
        self.values.remove(column);
        self
    }

    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Whether the provider sent `column` for this player, null or not.
    pub fn has_column(&self, column: &str) -> bool {
        self.present.contains(column)
    }
}

#[derive(Debug, Deserialize)]
struct Leaderboard {
    data: Vec<Map<String, Value>>,
}

/// Leaderboard URL for every player (no playing-time qualifier) in `season`.
pub fn leaderboard_url(base: &str, kind: StatKind, season: i32) -> String {
    format!(
        "{base}?pos=all&stats={code}&lg=all&qual=0&season={season}&season1={season}\
         &ind=0&type=8&pageitems=2000000000&pagenum=1&month=0&team=0",
        code = kind.provider_code(),
    )
}

fn canonical_column(key: &str) -> &str {
    COLUMN_ALIASES
        .iter()
        .find(|(from, _)| *from == key)
        .map_or(key, |(_, to)| *to)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    let raw = value?.as_str()?;
    let stripped: String = Html::parse_fragment(raw).root_element().text().collect();
    let stripped = stripped.trim();
    (!stripped.is_empty()).then(|| stripped.to_string())
}

fn stats_id(row: &Map<String, Value>) -> Option<i64> {
    ID_KEYS.iter().find_map(|key| match row.get(*key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(|f| parse_stats_id(&f.to_string()))),
        Value::String(s) => parse_stats_id(s),
        _ => None,
    })
}

/// Parse a leaderboard JSON body into stat lines.
pub fn parse_leaderboard(body: &str) -> Result<Vec<SeasonStatLine>, StatsError> {
    let board: Leaderboard = serde_json::from_str(body)?;
    let mut lines = Vec::with_capacity(board.data.len());
    let mut skipped = 0usize;

    for row in board.data {
        let Some(fangraphs_id) = stats_id(&row) else {
            skipped += 1;
            continue;
        };

        let name = text(row.get("PlayerName")).or_else(|| text(row.get("Name")));
        let team = text(row.get("TeamNameAbb")).or_else(|| text(row.get("Team")));
        let age = row.get("Age").and_then(numeric);

        let mut values = HashMap::new();
        let mut present = HashSet::with_capacity(row.len());
        for (key, value) in &row {
            let column = canonical_column(key);
            if let Some(v) = numeric(value) {
                values.insert(column.to_string(), v);
            }
            present.insert(column.to_string());
        }

        lines.push(SeasonStatLine {
            fangraphs_id,
            name,
            team,
            age,
            values,
            present,
        });
    }

    if skipped > 0 {
        warn!("skipped {skipped} leaderboard rows without a player id");
    }
    debug!("parsed {} leaderboard rows", lines.len());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_batting_rows() {
        let body = r#"{"data": [
            {"playerid": 10155, "PlayerName": "Mike Trout", "Name": "<a href=\"x\">Mike Trout</a>",
             "TeamNameAbb": "LAA", "Age": 32, "AVG": 0.2204, "BB%": 0.1385, "xAVG": 0.251,
             "wRC+": 138.2},
            {"playerid": "15640", "Name": "<a href=\"y\">Aaron Judge</a>", "Team": "NYY",
             "AVG": "0.322"}
        ], "totalCount": 2}"#;

        let lines = parse_leaderboard(body).unwrap();
        assert_eq!(lines.len(), 2);

        let trout = &lines[0];
        assert_eq!(trout.fangraphs_id, 10155);
        assert_eq!(trout.name.as_deref(), Some("Mike Trout"));
        assert_eq!(trout.team.as_deref(), Some("LAA"));
        assert_eq!(trout.age, Some(32.0));
        assert_eq!(trout.value("AVG"), Some(0.2204));
        assert_eq!(trout.value("BB%"), Some(0.1385));
        assert_eq!(trout.value("xBA"), Some(0.251));
        assert_eq!(trout.value("xAVG"), None);
        assert_eq!(trout.value("PlayerName"), None);

        let judge = &lines[1];
        assert_eq!(judge.fangraphs_id, 15640);
        assert_eq!(judge.name.as_deref(), Some("Aaron Judge"));
        assert_eq!(judge.team.as_deref(), Some("NYY"));
        assert_eq!(judge.value("AVG"), Some(0.322));
    }

    #[test]
    fn pitching_aliases() {
        let body = r#"{"data": [{"playerid": 13125, "PlayerName": "Gerrit Cole",
            "sp_stuff": 108.4, "sp_location": 104.1, "sp_pitching": 106.0, "IP": 95.0}]}"#;
        let lines = parse_leaderboard(body).unwrap();
        assert_eq!(lines[0].value("Stuff+"), Some(108.4));
        assert_eq!(lines[0].value("Location+"), Some(104.1));
        assert_eq!(lines[0].value("Pitching+"), Some(106.0));
    }

    #[test]
    fn rows_without_id_are_skipped() {
        let body = r#"{"data": [{"PlayerName": "Nobody"}, {"playerid": "abc"}, {"playerid": 1}]}"#;
        let lines = parse_leaderboard(body).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].fangraphs_id, 1);
    }

    #[test]
    fn non_numeric_values_are_dropped() {
        let body = r#"{"data": [{"playerid": 1, "AVG": null, "OBP": "", "SLG": true}]}"#;
        let lines = parse_leaderboard(body).unwrap();
        for column in ["AVG", "OBP", "SLG"] {
            assert_eq!(lines[0].value(column), None);
            assert!(lines[0].has_column(column));
        }
        assert!(!lines[0].has_column("wOBA"));
    }

    #[test]
    fn null_alias_is_still_present() {
        let body = r#"{"data": [{"playerid": 1, "AVG": 0.25, "xAVG": null}]}"#;
        let lines = parse_leaderboard(body).unwrap();
        assert!(lines[0].has_column("xBA"));
        assert!(!lines[0].has_column("xAVG"));
        assert_eq!(lines[0].value("xBA"), None);
    }

    #[test]
    fn malformed_body_is_error() {
        assert!(matches!(parse_leaderboard("<html>"), Err(StatsError::Json(_))));
        assert!(matches!(parse_leaderboard(r#"{"rows": []}"#), Err(StatsError::Json(_))));
    }

    #[test]
    fn url_has_zero_qualifier() {
        let url = leaderboard_url("https://stats.example/api", StatKind::Pitching, 2024);
        assert!(url.starts_with("https://stats.example/api?"));
        assert!(url.contains("stats=pit"));
        assert!(url.contains("qual=0"));
        assert!(url.contains("season=2024&season1=2024"));
    }
}
