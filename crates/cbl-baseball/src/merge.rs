// Roster + season stats + identity merge.
//
// Steps, per batter or pitcher table:
// 1. Inner join roster entries to stat lines on FanGraphs ID.
// 2. Derive `is_carded` from the card tier.
// 3. Left join the identity map for handedness, MLB name and MLB ID.
// 4. Round/scale stat columns by their rounding group.
// 5. Project to the fixed output column order.

use std::collections::HashMap;

use cbl_core::table::{Cell, Table, TableError};
use thiserror::Error;
use tracing::{debug, info};

use crate::identity::IdentityMap;
use crate::profile_link::attach_profile_links;
use crate::roster::RosterEntry;
use crate::schema::{StatKind, FANGRAPHS_ID, MLB_ID, MLB_NAME};
use crate::stats::SeasonStatLine;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("season stats are missing column `{0}`")]
    MissingStatColumn(&'static str),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// One merged player, before projection to a `Table`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    pub fangraphs_id: i64,
    pub name: Option<String>,
    pub age: Option<f64>,
    pub card: Option<String>,
    pub is_carded: bool,
    pub team: Option<String>,
    pub position: Option<String>,
    /// Bats for batters, throws for pitchers.
    pub handedness: Option<String>,
    /// Values aligned with `StatKind::stat_columns()`, already rounded.
    pub stats: Vec<Option<f64>>,
    pub mlb_id: Option<f64>,
    pub mlb_name: Option<String>,
}

/// Fail if a projected stat column is absent from every stat line, which
/// means the provider changed its schema. A column sent as null for every
/// player is not absent.
fn check_stat_columns(kind: StatKind, stats: &[SeasonStatLine]) -> Result<(), MergeError> {
    if stats.is_empty() {
        return Ok(());
    }
    for &column in kind.stat_columns() {
        if !stats.iter().any(|line| line.has_column(column)) {
            return Err(MergeError::MissingStatColumn(column));
        }
    }
    Ok(())
}

fn rounded_stats(kind: StatKind, line: &SeasonStatLine) -> Vec<Option<f64>> {
    kind.stat_columns()
        .iter()
        .map(|&column| {
            let raw = line.value(column);
            match kind.rounding_for(column) {
                Some(rounding) => rounding.apply(raw),
                None => raw,
            }
        })
        .collect()
}

/// Merge roster entries with season stats and the identity map.
///
/// Roster rows without a matching stat line (and stat lines without a roster
/// row) are dropped. Players missing from the identity map keep `None`
/// handedness and MLB fields. Output follows roster order.
pub fn merge_players(
    kind: StatKind,
    roster: &[RosterEntry],
    stats: &[SeasonStatLine],
    identities: &IdentityMap,
) -> Result<Vec<PlayerRow>, MergeError> {
    check_stat_columns(kind, stats)?;

    let mut by_id: HashMap<i64, Vec<&SeasonStatLine>> = HashMap::new();
    for line in stats {
        by_id.entry(line.fangraphs_id).or_default().push(line);
    }

    let mut rows = Vec::new();
    let mut unmatched = 0usize;
    for entry in roster {
        let Some(lines) = entry.fangraphs_id.and_then(|id| by_id.get(&id)) else {
            unmatched += 1;
            continue;
        };
        for line in lines {
            let identity = identities.get(line.fangraphs_id);
            let handedness = identity.and_then(|i| match kind {
                StatKind::Batting => i.bats.clone(),
                StatKind::Pitching => i.throws.clone(),
            });

            rows.push(PlayerRow {
                fangraphs_id: line.fangraphs_id,
                name: line.name.clone(),
                age: entry.age.or(line.age),
                card: entry.card.clone(),
                is_carded: entry.is_carded(),
                team: entry.team.clone().or_else(|| line.team.clone()),
                position: entry.position.clone(),
                handedness,
                stats: rounded_stats(kind, line),
                mlb_id: identity.and_then(|i| i.mlb_id),
                mlb_name: identity.and_then(|i| i.mlb_name.clone()),
            });
        }
    }

    debug!(
        ?kind,
        merged = rows.len(),
        unmatched, "merged roster with season stats"
    );
    Ok(rows)
}

/// Project merged rows into a table holding the leading columns, the stat
/// columns and the internal ID/name columns used for link synthesis.
pub fn player_table(kind: StatKind, rows: &[PlayerRow]) -> Result<Table, MergeError> {
    let mut columns: Vec<&str> = kind.leading_columns().to_vec();
    columns.extend_from_slice(kind.stat_columns());
    columns.extend_from_slice(&[FANGRAPHS_ID, MLB_ID, MLB_NAME]);

    let mut table = Table::new(columns);
    for row in rows {
        let mut cells = vec![
            Cell::from(row.name.clone()),
            Cell::from(row.age),
            Cell::from(row.card.clone()),
            Cell::Bool(row.is_carded),
            Cell::from(row.team.clone()),
            Cell::from(row.position.clone()),
            Cell::from(row.handedness.clone()),
        ];
        cells.extend(row.stats.iter().map(|v| Cell::from(*v)));
        cells.push(Cell::Int(row.fangraphs_id));
        cells.push(Cell::from(row.mlb_id));
        cells.push(Cell::from(row.mlb_name.clone()));
        table.push_row(cells)?;
    }
    Ok(table)
}

/// Full pipeline: merge, project, then replace the internal columns with the
/// synthesized profile link.
pub fn build_player_table(
    kind: StatKind,
    roster: &[RosterEntry],
    stats: &[SeasonStatLine],
    identities: &IdentityMap,
    profile_base: &str,
) -> Result<Table, MergeError> {
    let rows = merge_players(kind, roster, stats, identities)?;
    let mut table = player_table(kind, &rows)?;
    attach_profile_links(&mut table, profile_base)?;
    info!(?kind, rows = table.len(), "built player table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PlayerIdentity;
    use crate::profile_link::DEFAULT_PROFILE_BASE;
    use crate::schema::PROFILE_LINK;

    fn entry(id: Option<i64>, tier: Option<&str>) -> RosterEntry {
        RosterEntry {
            fangraphs_id: id,
            card: Some("card".into()),
            card_tier: tier.map(str::to_string),
            position: Some("CF".into()),
            team: None,
            age: None,
        }
    }

    /// A stat line carrying every batting column, all set to `fill`.
    fn batting_line(id: i64, fill: f64) -> SeasonStatLine {
        StatKind::Batting
            .stat_columns()
            .iter()
            .fold(SeasonStatLine::new(id), |line, col| line.with_value(col, fill))
    }

    fn identities() -> IdentityMap {
        IdentityMap::from_rows(vec![PlayerIdentity {
            fangraphs_id: Some(100),
            bats: Some("R".into()),
            throws: Some("R".into()),
            mlb_name: Some("Mike Trout".into()),
            mlb_id: Some(545361.0),
        }])
    }

    #[test]
    fn inner_join_drops_unmatched_on_both_sides() {
        let roster = vec![entry(Some(100), None), entry(Some(200), None), entry(None, None)];
        let stats = vec![batting_line(100, 0.1), batting_line(300, 0.1)];

        let rows = merge_players(StatKind::Batting, &roster, &stats, &identities()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fangraphs_id, 100);
    }

    #[test]
    fn left_join_keeps_players_missing_from_identity_map() {
        let roster = vec![entry(Some(200), None)];
        let stats = vec![batting_line(200, 0.1)];

        let rows = merge_players(StatKind::Batting, &roster, &stats, &identities()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].handedness, None);
        assert_eq!(rows[0].mlb_id, None);
        assert_eq!(rows[0].mlb_name, None);
    }

    #[test]
    fn carded_flag_follows_tier() {
        let roster = vec![
            entry(Some(1), Some("NC")),
            entry(Some(2), Some("5%")),
            entry(Some(3), None),
        ];
        let stats = vec![batting_line(1, 0.0), batting_line(2, 0.0), batting_line(3, 0.0)];
        let rows = merge_players(StatKind::Batting, &roster, &stats, &IdentityMap::default())
            .unwrap();
        let carded: Vec<bool> = rows.iter().map(|r| r.is_carded).collect();
        assert_eq!(carded, vec![false, true, true]);
    }

    #[test]
    fn rounding_groups_applied() {
        let roster = vec![entry(Some(100), None)];
        let stats = vec![batting_line(100, 0.123456)];
        let rows = merge_players(StatKind::Batting, &roster, &stats, &identities()).unwrap();

        let stat = |col: &str| {
            let idx = StatKind::Batting
                .stat_columns()
                .iter()
                .position(|c| *c == col)
                .unwrap();
            rows[0].stats[idx]
        };
        assert_eq!(stat("AVG"), Some(0.123));
        assert_eq!(stat("WPA"), Some(0.12));
        assert_eq!(stat("K%"), Some(12.3));
        assert_eq!(stat("HR"), Some(0.123456));
    }

    #[test]
    fn null_stats_stay_null() {
        let roster = vec![entry(Some(100), None)];
        let mut line = SeasonStatLine::new(100);
        for col in StatKind::Batting.stat_columns() {
            if *col != "AVG" && *col != "BB%" {
                line = line.with_value(col, 1.0);
            }
        }
        // Another line supplies the columns so the schema check passes.
        let stats = vec![line, batting_line(999, 0.5)];
        let rows = merge_players(StatKind::Batting, &roster, &stats, &identities()).unwrap();
        assert_eq!(rows[0].stats[1], None);
        let bb_pct = StatKind::Batting
            .stat_columns()
            .iter()
            .position(|c| *c == "BB%")
            .unwrap();
        assert_eq!(rows[0].stats[bb_pct], None);
    }

    #[test]
    fn missing_stat_column_is_schema_error() {
        let roster = vec![entry(Some(100), None)];
        let stats = vec![SeasonStatLine::new(100).with_value("AB", 10.0)];
        let err = merge_players(StatKind::Batting, &roster, &stats, &identities()).unwrap_err();
        assert!(matches!(err, MergeError::MissingStatColumn("AVG")));
    }

    #[test]
    fn column_null_for_every_player_passes_through() {
        let mut row = serde_json::Map::new();
        row.insert("playerid".into(), 100.into());
        for &col in StatKind::Batting.stat_columns() {
            let key = if col == "xBA" { "xAVG" } else { col };
            row.insert(key.into(), 0.25.into());
        }
        row.insert("xAVG".into(), serde_json::Value::Null);
        let body = serde_json::json!({ "data": [row] }).to_string();
        let stats = crate::stats::parse_leaderboard(&body).unwrap();

        let table = build_player_table(
            StatKind::Batting,
            &[entry(Some(100), None)],
            &stats,
            &identities(),
            DEFAULT_PROFILE_BASE,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "xBA"), Some(&Cell::Null));
        assert_eq!(table.cell(0, "AVG"), Some(&Cell::Float(0.25)));
    }

    #[test]
    fn roster_team_and_age_win_over_stats() {
        let mut with_team = entry(Some(100), None);
        with_team.team = Some("LAA".into());
        with_team.age = Some(32.0);
        let mut line = batting_line(100, 0.1);
        line.team = Some("SEA".into());
        line.age = Some(40.0);
        line.name = Some("Mike Trout".into());

        let rows =
            merge_players(StatKind::Batting, &[with_team], &[line.clone()], &identities()).unwrap();
        assert_eq!(rows[0].team.as_deref(), Some("LAA"));
        assert_eq!(rows[0].age, Some(32.0));
        assert_eq!(rows[0].name.as_deref(), Some("Mike Trout"));

        let rows = merge_players(StatKind::Batting, &[entry(Some(100), None)], &[line], &identities())
            .unwrap();
        assert_eq!(rows[0].team.as_deref(), Some("SEA"));
        assert_eq!(rows[0].age, Some(40.0));
    }

    #[test]
    fn built_table_has_output_columns_only() {
        let roster = vec![entry(Some(100), Some("NC"))];
        let stats = vec![batting_line(100, 0.29555)];
        let table = build_player_table(
            StatKind::Batting,
            &roster,
            &stats,
            &identities(),
            DEFAULT_PROFILE_BASE,
        )
        .unwrap();

        let expected: Vec<String> = StatKind::Batting
            .output_columns()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(table.columns(), expected.as_slice());
        assert_eq!(table.cell(0, "is_carded"), Some(&Cell::Bool(false)));
        assert_eq!(table.cell(0, "AVG"), Some(&Cell::Float(0.296)));
        assert_eq!(table.cell(0, "Bats"), Some(&Cell::from("R")));
        assert_eq!(
            table.cell(0, PROFILE_LINK).and_then(Cell::as_str),
            Some("https://baseballsavant.mlb.com/savant-player/mike-trout-545361")
        );
    }
}
