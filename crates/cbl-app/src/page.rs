// Page definitions: which table a page shows, its display formats and the
// filter controls it offers.

use std::fmt;

use cbl_baseball::filter::{column_range, Range, TableFilter};
use cbl_baseball::format::column_formats;
use cbl_baseball::schema::{StatKind, AGE};
use cbl_core::table::{ColumnFormats, Table};
use thiserror::Error;

pub const BATTER_POSITIONS: [&str; 9] = ["DH", "CA", "1B", "2B", "3B", "SS", "LF", "CF", "RF"];

pub const PITCHER_POSITIONS: [&str; 2] = ["SP", "RP"];

pub const TEAMS: [&str; 30] = [
    "ARI", "ATL", "BAL", "BOS", "CHC", "CHW", "CIN", "CLE", "COL", "DET", "HOU", "KCR", "LAA",
    "LAD", "MIA", "MIL", "MIN", "NYM", "NYY", "OAK", "PHI", "PIT", "SDP", "SFG", "SEA", "STL",
    "TBR", "TEX", "TOR", "WSN",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Page {
    Batters,
    Pitchers,
    Defense,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PageError {
    #[error("`{option}` is not a {control} option on the {page} page")]
    UnknownOption {
        page: Page,
        control: &'static str,
        option: String,
    },

    #[error("the {page} page has no {control} filter")]
    UnsupportedControl { page: Page, control: &'static str },

    #[error("{control} range is empty: min {min} > max {max}")]
    EmptyRange {
        control: &'static str,
        min: f64,
        max: f64,
    },
}

/// Filter values as chosen by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub carded_only: bool,
    pub positions: Vec<String>,
    pub teams: Vec<String>,
    pub min_age: Option<f64>,
    pub max_age: Option<f64>,
    pub min_usage: Option<f64>,
    pub max_usage: Option<f64>,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Batters => "Batters",
            Page::Pitchers => "Pitchers",
            Page::Defense => "Defense",
        }
    }

    pub fn stat_kind(self) -> Option<StatKind> {
        match self {
            Page::Batters => Some(StatKind::Batting),
            Page::Pitchers => Some(StatKind::Pitching),
            Page::Defense => None,
        }
    }

    pub fn position_options(self) -> &'static [&'static str] {
        match self {
            Page::Batters => &BATTER_POSITIONS,
            Page::Pitchers => &PITCHER_POSITIONS,
            Page::Defense => &[],
        }
    }

    pub fn team_options(self) -> &'static [&'static str] {
        match self {
            Page::Defense => &TEAMS,
            Page::Batters | Page::Pitchers => &[],
        }
    }

    /// Display formats; the defense table is shown raw.
    pub fn column_formats(self) -> ColumnFormats {
        self.stat_kind()
            .map(column_formats)
            .unwrap_or_default()
    }

    /// Validate `selection` against this page's controls and turn it into a
    /// filter. One-sided ranges are closed with the column's observed bounds
    /// from `table`.
    pub fn build_filter(
        self,
        selection: &FilterSelection,
        table: &Table,
    ) -> Result<TableFilter, PageError> {
        let kind = self.stat_kind();

        if kind.is_none() {
            let player_only = [
                ("carded", selection.carded_only),
                ("position", !selection.positions.is_empty()),
                (
                    "age",
                    selection.min_age.is_some() || selection.max_age.is_some(),
                ),
                (
                    "usage",
                    selection.min_usage.is_some() || selection.max_usage.is_some(),
                ),
            ];
            if let Some((control, _)) = player_only.iter().find(|(_, set)| *set) {
                return Err(PageError::UnsupportedControl {
                    page: self,
                    control: *control,
                });
            }
        } else if !selection.teams.is_empty() {
            return Err(PageError::UnsupportedControl {
                page: self,
                control: "team",
            });
        }

        check_options(self, "position", &selection.positions, self.position_options())?;
        check_options(self, "team", &selection.teams, self.team_options())?;

        let age = range_filter(table, "age", AGE, selection.min_age, selection.max_age)?;
        let (usage, usage_column) = match kind {
            Some(kind) => {
                let column = kind.usage_column();
                let usage = range_filter(
                    table,
                    "usage",
                    column,
                    selection.min_usage,
                    selection.max_usage,
                )?;
                (usage, usage.map(|_| column.to_string()))
            }
            None => (None, None),
        };

        Ok(TableFilter {
            carded_only: selection.carded_only,
            positions: selection.positions.clone(),
            age,
            usage,
            usage_column,
            teams: selection.teams.clone(),
        })
    }
}

fn check_options(
    page: Page,
    control: &'static str,
    chosen: &[String],
    allowed: &[&str],
) -> Result<(), PageError> {
    match chosen.iter().find(|c| !allowed.contains(&c.as_str())) {
        Some(bad) => Err(PageError::UnknownOption {
            page,
            control,
            option: bad.clone(),
        }),
        None => Ok(()),
    }
}

fn range_filter(
    table: &Table,
    control: &'static str,
    column: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<Option<Range>, PageError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(PageError::EmptyRange { control, min, max });
        }
    }
    let span = column_range(table, column).unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
    Ok(Range::from_bounds(min, max, span))
}
