// Row filters for the output tables.
//
// Filters address columns by name so the same `TableFilter` works on the
// batter, pitcher and defense tables. Range filters exclude rows whose value
// is missing.

use cbl_core::table::{Cell, RowView, Table};

use crate::defense::CLUB;
use crate::schema::{AGE, IS_CARDED, POSITION};

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Widen a one-sided bound to the other end of `span`.
    pub fn from_bounds(min: Option<f64>, max: Option<f64>, span: (f64, f64)) -> Option<Self> {
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self::new(min.unwrap_or(span.0), max.unwrap_or(span.1)))
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    pub carded_only: bool,
    /// Keep rows eligible at any of these positions.
    pub positions: Vec<String>,
    pub age: Option<Range>,
    /// Range over `usage_column` (AB or IP).
    pub usage: Option<Range>,
    pub usage_column: Option<String>,
    /// Keep defense rows from these clubs.
    pub teams: Vec<String>,
}

fn in_range(row: &RowView<'_>, column: &str, range: &Range) -> bool {
    row.get(column)
        .and_then(Cell::as_f64)
        .is_some_and(|v| range.contains(v))
}

impl TableFilter {
    pub fn is_empty(&self) -> bool {
        !self.carded_only
            && self.positions.is_empty()
            && self.age.is_none()
            && self.usage.is_none()
            && self.teams.is_empty()
    }

    pub fn matches(&self, row: &RowView<'_>) -> bool {
        if self.carded_only && row.get(IS_CARDED).and_then(Cell::as_bool) != Some(true) {
            return false;
        }

        if !self.positions.is_empty() {
            let eligible = row
                .get(POSITION)
                .and_then(Cell::as_str)
                .is_some_and(|pos| pos.split('/').any(|p| self.positions.iter().any(|s| s == p)));
            if !eligible {
                return false;
            }
        }

        if let Some(range) = &self.age {
            if !in_range(row, AGE, range) {
                return false;
            }
        }

        if let (Some(range), Some(column)) = (&self.usage, &self.usage_column) {
            if !in_range(row, column, range) {
                return false;
            }
        }

        if !self.teams.is_empty() {
            let on_team = row
                .get(CLUB)
                .and_then(Cell::as_str)
                .is_some_and(|tm| self.teams.iter().any(|t| t == tm));
            if !on_team {
                return false;
            }
        }

        true
    }

    /// Remove non-matching rows from `table`.
    pub fn apply(&self, table: &mut Table) {
        if self.is_empty() {
            return;
        }
        table.retain_rows(|row| self.matches(row));
    }
}

/// `(min, max)` over the non-null numeric values of `column`.
pub fn column_range(table: &Table, column: &str) -> Option<(f64, f64)> {
    table
        .column(column)?
        .filter_map(Cell::as_f64)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}
