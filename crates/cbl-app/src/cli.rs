// Command-line arguments for the `cbl` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::page::{FilterSelection, Page};

/// CBL dashboard: roster-enriched season stats for batters, pitchers and
/// defense.
#[derive(Debug, Parser)]
#[command(name = "cbl", version)]
pub struct Args {
    /// Table to show.
    #[arg(long, value_enum, default_value_t = Page::Batters)]
    pub page: Page,

    /// Only players holding a card this season.
    #[arg(long)]
    pub carded_only: bool,

    /// Eligible position (repeatable).
    #[arg(long = "position", value_name = "POS")]
    pub positions: Vec<String>,

    /// Club abbreviation, defense page only (repeatable).
    #[arg(long = "team", value_name = "TEAM")]
    pub teams: Vec<String>,

    #[arg(long)]
    pub min_age: Option<f64>,

    #[arg(long)]
    pub max_age: Option<f64>,

    /// Minimum at-bats (batters) or innings pitched (pitchers).
    #[arg(long)]
    pub min_usage: Option<f64>,

    /// Maximum at-bats (batters) or innings pitched (pitchers).
    #[arg(long)]
    pub max_usage: Option<f64>,

    /// Write the table as CSV to this path instead of printing it.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

impl Args {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            carded_only: self.carded_only,
            positions: self.positions.clone(),
            teams: self.teams.clone(),
            min_age: self.min_age,
            max_age: self.max_age,
            min_usage: self.min_usage,
            max_usage: self.max_usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_batters() {
        let args = Args::try_parse_from(["cbl"]).unwrap();
        assert_eq!(args.page, Page::Batters);
        assert!(!args.carded_only);
        assert!(args.csv.is_none());
    }

    #[test]
    fn repeatable_filters() {
        let args = Args::try_parse_from([
            "cbl",
            "--page",
            "pitchers",
            "--carded-only",
            "--position",
            "SP",
            "--position",
            "RP",
            "--min-usage",
            "40",
        ])
        .unwrap();
        assert_eq!(args.page, Page::Pitchers);
        let sel = args.selection();
        assert!(sel.carded_only);
        assert_eq!(sel.positions, vec!["SP", "RP"]);
        assert_eq!(sel.min_usage, Some(40.0));
        assert_eq!(sel.max_usage, None);
    }

    #[test]
    fn unknown_page_rejected() {
        assert!(Args::try_parse_from(["cbl", "--page", "relievers"]).is_err());
    }
}
