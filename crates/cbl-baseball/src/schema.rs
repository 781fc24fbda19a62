// Column schema for the batter and pitcher tables.
//
// Column lists, rounding groups and the names of the join/identity columns
// are a fixed contract shared by the loaders, the merge step and the display
// formats.

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const NAME: &str = "Name";
pub const AGE: &str = "Age";
pub const CARD: &str = "CBLCard";
pub const CARD_TIER: &str = "CBL5Percent";
pub const IS_CARDED: &str = "is_carded";
pub const TEAM: &str = "Team";
pub const POSITION: &str = "CBLPos";
pub const FANGRAPHS_ID: &str = "FanGraph ID";
pub const MLB_ID: &str = "MLBID";
pub const MLB_NAME: &str = "MLBNAME";
pub const PROFILE_LINK: &str = "Savant Link";

/// Card tier value marking a player as not carded.
pub const NOT_CARDED: &str = "NC";

/// Columns carried for link synthesis and dropped from the exposed tables.
pub const INTERNAL_COLUMNS: [&str; 3] = [FANGRAPHS_ID, MLB_ID, MLB_NAME];

// ---------------------------------------------------------------------------
// Batting / pitching variants
// ---------------------------------------------------------------------------

/// Which side of the leaderboard a table is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Batting,
    Pitching,
}

/// Per-column rounding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round to this many decimal places.
    Decimals(u32),
    /// Scale a fraction to a percentage, then round to one decimal.
    Percent,
}

#[derive(Debug, Clone, Copy)]
pub struct RoundingRule {
    pub rounding: Rounding,
    pub columns: &'static [&'static str],
}

const BATTING_STATS: &[&str] = &[
    "AB", "AVG", "OBP", "SLG", "OPS", "wRC+", "WAR", "H", "2B", "3B", "HR", "R", "RBI", "BB",
    "SO", "SB", "BB%", "K%", "BB/K", "ISO", "BABIP", "xBA", "xSLG", "wOBA", "xwOBA", "WPA",
    "O-Contact%", "Z-Contact%", "Barrel%", "HardHit%",
];

const PITCHING_STATS: &[&str] = &[
    "G", "GS", "IP", "ERA", "FIP", "WHIP", "WAR", "K/9", "BB/9", "H", "R", "ER", "HR", "BB", "SV",
    "H/9", "HR/9", "xERA", "xFIP", "AVG", "BABIP", "LOB%", "GB%", "FB%", "K%", "BB%", "Soft%",
    "Med%", "Hard%", "Stuff+", "Location+", "Pitching+", "WPA", "Start-IP", "Relief-IP",
];

const BATTING_ROUNDING: &[RoundingRule] = &[
    RoundingRule {
        rounding: Rounding::Decimals(3),
        columns: &[
            "AVG", "OBP", "SLG", "OPS", "ISO", "BABIP", "xBA", "xSLG", "wOBA", "xwOBA",
        ],
    },
    RoundingRule {
        rounding: Rounding::Decimals(2),
        columns: &["WPA", "BB/K"],
    },
    RoundingRule {
        rounding: Rounding::Percent,
        columns: &["BB%", "K%", "O-Contact%", "Z-Contact%", "Barrel%", "HardHit%"],
    },
];

const PITCHING_ROUNDING: &[RoundingRule] = &[
    RoundingRule {
        rounding: Rounding::Decimals(1),
        columns: &["IP", "Start-IP", "Relief-IP"],
    },
    RoundingRule {
        rounding: Rounding::Decimals(2),
        columns: &[
            "ERA", "FIP", "K/9", "BB/9", "H/9", "HR/9", "xERA", "xFIP", "WPA",
        ],
    },
    RoundingRule {
        rounding: Rounding::Decimals(3),
        columns: &["WHIP", "AVG", "BABIP"],
    },
    RoundingRule {
        rounding: Rounding::Percent,
        columns: &["LOB%", "GB%", "FB%", "K%", "BB%", "Soft%", "Med%", "Hard%"],
    },
];

impl StatKind {
    /// Leaderboard query code for the stats provider.
    pub fn provider_code(self) -> &'static str {
        match self {
            StatKind::Batting => "bat",
            StatKind::Pitching => "pit",
        }
    }

    /// Output column holding the player's handedness.
    pub fn handedness_column(self) -> &'static str {
        match self {
            StatKind::Batting => "Bats",
            StatKind::Pitching => "Throws",
        }
    }

    /// Playing-time column used for the usage range filter.
    pub fn usage_column(self) -> &'static str {
        match self {
            StatKind::Batting => "AB",
            StatKind::Pitching => "IP",
        }
    }

    /// Season stat columns, in output order.
    pub fn stat_columns(self) -> &'static [&'static str] {
        match self {
            StatKind::Batting => BATTING_STATS,
            StatKind::Pitching => PITCHING_STATS,
        }
    }

    pub fn rounding_rules(self) -> &'static [RoundingRule] {
        match self {
            StatKind::Batting => BATTING_ROUNDING,
            StatKind::Pitching => PITCHING_ROUNDING,
        }
    }

    /// Rounding applied to `column`, if it belongs to a rounding group.
    pub fn rounding_for(self, column: &str) -> Option<Rounding> {
        self.rounding_rules()
            .iter()
            .find(|rule| rule.columns.contains(&column))
            .map(|rule| rule.rounding)
    }

    /// Leading roster/identity columns, in output order.
    pub fn leading_columns(self) -> [&'static str; 7] {
        [
            NAME,
            AGE,
            CARD,
            IS_CARDED,
            TEAM,
            POSITION,
            self.handedness_column(),
        ]
    }

    /// Columns of the exposed table: leading columns, stats, then the link.
    pub fn output_columns(self) -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = self.leading_columns().to_vec();
        cols.extend_from_slice(self.stat_columns());
        cols.push(PROFILE_LINK);
        cols
    }
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

impl Rounding {
    /// Apply the policy; a missing value stays missing.
    pub fn apply(self, value: Option<f64>) -> Option<f64> {
        let v = value.filter(|v| !v.is_nan())?;
        Some(match self {
            Rounding::Decimals(n) => round_to(v, n),
            Rounding::Percent => round_to(v * 100.0, 1),
        })
    }
}
