// Display formats for the batter and pitcher tables.

use cbl_core::table::{ColumnFormat, ColumnFormats};

use crate::schema::{Rounding, StatKind, NAME, PROFILE_LINK};

pub const PROFILE_LINK_LABEL: &str = "Baseball Savant";

/// Column formats for a player table. Every rounded column is shown with the
/// precision it was rounded to; percentage columns get a `%` suffix.
pub fn column_formats(kind: StatKind) -> ColumnFormats {
    let mut formats = ColumnFormats::new();
    formats.insert(NAME.to_string(), ColumnFormat::pinned(NAME));

    for rule in kind.rounding_rules() {
        for &column in rule.columns {
            let format = match rule.rounding {
                Rounding::Decimals(n) => ColumnFormat::number(column, n as usize),
                Rounding::Percent => ColumnFormat::percent(column, 1),
            };
            formats.insert(column.to_string(), format);
        }
    }

    formats.insert(
        PROFILE_LINK.to_string(),
        ColumnFormat::link(PROFILE_LINK_LABEL),
    );
    formats
}
