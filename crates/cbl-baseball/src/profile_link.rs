// Player profile link synthesis.
//
// Builds `<base>/<given>-<surname>-<id>` from a display name and a numeric
// site ID. The surname heuristic knows about hyphenated surnames and
// generational suffixes; multi-word surnames ("de la Cruz") are not
// recognised and produce a link that may not resolve.

use cbl_core::table::{Cell, RowView, Table, TableError};

use crate::schema::{INTERNAL_COLUMNS, MLB_ID, MLB_NAME, PROFILE_LINK};

/// Default profile site.
pub const DEFAULT_PROFILE_BASE: &str = "https://baseballsavant.mlb.com/savant-player";

const SUFFIXES: [&str; 6] = ["jr", "sr", "ii", "iii", "iv", "v"];

/// Split a display name into `(given, surname)` link segments, before
/// character cleanup.
fn split_name(name: &str) -> (String, String) {
    let tokens: Vec<&str> = name.trim().split(' ').collect();
    let n = tokens.len();
    let last = tokens[n - 1];

    if last.contains('-') {
        (tokens[..n - 1].join("-"), last.to_string())
    } else if n >= 2 && SUFFIXES.contains(&last.to_lowercase().as_str()) {
        (
            tokens[..n - 2].join("-"),
            format!("{}-{}", tokens[n - 2], last.to_lowercase()),
        )
    } else {
        (tokens[..n - 1].join("-"), last.to_string())
    }
}

/// Lower-case and keep only `[a-z0-9-]`.
fn slug(part: &str) -> String {
    part.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Build a profile URL, or `None` when the name or ID is missing.
///
/// Fractional IDs are truncated toward zero.
pub fn profile_url(base: &str, name: Option<&str>, id: Option<f64>) -> Option<String> {
    let name = name.filter(|n| !n.trim().is_empty())?;
    let id = id.filter(|v| v.is_finite())?.trunc() as i64;

    let (given, surname) = split_name(name);
    Some(format!(
        "{}/{}-{}-{}",
        base.trim_end_matches('/'),
        slug(&given),
        slug(&surname),
        id
    ))
}

/// Profile URL for a table row holding `MLBNAME` and `MLBID`.
pub fn profile_url_for_row(base: &str, row: &RowView<'_>) -> Option<String> {
    let name = row.get(MLB_NAME).and_then(Cell::as_str);
    let id = row.get(MLB_ID).and_then(|c| match c {
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    });
    profile_url(base, name, id)
}

/// Append the profile link column and drop the internal ID/name columns.
pub fn attach_profile_links(table: &mut Table, base: &str) -> Result<(), TableError> {
    let links: Vec<Cell> = table
        .row_views()
        .map(|row| Cell::from(profile_url_for_row(base, &row)))
        .collect();
    table.push_column(PROFILE_LINK, links)?;
    table.drop_columns(&INTERNAL_COLUMNS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(name: &str, id: f64) -> String {
        profile_url(DEFAULT_PROFILE_BASE, Some(name), Some(id)).unwrap()
    }

    #[test]
    fn ordinary_name() {
        assert_eq!(
            url("Mike Trout", 545361.0),
            "https://baseballsavant.mlb.com/savant-player/mike-trout-545361"
        );
    }

    #[test]
    fn generational_suffix_folds_into_surname() {
        assert!(url("Ken Griffey Jr", 123456.0).ends_with("/ken-griffey-jr-123456"));
        assert!(url("Vladimir Guerrero JR", 665489.0).ends_with("/vladimir-guerrero-jr-665489"));
        assert!(url("Cal Ripken III", 1.0).ends_with("/cal-ripken-iii-1"));
    }

    #[test]
    fn hyphenated_surname_kept_whole() {
        assert!(url("Dee Strange-Gordon", 543829.0).ends_with("/dee-strange-gordon-543829"));
    }

    #[test]
    fn hyphen_only_counts_on_last_token() {
        assert!(url("Strange-Gordon Dee", 543829.0).ends_with("/strange-gordon-dee-543829"));
    }

    #[test]
    fn punctuation_stripped() {
        let link = url("J.D. Martinez", 654321.0);
        assert!(link.ends_with("/jd-martinez-654321"));
        assert!(url("Travis d'Arnaud", 518595.0).ends_with("/travis-darnaud-518595"));
    }

    #[test]
    fn multiple_given_names_joined_with_hyphens() {
        assert!(url("Luis Robert Moirán", 673357.0).ends_with("/luis-robert-moirn-673357"));
    }

    #[test]
    fn single_token_names() {
        assert!(url("Ichiro", 400085.0).ends_with("/-ichiro-400085"));
        assert!(url("Jr", 5.0).ends_with("/-jr-5"));
    }

    #[test]
    fn fractional_id_truncates() {
        assert!(url("Mike Trout", 545361.9).ends_with("-545361"));
    }

    #[test]
    fn missing_inputs_yield_none() {
        assert_eq!(profile_url(DEFAULT_PROFILE_BASE, None, Some(1.0)), None);
        assert_eq!(profile_url(DEFAULT_PROFILE_BASE, Some("Mike Trout"), None), None);
        assert_eq!(profile_url(DEFAULT_PROFILE_BASE, Some("  "), Some(1.0)), None);
        assert_eq!(
            profile_url(DEFAULT_PROFILE_BASE, Some("Mike Trout"), Some(f64::NAN)),
            None
        );
    }

    #[test]
    fn same_input_same_output() {
        assert_eq!(url("Ken Griffey Jr", 123456.0), url("Ken Griffey Jr", 123456.0));
    }

    #[test]
    fn attach_replaces_internal_columns() {
        let mut table = Table::new(["Name", "FanGraph ID", "MLBID", "MLBNAME"]);
        table
            .push_row(vec![
                "Mike Trout".into(),
                Cell::Int(10155),
                Cell::Float(545361.0),
                "Mike Trout".into(),
            ])
            .unwrap();
        table
            .push_row(vec!["Unmapped".into(), Cell::Int(1), Cell::Null, Cell::Null])
            .unwrap();
        table
            .push_row(vec![
                "Bad Id".into(),
                Cell::Int(2),
                Cell::from("abc"),
                "Bad Id".into(),
            ])
            .unwrap();
        table
            .push_row(vec![
                "Text Id".into(),
                Cell::Int(3),
                Cell::from(" 660271 "),
                "Shohei Ohtani".into(),
            ])
            .unwrap();

        attach_profile_links(&mut table, DEFAULT_PROFILE_BASE).unwrap();

        assert_eq!(table.columns(), &["Name".to_string(), PROFILE_LINK.to_string()]);
        assert_eq!(
            table.cell(0, PROFILE_LINK),
            Some(&Cell::from(
                "https://baseballsavant.mlb.com/savant-player/mike-trout-545361"
            ))
        );
        assert_eq!(table.cell(1, PROFILE_LINK), Some(&Cell::Null));
        assert_eq!(table.cell(2, PROFILE_LINK), Some(&Cell::Null));
        assert_eq!(
            table.cell(3, PROFILE_LINK),
            Some(&Cell::from(
                "https://baseballsavant.mlb.com/savant-player/shohei-ohtani-660271"
            ))
        );
    }
}
