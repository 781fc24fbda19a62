// League dashboard data pipeline: identifier map, roster supplements, season
// stats, the merge/enrich step, profile links, the defense table, display
// formats and filters.

pub mod defense;
pub mod filter;
pub mod format;
pub mod identity;
pub mod merge;
pub mod profile_link;
pub mod roster;
pub mod schema;
pub mod stats;
