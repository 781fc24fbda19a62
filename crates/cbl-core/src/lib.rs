// Shared infrastructure for the league dashboard: configuration, the
// time-bounded fetch cache and the table model handed to presentation.

pub mod cache;
pub mod config;
pub mod table;
