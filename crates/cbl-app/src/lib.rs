pub mod cli;
pub mod dashboard;
pub mod page;
pub mod render;
pub mod source;
