//! CLI command implementations

pub mod completions;
pub mod config;
pub mod fill;
pub mod label;
pub mod report;
pub mod schema;
pub mod search;
pub mod validate;
