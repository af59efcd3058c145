//! Core module - fundamental types and utilities

pub mod config;
pub mod role;
pub mod submission;

pub use config::{Config, ConfigError};
pub use role::Role;
pub use submission::{IdParseError, Submission, SubmissionId};
