//! Tuoyu: childcare practitioner survey toolkit
//!
//! Form definitions for the survey, role-dependent question selection,
//! answer validation and reporting, with a command-line front end.

pub mod cli;
pub mod core;
pub mod schema;
