//! CLI support for ftrack-query
//!
//! Builds statements from command line arguments and renders them without
//! a server, for checking what a query will look like before running it.

mod convert;
mod filters;
mod render;

pub use convert::{json_to_values, parse_assignment};
pub use filters::{parse_filter, parse_value};
pub use render::{build_statement, execute_render, RenderOptions, StatementKind};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Statement could not be built
    Query(crate::Error),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// Field values were not a JSON object
    NotAnObject,
    /// `--set` argument without `=`
    InvalidAssignment(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Query(e) => write!(f, "Query error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NotAnObject => write!(f, "Field values must be a JSON object."),
            CliError::InvalidAssignment(arg) => {
                write!(f, "Invalid assignment: '{}'\nExpected the form key=value.", arg)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Query(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::Error> for CliError {
    fn from(e: crate::Error) -> Self {
        CliError::Query(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
