//! Conversion of command line field values

use super::{parse_value, CliError};
use crate::Value;

/// Read field values from a JSON object, in key order.
pub fn json_to_values(json: &str) -> Result<Vec<(String, Value)>, CliError> {
    match serde_json::from_str::<serde_json::Value>(json)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect()),
        _ => Err(CliError::NotAnObject),
    }
}

/// Split a `key=value` assignment.
pub fn parse_assignment(arg: &str) -> Result<(String, Value), CliError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), parse_value(value)))
        }
        _ => Err(CliError::InvalidAssignment(arg.to_string())),
    }
}
