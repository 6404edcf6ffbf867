//! Request parameter parsing for the MCP tools
//!
//! Raw tool arguments arrive as strings. These helpers turn them into domain
//! values and map every failure to an `INVALID_PARAMS` error whose message is
//! shown to the client.

use crate::error::WorkPlanError;
use crate::keys::{self, Letter, ScopeKind};
use crate::plan::{InternalStatus, Output};
use chrono::NaiveDate;
use mcp_attr::Result as McpResult;

fn invalid_params(message: impl Into<String>) -> mcp_attr::Error {
    mcp_attr::Error::new(mcp_attr::ErrorCode::INVALID_PARAMS).with_message(message.into(), true)
}

/// Convert a service error into a client-visible MCP error
///
/// # Arguments
/// * `err` - Error returned by the service layer
///
/// # Returns
/// `INVALID_PARAMS` error carrying the service error's message
pub fn to_mcp_error(err: WorkPlanError) -> mcp_attr::Error {
    invalid_params(err.to_string())
}

/// Parse a key scope: goal_letter, objective_number or output_letter
pub fn parse_scope(scope_str: &str) -> McpResult<ScopeKind> {
    scope_str.parse::<ScopeKind>().map_err(invalid_params)
}

/// Parse an internal status (case-insensitive)
pub fn parse_status(status_str: &str) -> McpResult<InternalStatus> {
    status_str.parse::<InternalStatus>().map_err(invalid_params)
}

/// Parse a YYYY-MM-DD date
///
/// # Arguments
/// * `date_str` - Date string; surrounding whitespace is ignored
///
/// # Returns
/// Result containing parsed NaiveDate or error
pub fn parse_date(date_str: &str) -> McpResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
        invalid_params(format!(
            "Invalid date format '{}'. Use YYYY-MM-DD (e.g., '2025-03-15')",
            date_str
        ))
    })
}

/// Parse a goal letter; blank means "not given"
pub fn parse_goal_letter(letter_str: &str) -> McpResult<Option<Letter>> {
    Letter::parse_optional(letter_str).map_err(|e| invalid_params(e.to_string()))
}

/// Parse an objective number; blank means "not given"
pub fn parse_objective_number(number_str: &str) -> McpResult<Option<u32>> {
    if number_str.trim().is_empty() {
        return Ok(None);
    }
    keys::parse_objective_number(number_str)
        .map(Some)
        .map_err(|e| invalid_params(e.to_string()))
}

/// Parse one output written as `"A: description"`
///
/// A leading `": description"` or a line without a colon is an output with
/// no letter.
///
/// # Arguments
/// * `raw` - One output line as sent by the client
///
/// # Returns
/// Result containing the parsed Output or error naming the bad line
pub fn parse_output(raw: &str) -> McpResult<Output> {
    match raw.split_once(':') {
        Some((letter, description)) => {
            let letter = Letter::parse_optional(letter).map_err(|e| {
                invalid_params(format!("Invalid output '{}': {}", raw, e))
            })?;
            Ok(Output::new(letter, description.trim()))
        }
        None => Ok(Output::new(None, raw.trim())),
    }
}

/// Parse every output line, failing on the first bad one
pub fn parse_outputs(raw: &[String]) -> McpResult<Vec<Output>> {
    raw.iter().map(|s| parse_output(s)).collect()
}
