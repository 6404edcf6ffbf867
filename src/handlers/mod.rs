//! MCP tool handlers for the work plan server
//!
//! Each file holds the handlers for one level of the hierarchy; the
//! `#[tool]` wrappers in `lib.rs` forward to them.

pub mod goal;
pub mod keys;
pub mod objective;
pub mod workplan;
