//! Atelier Tools module
//!
//! MCP tool implementations for the formula catalog.

pub mod colors;
pub mod duplicates;
pub mod formulas;
pub mod status;
