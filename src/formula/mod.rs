//! Formula parsing module
//!
//! Reads free-text paint mixing formulas into structured ingredients.

pub mod parser;
pub mod units;

pub use parser::{hash, parse, unit_buckets, Ingredient, EMPTY_HASH};
pub use units::{classify_token, is_unit, Amount, TokenShape, MAX_SCALE};
