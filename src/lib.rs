//! Atelier Library
//!
//! Paint mixing formula parsing, ratio signatures and duplicate-formula
//! detection for a studio color catalog.

pub mod build_info;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod duplicates;
pub mod formula;
pub mod mcp;
pub mod models;
pub mod tools;

pub use duplicates::{
    build_ratio_signature, detect_on_save, group_by_ratio_signature, parse_ratio, DuplicateGroup,
    RatioBreakdown, RatioItem,
};
pub use formula::{hash, parse, unit_buckets, Amount, Ingredient};
pub use models::{FormulaEntry, FormulaRecord, RecordKey};
