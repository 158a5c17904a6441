//! Duplicate formula detection module
//!
//! Ratio signatures and grouping of records that mix the same proportions.

pub mod detector;
pub mod signature;

pub use detector::{detect_on_save, group_by_ratio_signature, DuplicateGroup};
pub use signature::{
    build_ratio_signature, format_ratio, parse_ratio, RatioBreakdown, RatioItem,
    FIELD_SEPARATOR, SEGMENT_SEPARATOR,
};
