//! Data models
//!
//! Record types flowing between the catalog and the duplicate detector.

mod custom_color;
mod record;

pub use custom_color::{CustomColor, CustomColorCreate, CustomColorUpdate};
pub use record::{FormulaEntry, FormulaRecord, RecordKey};
