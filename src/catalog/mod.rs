//! Catalog module
//!
//! Handles persistence of the studio's custom colors.

pub mod store;

pub use store::{CatalogError, CatalogResult, CatalogStore, CATALOG_FORMAT_VERSION};
