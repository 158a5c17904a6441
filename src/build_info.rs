//! Build information module
//!
//! What the running binary was built from, and which catalog file and ratio
//! signature formats it reads and writes.

use serde::Serialize;

use crate::catalog::CATALOG_FORMAT_VERSION;
use crate::duplicates::{FIELD_SEPARATOR, SEGMENT_SEPARATOR};

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("ATELIER_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Cargo profile, `debug` or `release`
pub const BUILD_PROFILE: &str = match option_env!("ATELIER_BUILD_PROFILE") {
    Some(s) => s,
    None => "unknown",
};

/// Target triple the binary was compiled for
pub const BUILD_TARGET: &str = match option_env!("ATELIER_BUILD_TARGET") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build and format information reported by `atelier_status`
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub profile: &'static str,
    pub target: &'static str,
    pub catalog_format_version: u32,
    /// Shape of a ratio signature, e.g. `name#unit#n|name#unit#n`
    pub signature_layout: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        let segment = format!("name{FIELD_SEPARATOR}unit{FIELD_SEPARATOR}n");
        Self {
            name: NAME,
            version: VERSION,
            build_timestamp: BUILD_TIMESTAMP,
            profile: BUILD_PROFILE,
            target: BUILD_TARGET,
            catalog_format_version: CATALOG_FORMAT_VERSION,
            signature_layout: format!("{segment}{SEGMENT_SEPARATOR}{segment}"),
        }
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  Atelier Formula Catalog {}", info.version);
    eprintln!("  Built {} ({}, {})", info.build_timestamp, info.profile, info.target);
    eprintln!(
        "  Catalog format v{} | Signatures {}",
        info.catalog_format_version, info.signature_layout
    );
    eprintln!("===============================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_build_info() {
        let info = BuildInfo::current();
        assert_eq!(info.name, "atelier");
        assert_eq!(info.version, VERSION);
        assert_eq!(info.catalog_format_version, CATALOG_FORMAT_VERSION);
    }

    #[test]
    fn test_signature_layout_matches_separators() {
        let info = BuildInfo::current();
        assert_eq!(info.signature_layout, "name#unit#n|name#unit#n");
    }
}
