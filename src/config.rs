//! Runtime configuration
//!
//! Settings come from environment variables, with defaults relative to the
//! project directory.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Overrides the catalog file location
pub const CATALOG_PATH_ENV: &str = "ATELIER_CATALOG_PATH";

/// Lifetime of memoized duplicate-grouping results, in seconds
pub const CACHE_TTL_ENV: &str = "ATELIER_CACHE_TTL_SECS";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Get the catalog path from environment or use default
///
/// The default is `data/colors.json` under the project root, found by walking
/// up from `target/release` or `target/debug` next to the executable.
pub fn get_catalog_path() -> PathBuf {
    std::env::var(CATALOG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("colors.json");
            path
        })
}

/// Get the cache TTL from environment or use default
pub fn get_cache_ttl() -> Duration {
    parse_cache_ttl(std::env::var(CACHE_TTL_ENV).ok().as_deref())
}

/// Interpret a raw TTL setting; anything but a whole number of seconds falls back to the default
pub fn parse_cache_ttl(raw: Option<&str>) -> Duration {
    let Some(raw) = raw else {
        return Duration::from_secs(DEFAULT_CACHE_TTL_SECS);
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => {
            warn!(
                "Ignoring {}={:?}: expected seconds, using {}",
                CACHE_TTL_ENV, raw, DEFAULT_CACHE_TTL_SECS
            );
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cache_ttl_default() {
        assert_eq!(parse_cache_ttl(None), Duration::from_secs(DEFAULT_CACHE_TTL_SECS));
    }

    #[test]
    fn test_parse_cache_ttl_values() {
        assert_eq!(parse_cache_ttl(Some("60")), Duration::from_secs(60));
        assert_eq!(parse_cache_ttl(Some(" 0 ")), Duration::ZERO);
    }

    #[test]
    fn test_parse_cache_ttl_invalid_falls_back() {
        let default = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);
        assert_eq!(parse_cache_ttl(Some("five")), default);
        assert_eq!(parse_cache_ttl(Some("-1")), default);
        assert_eq!(parse_cache_ttl(Some("")), default);
    }

    #[test]
    fn test_default_catalog_path_ends_with_colors_json() {
        if std::env::var(CATALOG_PATH_ENV).is_err() {
            assert!(get_catalog_path().ends_with("data/colors.json"));
        }
    }
}
