//! Atelier Status Tool
//!
//! Provides runtime status information about the Atelier service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::cache::CacheStats;

/// Formula writing and duplicate checking instructions for AI assistants
pub const FORMULA_INSTRUCTIONS: &str = r#"
# Atelier Formula Instructions

This guide explains how to record mixing formulas and check them for duplicates.

## Writing Formulas

A formula is a list of ingredients separated by spaces. Each ingredient is a
pigment name followed by an amount and a unit:

| Form | Example |
|------|---------|
| All in one | `朱红10g 钛白5g` |
| Name, then amount with unit | `朱红 10g 钛白 5g` |
| Name, amount, unit | `朱红 10 g 钛白 5 g` |

- Amounts are whole numbers or decimals with a `.` (`2.5`), never fractions.
- Units are letters, CJK characters or `%`: `g`, `ml`, `滴`, `%`.
- A name with no amount (`群青`) is kept but ignored when comparing formulas.

## How Duplicates Are Detected

Two formulas are duplicates when they mix the same pigments in the same
proportions, whatever the batch size or ingredient order:

- `朱红10g 钛白5g` and `钛白1g 朱红2g` are duplicates (both 2 : 1).
- `朱红10g 钛白6g` is not (5 : 3).
- `朱红10g 钛白5ml` is not: units must match too.

Use `ratio_signature` to see the canonical ratio of a formula and
`compare_formulas` to compare two directly.

## Saving Colors

- `add_color` and `update_color` always save. If the formula matches other
  colors, the response carries a `duplicate_warning` listing them. Tell the
  user and let them decide whether to merge or keep both.
- `find_catalog_duplicates` lists every group of colors sharing a ratio.
- Colors with no usable formula never appear in duplicate groups.

## Quick Reference

| Task | Tool |
|------|------|
| Parse a formula | `parse_formula` |
| Canonical ratio of a formula | `ratio_signature` |
| Decode a signature | `parse_ratio` |
| Compare two formulas | `compare_formulas` |
| Group arbitrary records | `find_duplicate_groups` |
| Check one record before saving | `check_duplicate` |
| Add / update / delete a color | `add_color` / `update_color` / `delete_color` |
| View / list colors | `get_color` / `list_colors` |
| Duplicate groups in the catalog | `find_catalog_duplicates` |
"#;

/// Runtime status of the Atelier service
#[derive(Debug, Clone, Serialize)]
pub struct AtelierStatus {
    /// Build and format information
    pub build: BuildInfo,

    /// Catalog information
    pub catalog_path: String,
    pub catalog_size_bytes: Option<u64>,
    pub color_count: usize,

    /// Duplicate-grouping cache
    pub cache: CacheStats,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    catalog_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(catalog_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            catalog_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, color_count: usize, cache: CacheStats) -> AtelierStatus {
        // Get catalog size if it exists
        let catalog_size_bytes = std::fs::metadata(&self.catalog_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        AtelierStatus {
            build: BuildInfo::current(),
            catalog_path: self.catalog_path.display().to_string(),
            catalog_size_bytes,
            color_count,
            cache,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = StatusTracker::new(dir.path().join("colors.json"));
        let status = tracker.get_status(0, CacheStats::default());
        assert_eq!(status.catalog_size_bytes, None);
        assert_eq!(status.color_count, 0);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.build.name, "atelier");
    }

    #[test]
    fn test_instructions_cover_every_color_tool() {
        for tool in ["add_color", "update_color", "find_catalog_duplicates", "check_duplicate"] {
            assert!(FORMULA_INSTRUCTIONS.contains(tool), "missing {tool}");
        }
    }
}
