//! Duplicate Detection MCP Tools
//!
//! Tools for finding records that mix the same proportions.

use serde::Serialize;
use tracing::debug;

use crate::catalog::CatalogStore;
use crate::duplicates::{
    build_ratio_signature, detect_on_save, group_by_ratio_signature, parse_ratio, DuplicateGroup,
};
use crate::models::{CustomColor, FormulaRecord};

/// A duplicate group with its ratio spelled out
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroupReport<R> {
    pub signature: String,
    /// e.g. "朱红 2 : 钛白 1"
    pub ratio: String,
    pub size: usize,
    pub records: Vec<R>,
}

impl<R> From<DuplicateGroup<R>> for DuplicateGroupReport<R> {
    fn from(group: DuplicateGroup<R>) -> Self {
        Self {
            ratio: parse_ratio(&group.signature).to_display_string(),
            size: group.records.len(),
            signature: group.signature,
            records: group.records,
        }
    }
}

/// Response for find_duplicate_groups
#[derive(Debug, Clone, Serialize)]
pub struct FindDuplicatesResponse<R> {
    pub groups: Vec<DuplicateGroupReport<R>>,
    pub group_count: usize,
    pub records_scanned: usize,
    /// Records whose formula has no usable ingredients
    pub not_comparable: usize,
}

/// Response for check_duplicate
#[derive(Debug, Clone, Serialize)]
pub struct CheckDuplicateResponse<R> {
    pub is_duplicate: bool,
    pub comparable: bool,
    pub signature: String,
    pub group: Option<DuplicateGroupReport<R>>,
}

/// Group records sharing a ratio signature
pub fn find_duplicate_groups<R>(records: &[R]) -> FindDuplicatesResponse<R>
where
    R: FormulaRecord + Clone,
{
    let not_comparable = records
        .iter()
        .filter(|r| build_ratio_signature(r.formula()).is_empty())
        .count();

    let groups: Vec<DuplicateGroupReport<R>> = group_by_ratio_signature(records)
        .into_iter()
        .map(DuplicateGroupReport::from)
        .collect();

    FindDuplicatesResponse {
        group_count: groups.len(),
        records_scanned: records.len(),
        not_comparable,
        groups,
    }
}

/// Check whether saving `record` would duplicate any of `records`
pub fn check_duplicate<R>(record: &R, records: &[R]) -> CheckDuplicateResponse<R>
where
    R: FormulaRecord + Clone,
{
    let signature = build_ratio_signature(record.formula());
    let group = detect_on_save(record, records).map(DuplicateGroupReport::from);

    CheckDuplicateResponse {
        is_duplicate: group.is_some(),
        comparable: !signature.is_empty(),
        signature,
        group,
    }
}

/// Group the catalog's colors by ratio signature
pub fn find_catalog_duplicates(store: &CatalogStore) -> FindDuplicatesResponse<CustomColor> {
    let response = find_duplicate_groups(store.colors());
    debug!(
        "Catalog scan: {} colors, {} duplicate groups",
        response.records_scanned, response.group_count
    );
    response
}
