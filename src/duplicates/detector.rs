//! Duplicate formula detection
//!
//! Groups records whose formulas share a ratio signature, either across a
//! whole collection or for a single record about to be saved.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::signature::build_ratio_signature;
use crate::models::FormulaRecord;

/// Two or more records sharing one ratio signature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup<R> {
    pub signature: String,
    /// In input order
    pub records: Vec<R>,
}

/// Group records by ratio signature
///
/// Records with an empty formula or no comparable ingredients are left out.
/// Only groups of two or more are returned, ordered by where each signature
/// first appears; records keep their input order within a group.
pub fn group_by_ratio_signature<R>(records: &[R]) -> Vec<DuplicateGroup<R>>
where
    R: FormulaRecord + Clone,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<DuplicateGroup<R>> = Vec::new();

    for record in records {
        if record.formula().trim().is_empty() {
            continue;
        }
        let signature = build_ratio_signature(record.formula());
        if signature.is_empty() {
            continue;
        }

        match slots.get(&signature) {
            Some(&slot) => buckets[slot].records.push(record.clone()),
            None => {
                slots.insert(signature.clone(), buckets.len());
                buckets.push(DuplicateGroup {
                    signature,
                    records: vec![record.clone()],
                });
            }
        }
    }

    let signatures = buckets.len();
    buckets.retain(|group| group.records.len() >= 2);
    debug!(
        "Grouped {} records into {} signatures, {} duplicate groups",
        records.len(),
        signatures,
        buckets.len()
    );

    buckets
}

/// Find the records that `record` would duplicate if saved
///
/// An entry of `all_records` with the same id as `record` stands for the
/// record itself: it is counted once, at its position, with the formula being
/// saved rather than the stored one. If `record` is not in the list it is
/// appended. Returns None when the formula has no signature or nothing else
/// shares it.
pub fn detect_on_save<R>(record: &R, all_records: &[R]) -> Option<DuplicateGroup<R>>
where
    R: FormulaRecord + Clone,
{
    let signature = build_ratio_signature(record.formula());
    if signature.is_empty() {
        return None;
    }

    let mut members = Vec::new();
    let mut included_self = false;
    for other in all_records {
        if other.id() == record.id() {
            if !included_self {
                members.push(record.clone());
                included_self = true;
            }
            continue;
        }
        if build_ratio_signature(other.formula()) == signature {
            members.push(other.clone());
        }
    }
    if !included_self {
        members.push(record.clone());
    }

    if members.len() < 2 {
        return None;
    }
    Some(DuplicateGroup {
        signature,
        records: members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormulaEntry, RecordKey};

    fn sample_records() -> Vec<FormulaEntry> {
        vec![
            FormulaEntry::new(1, "蓝5g 白2g"),
            FormulaEntry::new(2, "蓝10g 白4g"),
            FormulaEntry::new(3, "红5g 白2g"),
        ]
    }

    fn ids<R: FormulaRecord<Id = RecordKey>>(records: &[R]) -> Vec<RecordKey> {
        records.iter().map(|r| r.id().clone()).collect()
    }

    #[test]
    fn test_group_scaled_duplicates() {
        let groups = group_by_ratio_signature(&sample_records());
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0].records), vec![RecordKey::from(1), RecordKey::from(2)]);
        assert_eq!(groups[0].signature, build_ratio_signature("蓝5g 白2g"));
    }

    #[test]
    fn test_group_never_returns_singletons() {
        let records = vec![
            FormulaEntry::new(1, "蓝5g 白2g"),
            FormulaEntry::new(2, "红5g 白2g"),
            FormulaEntry::new(3, "黄1g"),
        ];
        assert!(group_by_ratio_signature(&records).is_empty());
    }

    #[test]
    fn test_group_excludes_empty_formulas() {
        let records = vec![
            FormulaEntry::new(1, ""),
            FormulaEntry::new(2, ""),
            FormulaEntry::new(3, "   "),
            FormulaEntry::new(4, "朱红 钛白"),
            FormulaEntry::new(5, "朱红 钛白"),
        ];
        assert!(group_by_ratio_signature(&records).is_empty());
    }

    #[test]
    fn test_groups_ordered_by_first_appearance() {
        let records = vec![
            FormulaEntry::new("a", "红1g 白1g"),
            FormulaEntry::new("b", "蓝5g 白2g"),
            FormulaEntry::new("c", "蓝10g 白4g"),
            FormulaEntry::new("d", "白3g 红3g"),
            FormulaEntry::new("e", "红2g 白2g"),
        ];
        let groups = group_by_ratio_signature(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(
            ids(&groups[0].records),
            vec![RecordKey::from("a"), RecordKey::from("d"), RecordKey::from("e")]
        );
        assert_eq!(ids(&groups[1].records), vec![RecordKey::from("b"), RecordKey::from("c")]);
    }

    #[test]
    fn test_separator_in_name_is_not_a_duplicate() {
        let records = vec![
            FormulaEntry::new(1, "a#g#2|b 1g"),
            FormulaEntry::new(2, "a2g b1g"),
        ];
        assert!(group_by_ratio_signature(&records).is_empty());
    }

    #[test]
    fn test_detect_on_save_new_record() {
        let record = FormulaEntry::new(4, "蓝5g 白2g");
        let group = detect_on_save(&record, &sample_records()).unwrap();
        assert_eq!(
            ids(&group.records),
            vec![RecordKey::from(1), RecordKey::from(2), RecordKey::from(4)]
        );
        assert_eq!(group.signature, build_ratio_signature("蓝10g 白4g"));
    }

    #[test]
    fn test_detect_on_save_no_match() {
        let record = FormulaEntry::new(4, "绿5g 白2g");
        assert!(detect_on_save(&record, &sample_records()).is_none());
    }

    #[test]
    fn test_detect_on_save_empty_signature() {
        let record = FormulaEntry::new(4, "");
        let mut records = sample_records();
        records.push(FormulaEntry::new(5, ""));
        assert!(detect_on_save(&record, &records).is_none());
    }

    #[test]
    fn test_detect_on_save_edited_record_uses_new_formula() {
        // Record 3 is edited to match 1 and 2; its stored formula is stale
        let edited = FormulaEntry::new(3, "白4g 蓝10g");
        let group = detect_on_save(&edited, &sample_records()).unwrap();
        assert_eq!(
            ids(&group.records),
            vec![RecordKey::from(1), RecordKey::from(2), RecordKey::from(3)]
        );
        assert_eq!(group.records[2].formula, "白4g 蓝10g");
    }

    #[test]
    fn test_detect_on_save_only_self_is_not_duplicate() {
        let records = vec![FormulaEntry::new(1, "蓝5g 白2g")];
        let record = FormulaEntry::new(1, "蓝5g 白2g");
        assert!(detect_on_save(&record, &records).is_none());
    }

    #[test]
    fn test_edit_away_from_duplicate() {
        // Record 2 changes to a new ratio, so record 1 no longer matches it
        let edited = FormulaEntry::new(2, "蓝10g 白3g");
        assert!(detect_on_save(&edited, &sample_records()).is_none());
    }
}
