//! Custom Color MCP Tools
//!
//! Tools for managing the color catalog. Saving a color checks it against the
//! rest of the catalog and reports likely duplicates, but never refuses the save.

use serde::Serialize;
use tracing::warn;

use crate::catalog::CatalogStore;
use crate::duplicates::{build_ratio_signature, detect_on_save, parse_ratio};
use crate::formula::{self, Ingredient};
use crate::models::{CustomColor, CustomColorCreate, CustomColorUpdate};

/// Minimal reference to another color
#[derive(Debug, Clone, Serialize)]
pub struct ColorRef {
    pub id: i64,
    pub code: String,
    pub name: Option<String>,
}

impl From<&CustomColor> for ColorRef {
    fn from(color: &CustomColor) -> Self {
        Self {
            id: color.id,
            code: color.code.clone(),
            name: color.name.clone(),
        }
    }
}

/// Advisory note that a saved color mixes the same ratio as others
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateWarning {
    pub message: String,
    pub signature: String,
    pub ratio: String,
    pub matching_colors: Vec<ColorRef>,
}

/// Response for add_color and update_color
#[derive(Debug, Serialize)]
pub struct SaveColorResponse {
    pub color: CustomColor,
    pub signature: String,
    pub duplicate_warning: Option<DuplicateWarning>,
}

/// Full color detail with its parsed formula
#[derive(Debug, Serialize)]
pub struct ColorDetail {
    pub color: CustomColor,
    pub ingredients: Vec<Ingredient>,
    pub unit_buckets: Vec<String>,
    pub signature: String,
    pub ratio: String,
}

/// Color summary for listing
#[derive(Debug, Serialize)]
pub struct ColorSummary {
    pub id: i64,
    pub code: String,
    pub name: Option<String>,
    pub formula: String,
    pub ingredient_count: usize,
}

/// Response for list_colors
#[derive(Debug, Serialize)]
pub struct ListColorsResponse {
    pub colors: Vec<ColorSummary>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Response for delete_color
#[derive(Debug, Serialize)]
pub struct DeleteColorResponse {
    pub success: bool,
    pub deleted_id: i64,
    pub deleted_code: String,
}

/// Compare a just-saved color with the rest of the catalog
fn duplicate_warning(color: &CustomColor, store: &CatalogStore) -> Option<DuplicateWarning> {
    let group = detect_on_save(color, store.colors())?;

    let matching_colors: Vec<ColorRef> = group
        .records
        .iter()
        .filter(|c| c.id != color.id)
        .map(ColorRef::from)
        .collect();

    let codes: Vec<&str> = matching_colors.iter().map(|c| c.code.as_str()).collect();
    warn!(
        "Color {} ({}) has the same ratio as {}",
        color.id,
        color.code,
        codes.join(", ")
    );

    Some(DuplicateWarning {
        message: format!(
            "Formula mixes the same ratio as {} other color(s): {}. Saved anyway.",
            matching_colors.len(),
            codes.join(", ")
        ),
        ratio: parse_ratio(&group.signature).to_display_string(),
        signature: group.signature,
        matching_colors,
    })
}

// ============================================================================
// Color Tools
// ============================================================================

/// Add a new color to the catalog
pub fn add_color(store: &mut CatalogStore, data: CustomColorCreate) -> Result<SaveColorResponse, String> {
    let color = store
        .create(&data)
        .map_err(|e| format!("Failed to add color: {}", e))?;

    Ok(SaveColorResponse {
        signature: build_ratio_signature(&color.formula),
        duplicate_warning: duplicate_warning(&color, store),
        color,
    })
}

/// Update a color; Ok(None) if it does not exist
pub fn update_color(
    store: &mut CatalogStore,
    id: i64,
    data: CustomColorUpdate,
) -> Result<Option<SaveColorResponse>, String> {
    let updated = store
        .update(id, &data)
        .map_err(|e| format!("Failed to update color: {}", e))?;

    Ok(updated.map(|color| SaveColorResponse {
        signature: build_ratio_signature(&color.formula),
        duplicate_warning: duplicate_warning(&color, store),
        color,
    }))
}

/// Get a color with its parsed formula
pub fn get_color(store: &CatalogStore, id: i64) -> Option<ColorDetail> {
    let color = store.get(id)?.clone();

    let ingredients = formula::parse(&color.formula);
    let signature = build_ratio_signature(&color.formula);

    Some(ColorDetail {
        unit_buckets: formula::unit_buckets(&ingredients),
        ratio: parse_ratio(&signature).to_display_string(),
        ingredients,
        signature,
        color,
    })
}

/// List colors with optional text search and pagination
///
/// The query matches code, name or formula, case-insensitively.
pub fn list_colors(
    store: &CatalogStore,
    query: Option<&str>,
    limit: usize,
    offset: usize,
) -> ListColorsResponse {
    let limit = limit.clamp(1, 200);
    let needle = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let matches: Vec<&CustomColor> = store
        .colors()
        .iter()
        .filter(|c| match &needle {
            Some(needle) => {
                c.code.to_lowercase().contains(needle)
                    || c.name.as_deref().map_or(false, |n| n.to_lowercase().contains(needle))
                    || c.formula.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    let colors = matches
        .iter()
        .skip(offset)
        .take(limit)
        .map(|c| ColorSummary {
            id: c.id,
            code: c.code.clone(),
            name: c.name.clone(),
            formula: c.formula.clone(),
            ingredient_count: formula::parse(&c.formula).len(),
        })
        .collect();

    ListColorsResponse {
        colors,
        total: matches.len(),
        limit,
        offset,
    }
}

/// Delete a color
pub fn delete_color(store: &mut CatalogStore, id: i64) -> Result<DeleteColorResponse, String> {
    let deleted = store
        .delete(id)
        .map_err(|e| format!("Failed to delete color: {}", e))?;

    Ok(DeleteColorResponse {
        success: true,
        deleted_id: deleted.id,
        deleted_code: deleted.code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_color(code: &str, formula: &str) -> CustomColorCreate {
        CustomColorCreate {
            code: code.to_string(),
            formula: formula.to_string(),
            ..Default::default()
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> CatalogStore {
        CatalogStore::open(dir.path().join("colors.json")).unwrap()
    }

    #[test]
    fn test_add_color_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        let response = add_color(&mut store, new_color("C-1", "朱红10g 钛白5g")).unwrap();
        assert_eq!(response.signature, "朱红#g#2|钛白#g#1");
        assert!(response.duplicate_warning.is_none());
    }

    #[test]
    fn test_add_color_warns_but_saves_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        add_color(&mut store, new_color("C-1", "朱红10g 钛白5g")).unwrap();

        let response = add_color(&mut store, new_color("C-2", "钛白1g 朱红2g")).unwrap();
        let warning = response.duplicate_warning.unwrap();
        assert_eq!(warning.matching_colors.len(), 1);
        assert_eq!(warning.matching_colors[0].code, "C-1");
        assert_eq!(warning.ratio, "朱红 2 : 钛白 1");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_color_rejects_empty_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        let err = add_color(&mut store, new_color(" ", "朱红10g")).unwrap_err();
        assert!(err.contains("color code cannot be empty"), "{err}");
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_color_into_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        add_color(&mut store, new_color("C-1", "朱红10g 钛白5g")).unwrap();
        let other = add_color(&mut store, new_color("C-2", "群青3g")).unwrap();

        let response = update_color(
            &mut store,
            other.color.id,
            CustomColorUpdate {
                formula: Some("朱红4g 钛白2g".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert!(response.duplicate_warning.is_some());
        assert_eq!(response.color.formula, "朱红4g 钛白2g");
    }

    #[test]
    fn test_update_color_rejects_empty_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        let saved = add_color(&mut store, new_color("C-1", "朱红10g")).unwrap();

        let update = CustomColorUpdate {
            code: Some("  ".to_string()),
            ..Default::default()
        };
        let err = update_color(&mut store, saved.color.id, update).unwrap_err();
        assert!(err.contains("color code cannot be empty"), "{err}");
        assert_eq!(store.get(saved.color.id).unwrap().code, "C-1");
    }

    #[test]
    fn test_update_missing_color() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        assert!(update_color(&mut store, 42, CustomColorUpdate::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_get_color_detail() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        let saved = add_color(&mut store, new_color("C-1", "朱红10g 调和油5ml")).unwrap();

        let detail = get_color(&store, saved.color.id).unwrap();
        assert_eq!(detail.ingredients.len(), 2);
        assert_eq!(detail.unit_buckets, vec!["g".to_string(), "ml".to_string()]);
        assert!(get_color(&store, 99).is_none());
    }

    #[test]
    fn test_list_colors_search_and_paging() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        add_color(&mut store, new_color("C-1", "朱红10g")).unwrap();
        add_color(&mut store, new_color("C-2", "群青3g")).unwrap();
        add_color(&mut store, new_color("C-3", "朱红1g 钛白1g")).unwrap();

        let all = list_colors(&store, None, 50, 0);
        assert_eq!(all.total, 3);

        let vermilion = list_colors(&store, Some("朱红"), 50, 0);
        assert_eq!(vermilion.total, 2);

        let page = list_colors(&store, Some("  "), 1, 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.colors.len(), 1);
        assert_eq!(page.colors[0].code, "C-2");

        assert_eq!(list_colors(&store, None, 0, 0).limit, 1);
    }

    #[test]
    fn test_delete_color() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        let saved = add_color(&mut store, new_color("C-1", "朱红10g")).unwrap();

        let response = delete_color(&mut store, saved.color.id).unwrap();
        assert!(response.success);
        assert_eq!(response.deleted_code, "C-1");
        assert!(delete_color(&mut store, saved.color.id).is_err());
    }
}
