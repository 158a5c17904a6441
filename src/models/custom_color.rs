//! Custom color model
//!
//! A studio color: its code, display name and the mixing formula that
//! produces it.

use serde::{Deserialize, Serialize};

use super::FormulaRecord;

/// A custom color as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomColor {
    pub id: i64,
    /// Studio color code, e.g. "C-0412"
    pub code: String,
    pub name: Option<String>,
    #[serde(default)]
    pub formula: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a custom color
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomColorCreate {
    pub code: String,
    pub name: Option<String>,
    #[serde(default)]
    pub formula: String,
    pub notes: Option<String>,
}

/// Data for updating a custom color
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomColorUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub formula: Option<String>,
    pub notes: Option<String>,
}

impl CustomColor {
    /// Short label for listings: the name when present, else the code
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }

    /// Apply the fields present in an update
    pub fn apply(&mut self, data: &CustomColorUpdate) {
        if let Some(ref code) = data.code {
            self.code = code.trim().to_string();
        }
        if let Some(ref name) = data.name {
            self.name = Some(name.clone());
        }
        if let Some(ref formula) = data.formula {
            self.formula = formula.clone();
        }
        if let Some(ref notes) = data.notes {
            self.notes = Some(notes.clone());
        }
    }
}

impl FormulaRecord for CustomColor {
    type Id = i64;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn formula(&self) -> &str {
        &self.formula
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> CustomColor {
        CustomColor {
            id: 1,
            code: "C-001".to_string(),
            name: None,
            formula: "朱红10g 钛白5g".to_string(),
            notes: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_label_falls_back_to_code() {
        let mut c = color();
        assert_eq!(c.label(), "C-001");
        c.name = Some("Vermilion tint".to_string());
        assert_eq!(c.label(), "Vermilion tint");
    }

    #[test]
    fn test_apply_partial_update() {
        let mut c = color();
        c.apply(&CustomColorUpdate {
            formula: Some("朱红20g 钛白5g".to_string()),
            code: Some("  C-002 ".to_string()),
            ..Default::default()
        });
        assert_eq!(c.code, "C-002");
        assert_eq!(c.formula, "朱红20g 钛白5g");
        assert_eq!(c.name, None);
    }
}
