//! Catalog store
//!
//! Custom colors persisted as a single JSON file. The whole catalog is held in
//! memory and written back after every change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{CustomColor, CustomColorCreate, CustomColorUpdate};

/// Catalog error types
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog format error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Custom color not found: {0}")]
    NotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog format version {0} is newer than supported version {}", CATALOG_FORMAT_VERSION)]
    UnsupportedVersion(u32),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Layout version written into every catalog file
pub const CATALOG_FORMAT_VERSION: u32 = 1;

/// Files written before versioning
fn unversioned() -> u32 {
    1
}

/// On-disk layout of the catalog file
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default = "unversioned")]
    version: u32,
    #[serde(default)]
    next_id: i64,
    #[serde(default)]
    colors: Vec<CustomColor>,
}

/// JSON-file backed collection of custom colors
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    next_id: i64,
    colors: Vec<CustomColor>,
}

impl Default for CatalogFile {
    fn default() -> Self {
        Self {
            version: CATALOG_FORMAT_VERSION,
            next_id: 1,
            colors: Vec::new(),
        }
    }
}

/// Current UTC time in the catalog's timestamp format
fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

impl CatalogStore {
    /// Open the catalog at `path`, starting empty if the file does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref().to_path_buf();

        let file = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                CatalogFile::default()
            } else {
                serde_json::from_str::<CatalogFile>(&raw)?
            }
        } else {
            CatalogFile::default()
        };

        if file.version > CATALOG_FORMAT_VERSION {
            return Err(CatalogError::UnsupportedVersion(file.version));
        }

        // Never hand out an id that is already taken, whatever the file says
        let max_id = file.colors.iter().map(|c| c.id).max().unwrap_or(0);
        let next_id = file.next_id.max(max_id + 1).max(1);

        info!(
            "Opened catalog {} with {} colors",
            path.display(),
            file.colors.len()
        );

        Ok(Self {
            path,
            next_id,
            colors: file.colors,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All colors, in creation order
    pub fn colors(&self) -> &[CustomColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get a color by ID
    pub fn get(&self, id: i64) -> Option<&CustomColor> {
        self.colors.iter().find(|c| c.id == id)
    }

    /// Add a color and persist the catalog
    pub fn create(&mut self, data: &CustomColorCreate) -> CatalogResult<CustomColor> {
        let code = data.code.trim();
        if code.is_empty() {
            return Err(CatalogError::InvalidInput(
                "color code cannot be empty".to_string(),
            ));
        }

        let now = now_timestamp();
        let color = CustomColor {
            id: self.next_id,
            code: code.to_string(),
            name: data.name.clone(),
            formula: data.formula.clone(),
            notes: data.notes.clone(),
            created_at: now.clone(),
            updated_at: now,
        };

        let mut colors = self.colors.clone();
        colors.push(color.clone());
        self.commit(self.next_id + 1, colors)?;

        Ok(color)
    }

    /// Update a color and persist the catalog
    ///
    /// Returns Ok(None) if no color has this ID.
    pub fn update(&mut self, id: i64, data: &CustomColorUpdate) -> CatalogResult<Option<CustomColor>> {
        if let Some(ref code) = data.code {
            if code.trim().is_empty() {
                return Err(CatalogError::InvalidInput(
                    "color code cannot be empty".to_string(),
                ));
            }
        }

        let Some(index) = self.colors.iter().position(|c| c.id == id) else {
            return Ok(None);
        };

        let mut colors = self.colors.clone();
        let color = &mut colors[index];
        color.apply(data);
        color.updated_at = now_timestamp();
        let updated = color.clone();

        self.commit(self.next_id, colors)?;
        Ok(Some(updated))
    }

    /// Delete a color and persist the catalog
    pub fn delete(&mut self, id: i64) -> CatalogResult<CustomColor> {
        let Some(index) = self.colors.iter().position(|c| c.id == id) else {
            return Err(CatalogError::NotFound(id));
        };
        let mut colors = self.colors.clone();
        let removed = colors.remove(index);

        self.commit(self.next_id, colors)?;
        Ok(removed)
    }

    /// Write the catalog to disk
    pub fn save(&self) -> CatalogResult<()> {
        self.write(&CatalogFile {
            version: CATALOG_FORMAT_VERSION,
            next_id: self.next_id,
            colors: self.colors.clone(),
        })
    }

    /// Persist a changed catalog, adopting it in memory only once it is on disk
    fn commit(&mut self, next_id: i64, colors: Vec<CustomColor>) -> CatalogResult<()> {
        let file = CatalogFile {
            version: CATALOG_FORMAT_VERSION,
            next_id,
            colors,
        };
        self.write(&file)?;

        self.next_id = file.next_id;
        self.colors = file.colors;
        Ok(())
    }

    /// Write to a sibling temp file, then rename it over the catalog
    ///
    /// A failed write never leaves a truncated catalog behind.
    fn write(&self, file: &CatalogFile) -> CatalogResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(file)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;

        info!("Saved catalog {} ({} colors)", self.path.display(), file.colors.len());
        Ok(())
    }
}
