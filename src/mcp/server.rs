//! Atelier MCP Server Implementation
//!
//! Implements the MCP server with all Atelier tools.

use std::path::PathBuf;
use std::sync::{Arc, MutexGuard};
use std::time::Duration;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, TtlCache};
use crate::catalog::CatalogStore;
use crate::models::{CustomColor, CustomColorCreate, CustomColorUpdate, FormulaEntry};
use crate::tools::colors;
use crate::tools::duplicates::{self, FindDuplicatesResponse};
use crate::tools::formulas;
use crate::tools::status::StatusTracker;

/// Cache key for the catalog-wide duplicate scan
const CATALOG_SCAN_KEY: &str = "catalog";

/// Memoized duplicate-grouping results, keyed by request
#[derive(Default)]
struct GroupCache {
    records: TtlCache<String, FindDuplicatesResponse<FormulaEntry>>,
    catalog: TtlCache<String, FindDuplicatesResponse<CustomColor>>,
}

impl GroupCache {
    /// Store an ad hoc grouping result, dropping expired ones first
    fn put_records(&mut self, key: String, value: FindDuplicatesResponse<FormulaEntry>, ttl: Duration) {
        let purged = self.records.purge_expired();
        if purged > 0 {
            debug!("Purged {} expired grouping results", purged);
        }
        self.records.put(key, value, ttl);
    }

    /// Store the catalog scan result, dropping expired ones first
    fn put_catalog(&mut self, key: String, value: FindDuplicatesResponse<CustomColor>, ttl: Duration) {
        self.catalog.purge_expired();
        self.catalog.put(key, value, ttl);
    }

    fn invalidate_all(&mut self) {
        self.records.invalidate_all();
        self.catalog.invalidate_all();
    }

    fn stats(&self) -> CacheStats {
        let a = self.records.stats();
        let b = self.catalog.stats();
        CacheStats {
            entries: a.entries + b.entries,
            hits: a.hits + b.hits,
            misses: a.misses + b.misses,
        }
    }
}

/// Atelier MCP Service
#[derive(Clone)]
pub struct AtelierService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    catalog: Arc<std::sync::Mutex<CatalogStore>>,
    group_cache: Arc<std::sync::Mutex<GroupCache>>,
    cache_ttl: Duration,
    tool_router: ToolRouter<AtelierService>,
}

impl AtelierService {
    pub fn new(catalog_path: PathBuf, catalog: CatalogStore, cache_ttl: Duration) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(catalog_path))),
            catalog: Arc::new(std::sync::Mutex::new(catalog)),
            group_cache: Arc::new(std::sync::Mutex::new(GroupCache::default())),
            cache_ttl,
            tool_router: Self::tool_router(),
        }
    }

    fn lock_catalog(&self) -> Result<MutexGuard<'_, CatalogStore>, McpError> {
        self.catalog
            .lock()
            .map_err(|_| McpError::internal_error("Catalog lock poisoned", None))
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, GroupCache>, McpError> {
        self.group_cache
            .lock()
            .map_err(|_| McpError::internal_error("Cache lock poisoned", None))
    }

    /// Drop memoized results after the catalog changes
    fn invalidate_cache(&self) -> Result<(), McpError> {
        self.lock_cache()?.invalidate_all();
        Ok(())
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Formula Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FormulaParams {
    /// Free-text formula, e.g. "朱红10g 钛白5g"
    pub formula: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ParseRatioParams {
    /// Signature as returned by ratio_signature
    pub signature: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompareFormulasParams {
    pub formula_a: String,
    pub formula_b: String,
}

// ============================================================================
// Duplicate Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindDuplicateGroupsParams {
    /// Records to group, each with an id (number or string) and a formula
    pub records: Vec<FormulaEntry>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckDuplicateParams {
    /// The record being created or edited
    pub record: FormulaEntry,
    /// Existing records to check against
    pub records: Vec<FormulaEntry>,
}

// ============================================================================
// Color Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddColorParams {
    pub code: String,
    pub name: Option<String>,
    #[serde(default)]
    pub formula: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ColorIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListColorsParams {
    /// Matches code, name or formula
    pub query: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_list_limit() -> usize { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateColorParams {
    pub id: i64,
    pub code: Option<String>,
    pub name: Option<String>,
    pub formula: Option<String>,
    pub notes: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl AtelierService {
    // --- Status ---

    #[tool(description = "Get the current status of the Atelier service including build info, catalog status, cache statistics and process information")]
    async fn atelier_status(&self) -> Result<CallToolResult, McpError> {
        let color_count = self.lock_catalog()?.len();
        let cache_stats = self.lock_cache()?.stats();
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(color_count, cache_stats);
        json_result(&status)
    }

    #[tool(description = "Get instructions for writing formulas and handling duplicate warnings. Call this when starting a catalog session or when unsure how formulas are compared.")]
    fn formula_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::FORMULA_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(FORMULA_INSTRUCTIONS)]))
    }

    // --- Formulas ---

    #[tool(description = "Parse a free-text formula into ingredients with amounts and units. Names without a readable amount are reported as unparsed.")]
    fn parse_formula(&self, Parameters(p): Parameters<FormulaParams>) -> Result<CallToolResult, McpError> {
        json_result(&formulas::parse_formula(&p.formula))
    }

    #[tool(description = "Compute the canonical ratio signature of a formula. Formulas differing only by batch size or ingredient order share a signature.")]
    fn ratio_signature(&self, Parameters(p): Parameters<FormulaParams>) -> Result<CallToolResult, McpError> {
        json_result(&formulas::ratio_signature(&p.formula))
    }

    #[tool(description = "Decode a ratio signature into its ingredients and ratios for display")]
    fn parse_ratio(&self, Parameters(p): Parameters<ParseRatioParams>) -> Result<CallToolResult, McpError> {
        json_result(&formulas::parse_ratio(&p.signature))
    }

    #[tool(description = "Compare two formulas: same ingredient list, and same mixing ratio")]
    fn compare_formulas(&self, Parameters(p): Parameters<CompareFormulasParams>) -> Result<CallToolResult, McpError> {
        json_result(&formulas::compare_formulas(&p.formula_a, &p.formula_b))
    }

    // --- Duplicates ---

    #[tool(description = "Group records (id + formula) that mix the same ratio. Only groups of two or more are returned; records without a usable formula are skipped.")]
    fn find_duplicate_groups(&self, Parameters(p): Parameters<FindDuplicateGroupsParams>) -> Result<CallToolResult, McpError> {
        let key = serde_json::to_string(&p.records)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        if let Some(cached) = self.lock_cache()?.records.get(&key) {
            debug!("find_duplicate_groups served from cache");
            return json_result(&cached);
        }

        let result = duplicates::find_duplicate_groups(&p.records);
        self.lock_cache()?.put_records(key, result.clone(), self.cache_ttl);
        json_result(&result)
    }

    #[tool(description = "Check whether a record being created or edited mixes the same ratio as any of the given records")]
    fn check_duplicate(&self, Parameters(p): Parameters<CheckDuplicateParams>) -> Result<CallToolResult, McpError> {
        json_result(&duplicates::check_duplicate(&p.record, &p.records))
    }

    #[tool(description = "List every group of catalog colors that mix the same ratio")]
    fn find_catalog_duplicates(&self) -> Result<CallToolResult, McpError> {
        let key = CATALOG_SCAN_KEY.to_string();
        if let Some(cached) = self.lock_cache()?.catalog.get(&key) {
            debug!("find_catalog_duplicates served from cache");
            return json_result(&cached);
        }

        let result = {
            let catalog = self.lock_catalog()?;
            duplicates::find_catalog_duplicates(&catalog)
        };
        self.lock_cache()?.put_catalog(key, result.clone(), self.cache_ttl);
        json_result(&result)
    }

    // --- Colors ---

    #[tool(description = "Add a custom color to the catalog. Always saves; if the formula matches the ratio of existing colors the response includes a duplicate_warning.")]
    fn add_color(&self, Parameters(p): Parameters<AddColorParams>) -> Result<CallToolResult, McpError> {
        let data = CustomColorCreate {
            code: p.code, name: p.name, formula: p.formula, notes: p.notes,
        };
        let result = {
            let mut catalog = self.lock_catalog()?;
            colors::add_color(&mut catalog, data).map_err(|e| McpError::internal_error(e, None))?
        };
        self.invalidate_cache()?;
        json_result(&result)
    }

    #[tool(description = "Get a custom color with its parsed formula and ratio")]
    fn get_color(&self, Parameters(p): Parameters<ColorIdParams>) -> Result<CallToolResult, McpError> {
        let detail = {
            let catalog = self.lock_catalog()?;
            colors::get_color(&catalog, p.id)
        };
        match detail {
            Some(detail) => json_result(&detail),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Color not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "List custom colors with optional search over code, name and formula, and pagination")]
    fn list_colors(&self, Parameters(p): Parameters<ListColorsParams>) -> Result<CallToolResult, McpError> {
        let result = {
            let catalog = self.lock_catalog()?;
            colors::list_colors(&catalog, p.query.as_deref(), p.limit, p.offset)
        };
        json_result(&result)
    }

    #[tool(description = "Update a custom color. Always saves; if the new formula matches the ratio of other colors the response includes a duplicate_warning.")]
    fn update_color(&self, Parameters(p): Parameters<UpdateColorParams>) -> Result<CallToolResult, McpError> {
        let data = CustomColorUpdate {
            code: p.code, name: p.name, formula: p.formula, notes: p.notes,
        };
        let result = {
            let mut catalog = self.lock_catalog()?;
            colors::update_color(&mut catalog, p.id, data).map_err(|e| McpError::internal_error(e, None))?
        };
        self.invalidate_cache()?;
        match result {
            Some(saved) => json_result(&saved),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Color not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "Delete a custom color from the catalog")]
    fn delete_color(&self, Parameters(p): Parameters<ColorIdParams>) -> Result<CallToolResult, McpError> {
        let result = {
            let mut catalog = self.lock_catalog()?;
            colors::delete_color(&mut catalog, p.id).map_err(|e| McpError::internal_error(e, None))?
        };
        self.invalidate_cache()?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for AtelierService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "atelier".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Atelier Formula Catalog".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Atelier - paint mixing formula catalog with duplicate-formula detection. \
                 IMPORTANT: Call formula_instructions before recording formulas. \
                 Formulas: parse_formula, ratio_signature, parse_ratio, compare_formulas. \
                 Duplicates: find_duplicate_groups (any records), check_duplicate (one record before saving), \
                 find_catalog_duplicates. \
                 Colors: add/get/list/update/delete_color. Saves are never blocked by duplicates; \
                 relay any duplicate_warning to the user."
                    .into(),
            ),
        }
    }
}
