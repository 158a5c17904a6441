//! Atelier
//!
//! An MCP server for the studio's paint formula catalog.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use atelier::build_info;
use atelier::catalog::CatalogStore;
use atelier::config;
use atelier::mcp::AtelierService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("atelier=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    // Get catalog path
    let catalog_path = config::get_catalog_path();
    eprintln!("Catalog path: {}", catalog_path.display());

    // Open the catalog (created on first save)
    let catalog = CatalogStore::open(&catalog_path)?;
    eprintln!("Catalog colors: {}", catalog.len());

    let cache_ttl = config::get_cache_ttl();

    // Create the Atelier service
    let service = AtelierService::new(catalog_path, catalog, cache_ttl);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
