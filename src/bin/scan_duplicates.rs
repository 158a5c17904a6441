//! Scan a color catalog for formulas that mix to the same ratio
//! Usage: cargo run --bin scan_duplicates -- [catalog.json]

use std::path::PathBuf;

use atelier::catalog::CatalogStore;
use atelier::config;
use atelier::tools::duplicates::find_catalog_duplicates;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::get_catalog_path);
    println!("Catalog: {}", catalog_path.display());

    let store = CatalogStore::open(&catalog_path)?;
    let report = find_catalog_duplicates(&store);

    println!(
        "Scanned {} colors ({} without a comparable formula)",
        report.records_scanned, report.not_comparable
    );

    if report.groups.is_empty() {
        println!("No duplicate formulas found");
        return Ok(());
    }

    for (index, group) in report.groups.iter().enumerate() {
        println!("\nGroup {} ({} colors): {}", index + 1, group.size, group.ratio);
        for color in &group.records {
            println!("  [{}] {}: {}", color.id, color.label(), color.formula);
        }
    }

    println!("\n{} duplicate group(s)", report.group_count);
    Ok(())
}
