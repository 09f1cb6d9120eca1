//! Generates and validates the light mapping catalog document.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::info;
use std::path::PathBuf;

use light_transfer::catalog::MappingCatalog;
use light_transfer::load_records;

const DEFAULT_CATALOG_FILE: &str = "light_mapping_catalog.json";

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("catalog_tool")
        .about("Writes the built-in light mapping catalog to a JSON document")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output path for the catalog document")
                .default_value(DEFAULT_CATALOG_FILE),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .value_name("FILE")
                .help("Validate an existing catalog document instead of writing one"),
        )
        .arg(
            Arg::new("check-lights")
                .long("check-lights")
                .value_name("FILE")
                .help("Validate an exported light document against the built-in catalog"),
        )
        .get_matches();

    if let Some(path) = matches.get_one::<String>("check") {
        return check_catalog(path);
    }
    if let Some(path) = matches.get_one::<String>("check-lights") {
        return check_lights(path);
    }

    let output = PathBuf::from(matches.get_one::<String>("output").unwrap());
    let catalog = MappingCatalog::builtin();
    catalog
        .save(&output)
        .with_context(|| format!("Failed to write catalog to {}", output.display()))?;

    println!("Catalog written: {}", output.display());
    Ok(())
}

fn check_catalog(path: &str) -> Result<()> {
    let catalog = MappingCatalog::load(path)
        .with_context(|| format!("Failed to load catalog from {path}"))?;

    if catalog == MappingCatalog::builtin() {
        println!("Catalog matches the built-in tables: {path}");
    } else {
        println!("Catalog is valid but diverges from the built-in tables: {path}");
    }
    Ok(())
}

fn check_lights(path: &str) -> Result<()> {
    let catalog = MappingCatalog::builtin();
    let records =
        load_records(path).with_context(|| format!("Failed to load light document from {path}"))?;

    let mut sections = 0usize;
    for record in &records {
        for (renderer, section) in &record.sections {
            catalog
                .mapping_for(*renderer, section.light_type)
                .with_context(|| {
                    format!(
                        "Light '{}' has no {renderer} mapping for '{}'",
                        record.name, section.light_type
                    )
                })?;
            sections += 1;
        }
        info!("light '{}' checked", record.name);
    }

    println!("Checked {} lights ({sections} sections): {path}", records.len());
    Ok(())
}
