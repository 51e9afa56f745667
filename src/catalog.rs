//! Catalog loading.
//!
//! Records come either from a JSON file (an array of string-valued
//! objects) or from the built-in sample catalog.

use anyhow::{Context, Result};
use std::path::Path;

use order_agent_core::{Catalog, Projection, Record};

use crate::config::CatalogConfig;

/// Load the catalog described by `[catalog]`.
pub fn load_catalog(config: &CatalogConfig) -> Result<Catalog> {
    let catalog = match &config.path {
        Some(path) => load_catalog_file(path, &config.fields)?,
        None => Catalog::sample(),
    };
    tracing::info!(records = catalog.len(), "catalog initialized");
    Ok(catalog)
}

fn load_catalog_file(path: &Path, fields: &[String]) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;
    Catalog::new(fields.to_vec(), records)
        .with_context(|| format!("Invalid catalog file: {}", path.display()))
}

/// Output projection described by `[catalog]`.
pub fn projection(config: &CatalogConfig) -> Projection {
    Projection::new(config.output_fields.clone(), config.missing_placeholder.clone())
}
