//! Signal record loading
//!
//! Reads the JSON array of records produced by the definition-file exporter
//! and publishes it into a [`CatalogStore`].

use anyhow::{Context, Result};
use can_catalog::{CatalogStore, RawSignalRecord};
use std::fs;
use std::path::Path;

/// Parse a JSON array of signal records
pub fn read_records(path: &Path) -> Result<Vec<RawSignalRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read signal records: {:?}", path))?;

    let records: Vec<RawSignalRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse signal records: {:?}", path))?;

    log::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Read records and build a store with the resulting catalog published
pub fn load_store(path: &Path) -> Result<CatalogStore> {
    let records = read_records(path)?;
    let store = CatalogStore::new();
    store
        .rebuild(records)
        .with_context(|| format!("Invalid signal records in {:?}", path))?;
    Ok(store)
}
