//! Shared catalog snapshots
//!
//! A [`CatalogSnapshot`] pairs a catalog with the search index built from it.
//! [`CatalogStore`] holds the currently published snapshot behind an atomic
//! pointer: readers grab an `Arc` and keep using it for as long as they need,
//! while a rebuild constructs a complete new snapshot and swaps it in.

use crate::config::SearchConfig;
use crate::frame_decoder::{FrameDecode, FrameDecoder};
use crate::search::{SearchHit, SearchIndex, SearchMatch};
use crate::signals::{Catalog, RawSignalRecord};
use crate::types::{CatalogBuildError, CatalogError, Result};
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// An immutable catalog together with its search index
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    catalog: Arc<Catalog>,
    index: SearchIndex,
}

impl CatalogSnapshot {
    pub fn new(catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let index = SearchIndex::build(Arc::clone(&catalog));
        Self { catalog, index }
    }

    /// Build catalog and index from raw records
    pub fn from_records<I>(records: I) -> std::result::Result<Self, CatalogBuildError>
    where
        I: IntoIterator<Item = RawSignalRecord>,
    {
        Ok(Self::new(Catalog::build(records)?))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Ranked fuzzy search
    pub fn search(&self, query: &str, config: &SearchConfig) -> Vec<SearchMatch<'_>> {
        self.index.query(query, config)
    }

    /// Decode one frame against this snapshot's catalog
    pub fn decode(&self, can_id: u32, data: &[u8]) -> FrameDecode {
        FrameDecoder::decode(&self.catalog, can_id, data)
    }
}

/// Atomically swappable holder of the current snapshot
#[derive(Debug, Default)]
pub struct CatalogStore {
    current: ArcSwapOption<CatalogSnapshot>,
}

impl CatalogStore {
    /// Create a store with no catalog loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `catalog` and make it the current snapshot
    pub fn publish(&self, catalog: Catalog) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(CatalogSnapshot::new(catalog));
        self.current.store(Some(Arc::clone(&snapshot)));
        log::info!(
            "Published signal catalog ({} signals)",
            snapshot.catalog().len()
        );
        snapshot
    }

    /// Build a new catalog from `records` and publish it
    ///
    /// On failure the previously published snapshot (if any) stays current.
    pub fn rebuild<I>(&self, records: I) -> Result<Arc<CatalogSnapshot>>
    where
        I: IntoIterator<Item = RawSignalRecord>,
    {
        match Catalog::build(records) {
            Ok(catalog) => Ok(self.publish(catalog)),
            Err(e) => {
                log::error!("Catalog rebuild failed, keeping previous snapshot: {}", e);
                Err(e.into())
            }
        }
    }

    /// Drop the current snapshot; in-flight readers keep theirs
    pub fn clear(&self) {
        self.current.store(None);
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// The current snapshot, or `CatalogUnavailable`
    pub fn snapshot(&self) -> Result<Arc<CatalogSnapshot>> {
        self.current.load_full().ok_or(CatalogError::CatalogUnavailable)
    }

    /// Ranked fuzzy search against the current snapshot
    pub fn search(&self, query: &str, config: &SearchConfig) -> Result<Vec<SearchHit>> {
        let snapshot = self.snapshot()?;
        let hits = snapshot
            .search(query, config)
            .iter()
            .map(SearchMatch::to_hit)
            .collect();
        Ok(hits)
    }

    /// Decode one frame against the current snapshot
    pub fn decode(&self, can_id: u32, data: &[u8]) -> Result<FrameDecode> {
        Ok(self.snapshot()?.decode(can_id, data))
    }
}
