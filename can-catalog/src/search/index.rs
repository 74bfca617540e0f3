//! Fuzzy search index over a catalog
//!
//! One entry per signal, holding the normalized composite text (name,
//! identifier, path, description, device, units, type) prepared once at build
//! time. Queries are a linear scan over every entry; catalogs are small enough
//! (hundreds to low thousands of signals) that no inverted index is kept.

use super::fuzzy::{self, Prepared};
use crate::config::SearchConfig;
use crate::signals::{Catalog, SignalDefinition};
use crate::types::Result;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Searchable form of one signal
#[derive(Debug, Clone)]
pub struct SearchIndexEntry {
    /// Index of the signal in the catalog
    signal: usize,
    /// Normalized composite text
    text: String,
    prepared: Prepared,
}

impl SearchIndexEntry {
    fn new(signal: usize, definition: &SignalDefinition) -> Self {
        let parts = [
            definition.name.as_str(),
            definition.identifier.as_str(),
            definition.path.as_str(),
            definition.description.as_str(),
            definition.device.as_str(),
            definition.units.as_str(),
            definition.type_label(),
        ];
        let composite = parts
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let text = fuzzy::normalize(&composite);
        let prepared = Prepared::new(&text);

        Self {
            signal,
            text,
            prepared,
        }
    }

    /// The normalized composite text this entry is matched against
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A ranked match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchMatch<'a> {
    pub signal: &'a SignalDefinition,
    /// Similarity in [0, 100]
    pub score: f64,
}

impl SearchMatch<'_> {
    /// Flatten into the output shape handed to hosts
    pub fn to_hit(&self) -> SearchHit {
        SearchHit {
            path: self.signal.path.clone(),
            score: self.score,
            name: self.signal.name.clone(),
            device: self.signal.device.clone(),
            type_tag: self.signal.type_label().to_string(),
            units: self.signal.units.clone(),
            description: self.signal.description.clone(),
            can_id: self.signal.can_id,
            frequency: self.signal.frequency.clone(),
        }
    }
}

/// Search result as exposed to hosts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub score: f64,
    pub name: String,
    pub device: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub units: String,
    pub description: String,
    pub can_id: u32,
    pub frequency: String,
}

/// Fuzzy search index derived from a catalog
#[derive(Debug, Clone)]
pub struct SearchIndex {
    catalog: Arc<Catalog>,
    entries: Vec<SearchIndexEntry>,
}

impl SearchIndex {
    /// Precompute one entry per catalog signal
    pub fn build(catalog: Arc<Catalog>) -> Self {
        let entries = catalog
            .signals()
            .iter()
            .enumerate()
            .map(|(idx, signal)| SearchIndexEntry::new(idx, signal))
            .collect::<Vec<_>>();

        log::debug!("Built search index with {} entries", entries.len());

        Self { catalog, entries }
    }

    /// The catalog this index was built from
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn entries(&self) -> &[SearchIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked fuzzy lookup
    ///
    /// Scores every entry, drops those under `config.min_score`, orders by
    /// score (descending) then path, and keeps at most `config.max_results`.
    /// An empty or whitespace-only query yields no matches.
    pub fn query(&self, text: &str, config: &SearchConfig) -> Vec<SearchMatch<'_>> {
        let normalized = fuzzy::normalize(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let query = Prepared::new(&normalized);
        let min_score = config.effective_min_score();

        let matches = self
            .entries
            .iter()
            .filter_map(|entry| {
                let score = fuzzy::weighted_ratio(&query, &entry.prepared);
                (score >= min_score).then(|| self.to_match(entry, score))
            })
            .collect();

        let ranked = rank(matches, config);
        log::debug!("Query '{}' matched {} signals", normalized, ranked.len());
        ranked
    }

    /// Keyword lookup: each query word is a substring test on the composite
    /// text. With `strict` every word must hit, otherwise any word. Scored as
    /// the percentage of words that hit.
    pub fn keyword_search(
        &self,
        text: &str,
        strict: bool,
        config: &SearchConfig,
    ) -> Vec<SearchMatch<'_>> {
        let normalized = fuzzy::normalize(text);
        let words: Vec<&str> = normalized.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let min_score = config.effective_min_score();

        let matches = self
            .entries
            .iter()
            .filter_map(|entry| {
                let hits = words.iter().filter(|w| entry.text.contains(**w)).count();
                if hits == 0 || (strict && hits < words.len()) {
                    return None;
                }
                let score = 100.0 * hits as f64 / words.len() as f64;
                (score >= min_score).then(|| self.to_match(entry, score))
            })
            .collect();

        rank(matches, config)
    }

    /// Exact path lookup, delegated to the catalog
    pub fn get_by_path(&self, path: &str) -> Result<&SignalDefinition> {
        self.catalog.get_by_path(path)
    }

    /// Device listing, delegated to the catalog
    pub fn list_devices(&self) -> BTreeMap<String, usize> {
        self.catalog.list_devices()
    }

    fn to_match(&self, entry: &SearchIndexEntry, score: f64) -> SearchMatch<'_> {
        SearchMatch {
            signal: &self.catalog.signals()[entry.signal],
            score,
        }
    }
}

/// Deterministic ordering: score descending, then path ascending
fn rank<'a>(mut matches: Vec<SearchMatch<'a>>, config: &SearchConfig) -> Vec<SearchMatch<'a>> {
    matches.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.signal.path.cmp(&b.signal.path),
        other => other,
    });
    matches.truncate(config.max_results.get());
    matches
}
