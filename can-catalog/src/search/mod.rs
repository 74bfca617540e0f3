//! Fuzzy search over the signal catalog

pub mod fuzzy;
pub mod index;

pub use index::{SearchHit, SearchIndex, SearchIndexEntry, SearchMatch};
