//! CAN Signal Catalog Library
//!
//! An in-memory catalog of CAN signal definitions with fuzzy search and frame
//! decoding.
//!
//! # Architecture
//!
//! - [`Catalog`] is built once from raw records handed over by an external
//!   definition-file parser, and is immutable afterwards
//! - [`SearchIndex`] precomputes a searchable text per signal and answers
//!   ranked fuzzy queries
//! - [`FrameDecoder`] turns `(can_id, bytes)` into scaled, typed values
//! - [`CatalogStore`] publishes catalog snapshots so they can be rebuilt while
//!   readers keep working
//!
//! The library does NOT:
//! - Fetch or parse definition files
//! - Perform any I/O or persist anything
//! - Encode values back into frames
//!
//! # Example Usage
//!
//! ```
//! use can_catalog::{CatalogStore, RawSignalRecord, SearchConfig};
//!
//! let store = CatalogStore::new();
//! store
//!     .rebuild(vec![
//!         RawSignalRecord::new("pdu.sensors.batCurrent", 0x607, 0, 16)
//!             .with_name("Battery Current")
//!             .with_description("Battery pack current")
//!             .with_units("A"),
//!     ])
//!     .unwrap();
//!
//! let hits = store.search("battery current", &SearchConfig::default()).unwrap();
//! assert_eq!(hits[0].path, "pdu.sensors.batCurrent");
//!
//! let decoded = store.decode(0x607, &[0x34, 0x12]).unwrap();
//! assert_eq!(decoded.get("pdu.sensors.batCurrent").unwrap().raw, 0x1234);
//! ```

// Public modules
pub mod config;
pub mod frame_decoder;
pub mod search;
pub mod signals;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use config::SearchConfig;
pub use frame_decoder::{FrameDecode, FrameDecoder};
pub use search::{SearchHit, SearchIndex, SearchMatch};
pub use signals::{
    ByteOrder, Catalog, CatalogStats, DeviceSummary, Endianness, RawSignalRecord,
    SignalDefinition, SignalType,
};
pub use store::{CatalogSnapshot, CatalogStore};
pub use types::{
    CatalogBuildError, CatalogError, DecodeWarning, DecodedValue, Result, SignalValue,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
