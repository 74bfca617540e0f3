//! Signal records, definitions and the catalog
//!
//! This module turns raw records from the definition-file parser into the
//! validated, indexed catalog that search and decoding run against.

pub mod catalog;
pub mod definition;
pub mod record;

// Re-export key types for convenience
pub use catalog::{Catalog, CatalogStats, DeviceSummary};
pub use definition::{BitLayout, ByteOrder, SignalDefinition, SignalType, MAX_CAN_ID};
pub use record::{Endianness, RawSignalRecord};
