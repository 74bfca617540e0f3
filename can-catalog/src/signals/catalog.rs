//! The signal catalog
//!
//! Holds every validated signal definition together with the lookup indices
//! built at construction time (path, arbitration ID). A catalog is never
//! mutated after [`Catalog::build`] returns; replacing it means building a new
//! one and publishing it through [`CatalogStore`](crate::CatalogStore).

use super::definition::SignalDefinition;
use super::record::RawSignalRecord;
use crate::types::{CatalogBuildError, CatalogError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Immutable collection of signal definitions
#[derive(Debug, Clone)]
pub struct Catalog {
    /// All definitions, in build order
    signals: Vec<SignalDefinition>,

    /// Key: signal path, Value: index into `signals`
    by_path: HashMap<String, usize>,

    /// Key: CAN ID, Value: indices of the signals carried by that frame (build order)
    by_frame: HashMap<u32, Vec<usize>>,
}

impl Catalog {
    /// Build a catalog from raw records
    ///
    /// Fails on the first record with an invalid layout or a path that was
    /// already seen. Nothing is returned on failure.
    pub fn build<I>(records: I) -> std::result::Result<Self, CatalogBuildError>
    where
        I: IntoIterator<Item = RawSignalRecord>,
    {
        let mut signals = Vec::new();
        let mut by_path = HashMap::new();
        let mut by_frame: HashMap<u32, Vec<usize>> = HashMap::new();

        for (index, record) in records.into_iter().enumerate() {
            if record.path.trim().is_empty() {
                return Err(CatalogBuildError::EmptyPath { index });
            }

            let signal = SignalDefinition::from_record(record)?;
            let idx = signals.len();

            if by_path.insert(signal.path.clone(), idx).is_some() {
                return Err(CatalogBuildError::DuplicatePath { path: signal.path });
            }

            by_frame.entry(signal.can_id).or_default().push(idx);
            signals.push(signal);
        }

        log::info!(
            "Built signal catalog: {} signals across {} frames",
            signals.len(),
            by_frame.len()
        );

        Ok(Self {
            signals,
            by_path,
            by_frame,
        })
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// All definitions in build order
    pub fn signals(&self) -> &[SignalDefinition] {
        &self.signals
    }

    /// Exact lookup by full path
    pub fn get_by_path(&self, path: &str) -> Result<&SignalDefinition> {
        self.by_path
            .get(path)
            .map(|&idx| &self.signals[idx])
            .ok_or_else(|| CatalogError::SignalNotFound(path.to_string()))
    }

    /// All signals with the given leaf identifier
    pub fn get_by_identifier(&self, identifier: &str) -> Vec<&SignalDefinition> {
        self.signals
            .iter()
            .filter(|s| s.identifier == identifier)
            .collect()
    }

    /// All signals of a device, matched by display name or device key
    /// (case-insensitive), in build order
    pub fn get_by_device(&self, device: &str) -> Vec<&SignalDefinition> {
        let device = device.trim();
        self.signals
            .iter()
            .filter(|s| {
                s.device.eq_ignore_ascii_case(device) || s.device_key().eq_ignore_ascii_case(device)
            })
            .collect()
    }

    /// Device name → number of signals
    pub fn list_devices(&self) -> BTreeMap<String, usize> {
        let mut devices = BTreeMap::new();
        for signal in &self.signals {
            *devices.entry(signal.device.clone()).or_insert(0) += 1;
        }
        devices
    }

    /// Per-device name, ID and signal count, in first-appearance order
    pub fn device_summaries(&self) -> Vec<DeviceSummary> {
        let mut summaries: Vec<DeviceSummary> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for signal in &self.signals {
            match positions.get(signal.device.as_str()) {
                Some(&pos) => summaries[pos].count += 1,
                None => {
                    positions.insert(signal.device.as_str(), summaries.len());
                    summaries.push(DeviceSummary {
                        name: signal.device.clone(),
                        device_id: signal.device_id,
                        count: 1,
                    });
                }
            }
        }

        summaries
    }

    /// Signals carried by a frame; empty if the ID is unknown
    pub fn signals_for_frame(&self, can_id: u32) -> Vec<&SignalDefinition> {
        self.by_frame
            .get(&can_id)
            .map(|indices| indices.iter().map(|&idx| &self.signals[idx]).collect())
            .unwrap_or_default()
    }

    /// Whether any signal uses this arbitration ID
    pub fn has_frame(&self, can_id: u32) -> bool {
        self.by_frame.contains_key(&can_id)
    }

    /// All unique CAN IDs, sorted
    pub fn can_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.by_frame.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get catalog statistics
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            num_signals: self.signals.len(),
            num_frames: self.by_frame.len(),
            num_devices: self.list_devices().len(),
        }
    }
}

/// One row of the device listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub name: String,
    pub device_id: u32,
    pub count: usize,
}

/// Catalog statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Total number of signal definitions
    pub num_signals: usize,
    /// Number of distinct arbitration IDs
    pub num_frames: usize,
    /// Number of distinct devices
    pub num_devices: usize,
}
