//! Core types for the CAN signal catalog
//!
//! This module defines the error types raised while building or querying the
//! catalog, and the values the frame decoder emits. Decode-time problems are
//! reported as data (warnings, overflow flags), never as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that abort catalog construction
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogBuildError {
    #[error("Record #{index} has an empty path")]
    EmptyPath { index: usize },

    #[error("Duplicate signal path: {path}")]
    DuplicatePath { path: String },

    #[error("Signal '{path}' has CAN ID 0x{can_id:X} outside the 29-bit range")]
    InvalidCanId { path: String, can_id: u32 },

    #[error("Signal '{path}' has a bit length of zero")]
    ZeroLengthSignal { path: String },

    #[error(
        "Signal '{path}' does not fit in a 64-bit payload \
         (byte {byte_offset}, bit {bit_offset}, length {bit_length})"
    )]
    SignalOutOfFrame {
        path: String,
        byte_offset: u16,
        bit_offset: u16,
        bit_length: u16,
    },

    #[error("Signal '{path}' has a non-finite scale or offset")]
    NonFiniteScaling { path: String },
}

/// Errors surfaced to catalog consumers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Signal not found: {0}")]
    SignalNotFound(String),

    #[error("No signal catalog is loaded")]
    CatalogUnavailable,

    #[error("Failed to build signal catalog: {0}")]
    Build(#[from] CatalogBuildError),
}

/// Decoded physical value of a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// Integer code (enum signals)
    Integer(i64),
    /// Floating-point value (after scaling/offset)
    Float(f64),
    /// Boolean value (raw != 0)
    Boolean(bool),
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Integer(v) => write!(f, "{}", v),
            SignalValue::Float(v) => write!(f, "{:.3}", v),
            SignalValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" }),
        }
    }
}

impl SignalValue {
    /// Convert signal value to f64
    pub fn as_f64(&self) -> f64 {
        match self {
            SignalValue::Integer(v) => *v as f64,
            SignalValue::Float(v) => *v,
            SignalValue::Boolean(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Truthiness of the value (non-zero is true)
    pub fn as_bool(&self) -> bool {
        match self {
            SignalValue::Boolean(v) => *v,
            SignalValue::Integer(v) => *v != 0,
            SignalValue::Float(v) => *v != 0.0,
        }
    }
}

/// A single signal decoded out of a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedValue {
    /// Full dot-separated signal path
    pub path: String,
    /// Arbitration ID of the frame the value came from
    pub can_id: u32,
    /// Raw field value after sign extension
    pub raw: i64,
    /// Physical value
    pub physical: SignalValue,
    /// Engineering unit (empty if none)
    pub units: String,
    /// Set when the raw or physical value does not fit its representation
    pub overflow: bool,
}

/// Non-fatal problems recorded while decoding a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeWarning {
    /// Frame payload too short for this signal; the signal was skipped
    TruncatedFrame {
        path: String,
        required_bytes: usize,
        available_bytes: usize,
    },
    /// Signal type has no numeric decoding; the signal was skipped
    UnsupportedType { path: String, type_tag: String },
    /// Payload longer than 8 bytes; trailing bytes were ignored
    OversizedFrame { can_id: u32, length: usize },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::TruncatedFrame {
                path,
                required_bytes,
                available_bytes,
            } => write!(
                f,
                "{}: needs {} bytes, frame has {}",
                path, required_bytes, available_bytes
            ),
            DecodeWarning::UnsupportedType { path, type_tag } => {
                write!(f, "{}: type '{}' cannot be decoded", path, type_tag)
            }
            DecodeWarning::OversizedFrame { can_id, length } => write!(
                f,
                "0x{:X}: {} byte payload, only the first 8 are used",
                can_id, length
            ),
        }
    }
}
