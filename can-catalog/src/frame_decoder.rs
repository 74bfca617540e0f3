//! Frame Decoding Engine
//!
//! Extracts signal values from raw CAN frames using the catalog's
//! definitions for the frame's arbitration ID. Handles bit extraction,
//! endianness, sign extension and physical value conversion.
//!
//! Bit numbering: bit 0 is the least-significant bit of byte 0. A signal
//! starts at `byte_offset * 8 + bit_offset`. The byte run it spans is
//! assembled into one integer (low byte first for little-endian signals,
//! first byte most significant for big-endian ones), then `bit_length` bits
//! are taken from the signal's in-byte offset upward.
//!
//! Decoding never fails as a whole: unknown frames produce an empty result,
//! and a signal that cannot be decoded is skipped with a warning while the
//! rest of the frame is still decoded.

use crate::signals::{BitLayout, ByteOrder, Catalog, SignalDefinition, SignalType};
use crate::types::{DecodeWarning, DecodedValue, SignalValue};
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use serde::Serialize;
use std::collections::BTreeMap;

/// Addressable payload of a classic CAN frame
pub const MAX_PAYLOAD: usize = 8;

/// Outcome of decoding one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameDecode {
    pub can_id: u32,
    /// Decoded signals keyed by path
    pub values: BTreeMap<String, DecodedValue>,
    /// Signals that were skipped, and frame-level anomalies
    pub warnings: Vec<DecodeWarning>,
}

impl FrameDecode {
    fn new(can_id: u32) -> Self {
        Self {
            can_id,
            values: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// True if nothing was decoded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&DecodedValue> {
        self.values.get(path)
    }
}

/// Frame decoder - extracts catalog signals from CAN frames
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode every known signal carried by `can_id` out of `data`
    ///
    /// # Arguments
    /// * `catalog` - Signal catalog
    /// * `can_id` - Arbitration ID of the frame
    /// * `data` - Payload bytes (0-8; extra bytes are ignored with a warning)
    ///
    /// # Returns
    /// * A [`FrameDecode`] with one value per decodable signal; empty if the
    ///   ID is not in the catalog
    pub fn decode(catalog: &Catalog, can_id: u32, data: &[u8]) -> FrameDecode {
        let mut result = FrameDecode::new(can_id);

        let signals = catalog.signals_for_frame(can_id);
        if signals.is_empty() {
            log::trace!("Unknown CAN ID: 0x{:X}, ignoring frame", can_id);
            return result;
        }

        let payload = if data.len() > MAX_PAYLOAD {
            result.warnings.push(DecodeWarning::OversizedFrame {
                can_id,
                length: data.len(),
            });
            &data[..MAX_PAYLOAD]
        } else {
            data
        };

        for signal in signals {
            match Self::decode_signal(signal, payload) {
                Ok(value) => {
                    result.values.insert(signal.path.clone(), value);
                }
                Err(warning) => {
                    log::warn!("Skipping signal on frame 0x{:X}: {}", can_id, warning);
                    result.warnings.push(warning);
                }
            }
        }

        log::debug!(
            "Decoded frame 0x{:X}: {} values, {} warnings",
            can_id,
            result.values.len(),
            result.warnings.len()
        );

        result
    }

    /// Decode a single signal from frame data
    pub fn decode_signal(
        signal: &SignalDefinition,
        data: &[u8],
    ) -> Result<DecodedValue, DecodeWarning> {
        let layout = &signal.layout;

        // Validate signal fits within data
        let required_bytes = layout.required_bytes();
        if required_bytes > data.len() {
            return Err(DecodeWarning::TruncatedFrame {
                path: signal.path.clone(),
                required_bytes,
                available_bytes: data.len(),
            });
        }

        if signal.signal_type == SignalType::String {
            return Err(DecodeWarning::UnsupportedType {
                path: signal.path.clone(),
                type_tag: signal.type_label().to_string(),
            });
        }

        let bits = Self::extract_raw(data, layout, signal.byte_order);
        let bit_length = usize::from(layout.bit_length());

        // Apply sign extension if needed
        let (raw, raw_overflow) = if signal.signed {
            (Self::sign_extend(bits, bit_length), false)
        } else {
            match i64::try_from(bits) {
                Ok(v) => (v, false),
                Err(_) => (i64::MAX, true),
            }
        };

        let physical = match signal.signal_type {
            SignalType::Boolean => SignalValue::Boolean(bits != 0),
            SignalType::Enum => SignalValue::Integer(raw),
            _ => {
                let raw_value = if signal.signed { raw as f64 } else { bits as f64 };
                SignalValue::Float(signal.raw_to_physical(raw_value))
            }
        };

        let overflow = raw_overflow || matches!(physical, SignalValue::Float(v) if !v.is_finite());
        if overflow {
            log::warn!("Signal '{}' value out of range (raw bits 0x{:X})", signal.path, bits);
        }

        Ok(DecodedValue {
            path: signal.path.clone(),
            can_id: signal.can_id,
            raw,
            physical,
            units: signal.units.clone(),
            overflow,
        })
    }

    /// Extract the raw, unsigned field value
    ///
    /// `data` must hold at least `layout.required_bytes()` bytes.
    fn extract_raw(data: &[u8], layout: &BitLayout, byte_order: ByteOrder) -> u64 {
        let first = layout.first_byte();
        let span = layout.span_bytes();
        debug_assert!((1..=MAX_PAYLOAD).contains(&span), "layout spans {} bytes", span);

        let run = &data[first..first + span];
        let word = match byte_order {
            ByteOrder::LittleEndian => LittleEndian::read_uint(run, span),
            ByteOrder::BigEndian => BigEndian::read_uint(run, span),
        };

        let value = word >> (layout.start_bit() % 8);
        let length = u32::from(layout.bit_length());
        if length >= 64 {
            value
        } else {
            value & ((1u64 << length) - 1)
        }
    }

    /// Sign-extend a value from N bits to 64 bits
    ///
    /// If the value's MSB is 1, fill the upper bits with 1s.
    fn sign_extend(value: u64, bit_length: usize) -> i64 {
        if bit_length >= 64 {
            return value as i64;
        }

        let sign_bit = 1u64 << (bit_length - 1);
        if (value & sign_bit) != 0 {
            let mask = !0u64 << bit_length;
            (value | mask) as i64
        } else {
            value as i64
        }
    }
}
