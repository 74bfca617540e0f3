//! Validated signal definitions
//!
//! A [`SignalDefinition`] is produced from a [`RawSignalRecord`] once its bit
//! layout, arbitration ID and scaling have been checked. Everything the
//! decoder relies on is guaranteed by construction.

use super::record::{Endianness, RawSignalRecord};
use crate::types::CatalogBuildError;
use serde::Serialize;
use std::fmt::Write as _;

/// Largest arbitration ID (29-bit extended frame)
pub const MAX_CAN_ID: u32 = 0x1FFF_FFFF;

/// Payload size of a classic CAN frame, in bits
pub const FRAME_BITS: u32 = 64;

/// Short device keys (first path segment) and their display names
const DEVICE_NAMES: &[(&str, &str)] = &[
    ("ams", "Accumulator Management System"),
    ("pdu", "Power Distribution Unit"),
    ("pcm", "Powertrain Control Module"),
    ("moc", "Motor Controller"),
    ("ludwig", "Ludwig"),
    ("playground", "Playground"),
    ("playgroundrpi", "Playground Rpi"),
];

/// Byte order for raw-value assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ByteOrder {
    /// Bytes read low-to-high (Intel format)
    #[serde(rename = "little")]
    LittleEndian,
    /// Byte run reversed before extraction (Motorola format)
    #[serde(rename = "big")]
    BigEndian,
}

impl From<Endianness> for ByteOrder {
    fn from(value: Endianness) -> Self {
        match value {
            Endianness::Little => ByteOrder::LittleEndian,
            Endianness::Big => ByteOrder::BigEndian,
        }
    }
}

/// How a signal's raw value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Numeric,
    Boolean,
    Enum,
    String,
}

impl SignalType {
    /// Classify a type tag from the definition file
    pub fn from_tag(tag: &str, has_enum_values: bool) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.as_str() {
            "bool" | "boolean" => SignalType::Boolean,
            "string" | "str" | "char*" => SignalType::String,
            "enum" => SignalType::Enum,
            _ if has_enum_values => SignalType::Enum,
            _ => SignalType::Numeric,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Numeric => "numeric",
            SignalType::Boolean => "boolean",
            SignalType::Enum => "enum",
            SignalType::String => "string",
        }
    }
}

/// Location of a signal inside the 8-byte payload
///
/// Can only be built through [`BitLayout::new`], which rejects layouts that
/// fall outside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitLayout {
    byte_offset: u16,
    bit_offset: u16,
    bit_length: u16,
}

impl BitLayout {
    pub fn new(
        path: &str,
        byte_offset: u16,
        bit_offset: u16,
        bit_length: u16,
    ) -> Result<Self, CatalogBuildError> {
        if bit_length == 0 {
            return Err(CatalogBuildError::ZeroLengthSignal {
                path: path.to_string(),
            });
        }

        let end = u32::from(byte_offset) * 8 + u32::from(bit_offset) + u32::from(bit_length);
        if end > FRAME_BITS {
            return Err(CatalogBuildError::SignalOutOfFrame {
                path: path.to_string(),
                byte_offset,
                bit_offset,
                bit_length,
            });
        }

        Ok(Self {
            byte_offset,
            bit_offset,
            bit_length,
        })
    }

    pub fn byte_offset(&self) -> u16 {
        self.byte_offset
    }

    pub fn bit_offset(&self) -> u16 {
        self.bit_offset
    }

    pub fn bit_length(&self) -> u16 {
        self.bit_length
    }

    /// Absolute start bit (bit 0 = LSB of byte 0)
    pub fn start_bit(&self) -> usize {
        usize::from(self.byte_offset) * 8 + usize::from(self.bit_offset)
    }

    /// Index of the first payload byte the signal touches
    pub fn first_byte(&self) -> usize {
        self.start_bit() / 8
    }

    /// Number of bytes spanned, starting at [`first_byte`](Self::first_byte)
    pub fn span_bytes(&self) -> usize {
        (self.start_bit() % 8 + usize::from(self.bit_length)).div_ceil(8)
    }

    /// Minimum payload length needed to decode the signal
    pub fn required_bytes(&self) -> usize {
        self.first_byte() + self.span_bytes()
    }
}

/// A validated CAN signal definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDefinition {
    /// Unique dot-separated path
    pub path: String,
    pub name: String,
    pub identifier: String,
    pub device: String,
    pub device_id: u32,
    pub description: String,
    pub units: String,
    /// Type tag as written in the definitions
    #[serde(rename = "type")]
    pub type_tag: String,
    pub signal_type: SignalType,
    pub can_id: u32,
    pub layout: BitLayout,
    pub signed: bool,
    pub scale: f64,
    pub offset: f64,
    pub byte_order: ByteOrder,
    pub frequency: String,
    pub enum_values: String,
    pub default_value: String,
    pub array_dimensions: String,
    /// Path segments between the device key and the identifier
    pub parent_struct: String,
}

impl SignalDefinition {
    /// Validate a raw record and fill in derived fields
    pub fn from_record(record: RawSignalRecord) -> Result<Self, CatalogBuildError> {
        let path = record.path.trim().to_string();

        if record.can_id > MAX_CAN_ID {
            return Err(CatalogBuildError::InvalidCanId {
                path,
                can_id: record.can_id,
            });
        }

        let layout = BitLayout::new(
            &path,
            record.byte_offset,
            record.bit_offset,
            record.bit_length,
        )?;

        if !record.scale.is_finite() || !record.offset.is_finite() {
            return Err(CatalogBuildError::NonFiniteScaling { path });
        }

        let segments: Vec<&str> = path.split('.').collect();
        let device_key = segments.first().copied().unwrap_or_default();
        let leaf = segments.last().copied().unwrap_or_default();

        let identifier = if record.identifier.is_empty() {
            strip_array_index(leaf).to_string()
        } else {
            record.identifier
        };

        let device = if record.device.is_empty() {
            device_display_name(device_key)
        } else {
            record.device
        };

        let parent_struct = if segments.len() > 2 {
            segments[1..segments.len() - 1].join(".")
        } else {
            String::new()
        };

        let signal_type = SignalType::from_tag(&record.type_tag, !record.enum_values.is_empty());

        Ok(Self {
            path,
            name: record.name,
            identifier,
            device,
            device_id: record.device_id,
            description: record.description,
            units: record.units,
            type_tag: record.type_tag,
            signal_type,
            can_id: record.can_id,
            layout,
            signed: record.signed,
            scale: record.scale,
            offset: record.offset,
            byte_order: record.endianness.into(),
            frequency: record.frequency,
            enum_values: record.enum_values,
            default_value: record.default,
            array_dimensions: record.array_dimensions,
            parent_struct,
        })
    }

    /// First path segment, e.g. `pdu` for `pdu.sensors.batCurrent`
    pub fn device_key(&self) -> &str {
        self.path.split('.').next().unwrap_or_default()
    }

    /// Type label for display: the original tag, or the classified type
    pub fn type_label(&self) -> &str {
        if self.type_tag.is_empty() {
            self.signal_type.as_str()
        } else {
            &self.type_tag
        }
    }

    /// `raw * scale + offset`
    pub fn raw_to_physical(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }

    /// Multi-line, human-readable summary
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.name, self.path);
        let _ = writeln!(out, "  CAN ID: 0x{:X}", self.can_id);
        let _ = writeln!(out, "  Device: {} (ID: {})", self.device, self.device_id);
        let _ = write!(out, "  Type: {}", self.type_label());
        if !self.units.is_empty() {
            let _ = write!(out, " ({})", self.units);
        }
        out.push('\n');
        if !self.description.is_empty() {
            let _ = writeln!(out, "  Description: {}", self.description);
        }
        if !self.enum_values.is_empty() {
            let _ = writeln!(out, "  Values: {}", self.enum_values);
        }
        if !self.frequency.is_empty() {
            let _ = writeln!(out, "  CAN Frequency: {}", self.frequency);
        }
        out
    }
}

fn strip_array_index(segment: &str) -> &str {
    segment.split('[').next().unwrap_or(segment)
}

fn device_display_name(key: &str) -> String {
    DEVICE_NAMES
        .iter()
        .find(|(short, _)| *short == key)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| key.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_rejects_overflowing_signal() {
        let err = BitLayout::new("x.y", 7, 4, 8).unwrap_err();
        assert!(matches!(err, CatalogBuildError::SignalOutOfFrame { .. }));

        assert!(BitLayout::new("x.y", 0, 0, 64).is_ok());
        assert!(BitLayout::new("x.y", 7, 0, 8).is_ok());
    }

    #[test]
    fn test_layout_rejects_zero_length() {
        let err = BitLayout::new("x.y", 0, 0, 0).unwrap_err();
        assert!(matches!(err, CatalogBuildError::ZeroLengthSignal { .. }));
    }

    #[test]
    fn test_layout_byte_span() {
        let layout = BitLayout::new("x.y", 1, 4, 8).unwrap();
        assert_eq!(layout.start_bit(), 12);
        assert_eq!(layout.first_byte(), 1);
        assert_eq!(layout.span_bytes(), 2);
        assert_eq!(layout.required_bytes(), 3);

        // bit offsets past a byte boundary roll into the next byte
        let layout = BitLayout::new("x.y", 0, 9, 3).unwrap();
        assert_eq!(layout.first_byte(), 1);
        assert_eq!(layout.span_bytes(), 1);
    }

    #[test]
    fn test_derived_fields() {
        let record = RawSignalRecord::new("ams.cells.cellV[3]", 0x300, 0, 16);
        let signal = SignalDefinition::from_record(record).unwrap();

        assert_eq!(signal.identifier, "cellV");
        assert_eq!(signal.device, "Accumulator Management System");
        assert_eq!(signal.device_key(), "ams");
        assert_eq!(signal.parent_struct, "cells");
        assert_eq!(signal.signal_type, SignalType::Numeric);
    }

    #[test]
    fn test_unknown_device_key_is_uppercased() {
        let record = RawSignalRecord::new("dash.led", 0x10, 0, 1);
        let signal = SignalDefinition::from_record(record).unwrap();
        assert_eq!(signal.device, "DASH");
        assert!(signal.parent_struct.is_empty());
    }

    #[test]
    fn test_invalid_can_id() {
        let record = RawSignalRecord::new("pdu.x", 0x2000_0000, 0, 8);
        let err = SignalDefinition::from_record(record).unwrap_err();
        assert!(matches!(err, CatalogBuildError::InvalidCanId { .. }));
    }

    #[test]
    fn test_non_finite_scale() {
        let record = RawSignalRecord::new("pdu.x", 0x10, 0, 8).with_scaling(f64::NAN, 0.0);
        let err = SignalDefinition::from_record(record).unwrap_err();
        assert!(matches!(err, CatalogBuildError::NonFiniteScaling { .. }));
    }

    #[test]
    fn test_type_classification() {
        assert_eq!(SignalType::from_tag("bool", false), SignalType::Boolean);
        assert_eq!(SignalType::from_tag("uint8_t", true), SignalType::Enum);
        assert_eq!(SignalType::from_tag("float", false), SignalType::Numeric);
        assert_eq!(SignalType::from_tag("String", false), SignalType::String);
    }

    #[test]
    fn test_describe_includes_metadata() {
        let record = RawSignalRecord::new("pdu.sensors.batCurrent", 0x607, 0, 16)
            .with_name("Battery Current")
            .with_units("A")
            .with_type("float")
            .with_description("Battery pack current")
            .with_frequency("100Hz");
        let signal = SignalDefinition::from_record(record).unwrap();
        let text = signal.describe();

        assert!(text.starts_with("Battery Current (pdu.sensors.batCurrent)"));
        assert!(text.contains("CAN ID: 0x607"));
        assert!(text.contains("Type: float (A)"));
        assert!(text.contains("CAN Frequency: 100Hz"));
        assert!(!text.contains("Values:"));
    }
}
