//! Raw signal records
//!
//! The flat record shape produced by the external definition-file parser.
//! Records are untrusted input: nothing here is validated until the catalog
//! converts them into [`SignalDefinition`](super::SignalDefinition)s.

use serde::{Deserialize, Serialize};

/// One signal as handed over by the definition-file parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignalRecord {
    /// Dot-separated access path, e.g. `pdu.sensors.batCurrent`
    pub path: String,
    #[serde(default)]
    pub name: String,
    /// Leaf identifier; derived from the path when empty
    #[serde(default)]
    pub identifier: String,
    /// Device display name; derived from the path when empty
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub device_id: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub units: String,
    /// Type tag as written in the definitions (`float`, `uint16_t`, `bool`, ...)
    #[serde(default, rename = "type")]
    pub type_tag: String,
    pub can_id: u32,
    #[serde(default)]
    pub byte_offset: u16,
    #[serde(default)]
    pub bit_offset: u16,
    pub bit_length: u16,
    #[serde(default)]
    pub signed: bool,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub endianness: Endianness,
    /// Transmission rate, informational only
    #[serde(default)]
    pub frequency: String,
    /// Enumerator listing (`0=Off, 1=On`), empty for non-enum signals
    #[serde(default)]
    pub enum_values: String,
    #[serde(default)]
    pub default: String,
    #[serde(default)]
    pub array_dimensions: String,
}

fn default_scale() -> f64 {
    1.0
}

/// Byte order as spelled in raw records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    #[serde(alias = "intel")]
    Little,
    #[serde(alias = "motorola")]
    Big,
}

impl RawSignalRecord {
    /// Minimal record with the decode-relevant fields set and defaults elsewhere
    pub fn new(path: impl Into<String>, can_id: u32, byte_offset: u16, bit_length: u16) -> Self {
        Self {
            path: path.into(),
            name: String::new(),
            identifier: String::new(),
            device: String::new(),
            device_id: 0,
            description: String::new(),
            units: String::new(),
            type_tag: String::new(),
            can_id,
            byte_offset,
            bit_offset: 0,
            bit_length,
            signed: false,
            scale: 1.0,
            offset: 0.0,
            endianness: Endianness::Little,
            frequency: String::new(),
            enum_values: String::new(),
            default: String::new(),
            array_dimensions: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_type(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = type_tag.into();
        self
    }

    pub fn with_device(mut self, device: impl Into<String>, device_id: u32) -> Self {
        self.device = device.into();
        self.device_id = device_id;
        self
    }

    pub fn with_bit_offset(mut self, bit_offset: u16) -> Self {
        self.bit_offset = bit_offset;
        self
    }

    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    pub fn with_scaling(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = frequency.into();
        self
    }

    pub fn with_enum_values(mut self, enum_values: impl Into<String>) -> Self {
        self.enum_values = enum_values.into();
        self
    }
}
