//! Output formatting
//!
//! Every command renders either a plain-text listing or a JSON document.

use crate::candump::CanFrame;
use anyhow::Result;
use can_catalog::{CatalogStats, DeviceSummary, FrameDecode, SearchHit, SignalDefinition};
use serde::Serialize;
use std::fmt::Write;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn search_hits(query: &str, hits: &[SearchHit], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(hits);
    }

    let mut out = String::new();
    if hits.is_empty() {
        writeln!(out, "No signals matched '{}'", query)?;
        return Ok(out);
    }

    writeln!(out, "Found {} signals matching '{}':\n", hits.len(), query)?;
    for (rank, hit) in hits.iter().enumerate() {
        writeln!(out, "{}. {} [{:.1}]", rank + 1, hit.path, hit.score)?;
        writeln!(out, "   {} | {} | CAN ID 0x{:X}", hit.name, hit.device, hit.can_id)?;
        if !hit.description.is_empty() {
            writeln!(out, "   {}", hit.description)?;
        }
    }
    Ok(out)
}

pub fn signal(signal: &SignalDefinition, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(signal),
        OutputFormat::Text => Ok(signal.describe()),
    }
}

pub fn device_signals(
    device: &str,
    signals: &[&SignalDefinition],
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(signals);
    }

    let mut out = String::new();
    if signals.is_empty() {
        writeln!(out, "No signals found for device '{}'", device)?;
        return Ok(out);
    }

    writeln!(out, "{} signals for device '{}':", signals.len(), device)?;
    for signal in signals {
        writeln!(out, "  {:<48} 0x{:<8X} {}", signal.path, signal.can_id, signal.units)?;
    }
    Ok(out)
}

#[derive(Serialize)]
struct DeviceListing<'a> {
    stats: CatalogStats,
    devices: &'a [DeviceSummary],
}

pub fn devices(stats: CatalogStats, devices: &[DeviceSummary], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&DeviceListing { stats, devices });
    }

    let mut out = String::new();
    writeln!(
        out,
        "Signal catalog: {} signals, {} frames, {} devices\n",
        stats.num_signals, stats.num_frames, stats.num_devices
    )?;
    for device in devices {
        writeln!(
            out,
            "  {:<40} (ID: {:>3}) {:>5} signals",
            device.name, device.device_id, device.count
        )?;
    }
    Ok(out)
}

/// JSON shape of one decoded frame
#[derive(Serialize)]
pub struct DecodedFrame<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<&'a str>,
    #[serde(flatten)]
    pub decode: &'a FrameDecode,
}

impl<'a> DecodedFrame<'a> {
    pub fn new(frame: &'a CanFrame, decode: &'a FrameDecode) -> Self {
        Self {
            timestamp: frame.timestamp.map(|t| t.to_rfc3339()),
            interface: frame.interface.as_deref(),
            decode,
        }
    }
}

/// Text rendering of one decoded frame
pub fn frame_text(frame: &CanFrame, decode: &FrameDecode) -> Result<String> {
    let mut out = String::new();

    match (&frame.timestamp, &frame.interface) {
        (Some(t), Some(iface)) => write!(out, "{} {} ", t.format("%H:%M:%S%.6f"), iface)?,
        (Some(t), None) => write!(out, "{} ", t.format("%H:%M:%S%.6f"))?,
        (None, Some(iface)) => write!(out, "{} ", iface)?,
        (None, None) => {}
    }
    writeln!(out, "0x{:X} [{}]", decode.can_id, frame.data.len())?;

    if decode.values.is_empty() && decode.warnings.is_empty() {
        writeln!(out, "  (no signals defined for this frame)")?;
    }
    for value in decode.values.values() {
        write!(out, "  {} = {}", value.path, value.physical)?;
        if !value.units.is_empty() {
            write!(out, " {}", value.units)?;
        }
        if value.overflow {
            write!(out, " (overflow)")?;
        }
        writeln!(out, "  raw={}", value.raw)?;
    }
    for warning in &decode.warnings {
        writeln!(out, "  warning: {}", warning)?;
    }
    Ok(out)
}

pub fn frames(decoded: &[(CanFrame, FrameDecode)], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let rows: Vec<DecodedFrame<'_>> = decoded
            .iter()
            .map(|(frame, decode)| DecodedFrame::new(frame, decode))
            .collect();
        return to_json(&rows);
    }

    let mut out = String::new();
    for (frame, decode) in decoded {
        out.push_str(&frame_text(frame, decode)?);
    }
    Ok(out)
}
