//! candump frame parsing
//!
//! Accepts the compact `ID#HEX` form as well as full `candump -l` log lines:
//!
//! ```text
//! (1700000000.123456) can0 607#18FC102700000000
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while parsing a frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameParseError {
    #[error("missing '#' separator in '{0}'")]
    MissingSeparator(String),

    #[error("invalid CAN ID '{0}'")]
    InvalidId(String),

    #[error("invalid payload '{payload}': {source}")]
    InvalidPayload {
        payload: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("payload of {0} bytes exceeds 64")]
    PayloadTooLong(usize),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// A frame read from the command line or a log file
#[derive(Debug, Clone, PartialEq)]
pub struct CanFrame {
    pub timestamp: Option<DateTime<Utc>>,
    pub interface: Option<String>,
    pub can_id: u32,
    pub data: Vec<u8>,
}

/// Parse `ID#HEX`
///
/// The ID is hexadecimal; a leading `0x` is tolerated. `HEX` may be empty
/// and may contain `.` separators between bytes.
pub fn parse_frame(text: &str) -> Result<CanFrame, FrameParseError> {
    let text = text.trim();
    let (id, payload) = text
        .split_once('#')
        .ok_or_else(|| FrameParseError::MissingSeparator(text.to_string()))?;

    let id_digits = id.trim_start_matches("0x").trim_start_matches("0X");
    let can_id = u32::from_str_radix(id_digits, 16)
        .map_err(|_| FrameParseError::InvalidId(id.to_string()))?;

    Ok(CanFrame {
        timestamp: None,
        interface: None,
        can_id,
        data: parse_payload(payload)?,
    })
}

/// Parse one candump log line: `(secs.frac) iface ID#HEX`
///
/// Lines holding only `ID#HEX` are accepted too. Returns `Ok(None)` for blank
/// lines and `#` comments.
pub fn parse_log_line(line: &str) -> Result<Option<CanFrame>, FrameParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let frame = match fields.as_slice() {
        [frame] => parse_frame(frame)?,
        [stamp, iface, frame, ..] => {
            let mut parsed = parse_frame(frame)?;
            parsed.timestamp = Some(parse_timestamp(stamp)?);
            parsed.interface = Some(iface.to_string());
            parsed
        }
        [first, frame] => {
            let mut parsed = parse_frame(frame)?;
            if first.starts_with('(') {
                parsed.timestamp = Some(parse_timestamp(first)?);
            } else {
                parsed.interface = Some(first.to_string());
            }
            parsed
        }
        [] => return Ok(None),
    };

    Ok(Some(frame))
}

fn parse_payload(payload: &str) -> Result<Vec<u8>, FrameParseError> {
    let digits: String = payload.chars().filter(|c| *c != '.').collect();
    let data = hex::decode(&digits).map_err(|source| FrameParseError::InvalidPayload {
        payload: payload.to_string(),
        source,
    })?;

    if data.len() > 64 {
        return Err(FrameParseError::PayloadTooLong(data.len()));
    }
    Ok(data)
}

fn parse_timestamp(field: &str) -> Result<DateTime<Utc>, FrameParseError> {
    let invalid = || FrameParseError::InvalidTimestamp(field.to_string());

    let inner = field
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(invalid)?;
    let (secs, frac) = inner.split_once('.').unwrap_or((inner, "0"));

    let secs: i64 = secs.parse().map_err(|_| invalid())?;
    if frac.is_empty() || frac.len() > 9 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    // Right-pad the fraction to nanoseconds
    let nanos: u32 = format!("{:0<9}", frac).parse().map_err(|_| invalid())?;

    DateTime::from_timestamp(secs, nanos).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_compact_frame() {
        let frame = parse_frame("607#18FC1027").unwrap();
        assert_eq!(frame.can_id, 0x607);
        assert_eq!(frame.data, vec![0x18, 0xFC, 0x10, 0x27]);
        assert!(frame.timestamp.is_none());

        let frame = parse_frame("0x1ABCDEF0#01.02").unwrap();
        assert_eq!(frame.can_id, 0x1ABC_DEF0);
        assert_eq!(frame.data, vec![0x01, 0x02]);

        let frame = parse_frame("123#").unwrap();
        assert!(frame.data.is_empty());
    }

    #[test]
    fn test_parse_frame_errors() {
        assert_eq!(
            parse_frame("607"),
            Err(FrameParseError::MissingSeparator("607".to_string()))
        );
        assert_eq!(
            parse_frame("XYZ#00"),
            Err(FrameParseError::InvalidId("XYZ".to_string()))
        );
        assert_eq!(
            parse_frame("607#ABC"),
            Err(FrameParseError::InvalidPayload {
                payload: "ABC".to_string(),
                source: hex::FromHexError::OddLength,
            })
        );
        assert_eq!(
            parse_frame("607#0G"),
            Err(FrameParseError::InvalidPayload {
                payload: "0G".to_string(),
                source: hex::FromHexError::InvalidHexCharacter { c: 'G', index: 1 },
            })
        );
    }

    #[test]
    fn test_payload_separators_and_length_cap() {
        let frame = parse_frame("300#de.ad.BE.ef").unwrap();
        assert_eq!(frame.data, vec![0xDE, 0xAD, 0xBE, 0xEF]);

        let max = format!("300#{}", "00".repeat(64));
        assert_eq!(parse_frame(&max).unwrap().data.len(), 64);

        let over = format!("300#{}", "00".repeat(65));
        assert_eq!(parse_frame(&over), Err(FrameParseError::PayloadTooLong(65)));
    }

    #[test]
    fn test_parse_log_line() {
        let frame = parse_log_line("(1700000000.250000) can0 300#C8F6")
            .unwrap()
            .unwrap();
        assert_eq!(frame.can_id, 0x300);
        assert_eq!(frame.interface.as_deref(), Some("can0"));

        let stamp = frame.timestamp.unwrap();
        assert_eq!(stamp.timestamp(), 1_700_000_000);
        assert_eq!(stamp.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_log_line_variants() {
        assert_eq!(parse_log_line("").unwrap(), None);
        assert_eq!(parse_log_line("# recorded on bench").unwrap(), None);

        let frame = parse_log_line("300#C8").unwrap().unwrap();
        assert_eq!(frame.data, vec![0xC8]);

        let frame = parse_log_line("vcan0 300#C8").unwrap().unwrap();
        assert_eq!(frame.interface.as_deref(), Some("vcan0"));
        assert!(frame.timestamp.is_none());

        assert!(matches!(
            parse_log_line("(abc) can0 300#C8"),
            Err(FrameParseError::InvalidTimestamp(_))
        ));
    }
}
