//! Telemetry Record Parsing
//!
//! ## Overview
//!
//! The device emits one pipe-delimited text line per sample:
//!
//! ```text
//! date|time|latitude|longitude|altitude|satellites|hdop|accuracy|dose|avg_dose[|...]
//! 01.01.24|10:00:00|52.229700|21.012200|120|8|1.2|5.0|0.08|0.08
//! ```
//!
//! [`TelemetryRecord::parse`] validates only the field *count* (at least
//! [`MIN_FIELDS`]); everything else is stored as the device sent it. Numeric
//! interpretation happens lazily through fail-soft accessors, so a record
//! with a garbled dose field still enters the history (as 0.0) instead of
//! killing the stream. Lines with extra trailing fields parse fine - newer
//! firmware appends diagnostics the pipeline ignores.
//!
//! A record is immutable once constructed. The resolved timestamp is
//! attached at parse time (see [`crate::time::resolve_datetime`]) so every
//! downstream consumer sees the same instant.

use serde::Serialize;

use crate::errors::ParseError;
use crate::time::{resolve_datetime, TimeSource, Timestamp};

/// Minimum number of `|`-separated fields a line must carry.
pub const MIN_FIELDS: usize = 10;

/// One parsed telemetry sample, fields kept in device-native text form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    /// Device-reported date text (e.g. "01.01.24")
    pub date: String,
    /// Device-reported time text (e.g. "10:00:00")
    pub time: String,
    /// Latitude in decimal-degree text
    pub latitude: String,
    /// Longitude in decimal-degree text
    pub longitude: String,
    /// Altitude text, device units
    pub altitude: String,
    /// Visible satellite count text
    pub satellites: String,
    /// Horizontal dilution of precision text
    pub hdop: String,
    /// Fix accuracy text, device units
    pub accuracy: String,
    /// Instantaneous dose text, μSv/h
    pub current_dose: String,
    /// Device-side averaged dose text, μSv/h
    pub average_dose: String,
    /// Resolved absolute timestamp, ms since epoch
    pub timestamp: Timestamp,
}

impl TelemetryRecord {
    /// Parses a raw line into a record, resolving the timestamp as it goes.
    ///
    /// Returns [`ParseError::TooFewFields`] when the line splits into fewer
    /// than [`MIN_FIELDS`] fields; the caller must not mutate any pipeline
    /// state in that case. Extra trailing fields are ignored.
    pub fn parse(line: &str, clock: &dyn TimeSource) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < MIN_FIELDS {
            return Err(ParseError::TooFewFields {
                got: fields.len(),
                min: MIN_FIELDS,
            });
        }

        let date = fields[0].trim().to_string();
        let time = fields[1].trim().to_string();
        let timestamp = resolve_datetime(&date, &time, clock);

        Ok(Self {
            date,
            time,
            latitude: fields[2].trim().to_string(),
            longitude: fields[3].trim().to_string(),
            altitude: fields[4].trim().to_string(),
            satellites: fields[5].trim().to_string(),
            hdop: fields[6].trim().to_string(),
            accuracy: fields[7].trim().to_string(),
            current_dose: fields[8].trim().to_string(),
            average_dose: fields[9].trim().to_string(),
            timestamp,
        })
    }

    /// Instantaneous dose in μSv/h; malformed text reads as 0.0.
    pub fn dose(&self) -> f32 {
        safe_f32(&self.current_dose, 0.0)
    }

    /// Device-side averaged dose in μSv/h; malformed text reads as 0.0.
    pub fn device_average(&self) -> f32 {
        safe_f32(&self.average_dose, 0.0)
    }

    /// GPS position, or `None` when the device reports the 0,0 placeholder
    /// it emits before acquiring a fix.
    pub fn position(&self) -> Option<(f64, f64)> {
        let lat: f64 = self.latitude.trim().parse().unwrap_or(0.0);
        let lon: f64 = self.longitude.trim().parse().unwrap_or(0.0);
        if lat == 0.0 && lon == 0.0 {
            None
        } else {
            Some((lat, lon))
        }
    }

    /// Visible satellite count; malformed text reads as 0.
    pub fn satellite_count(&self) -> u32 {
        self.satellites.trim().parse().unwrap_or(0)
    }
}

/// Fail-soft float conversion: malformed text degrades to `default`.
pub fn safe_f32(text: &str, default: f32) -> f32 {
    text.trim().parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    const LINE: &str = "01.01.24|10:00:00|52.229700|21.012200|120|8|1.2|5.0|0.08|0.08";

    #[test]
    fn parses_full_line() {
        let clock = FixedClock::new(0);
        let record = TelemetryRecord::parse(LINE, &clock).unwrap();

        assert_eq!(record.date, "01.01.24");
        assert_eq!(record.time, "10:00:00");
        assert_eq!(record.latitude, "52.229700");
        assert_eq!(record.satellites, "8");
        assert_eq!(record.dose(), 0.08);
        assert_eq!(record.device_average(), 0.08);
        assert_eq!(record.satellite_count(), 8);
        // 2024-01-01 10:00:00 UTC
        assert_eq!(record.timestamp, 1_704_103_200_000);
    }

    #[test]
    fn rejects_short_line() {
        let clock = FixedClock::new(0);
        let short = "01.01.24|10:00:00|52.2297|21.0122|120|8|1.2|5.0";
        assert_eq!(
            TelemetryRecord::parse(short, &clock),
            Err(ParseError::TooFewFields { got: 8, min: MIN_FIELDS })
        );
    }

    #[test]
    fn ignores_extra_fields() {
        let clock = FixedClock::new(0);
        let extended = format!("{LINE}|battery=97|fw=2.9");
        let record = TelemetryRecord::parse(&extended, &clock).unwrap();
        assert_eq!(record.average_dose, "0.08");
    }

    #[test]
    fn malformed_numerics_default() {
        let clock = FixedClock::new(0);
        let garbled = "01.01.24|10:00:00|52.2297|21.0122|120|8|1.2|5.0|N/A|--";
        let record = TelemetryRecord::parse(garbled, &clock).unwrap();

        assert_eq!(record.dose(), 0.0);
        assert_eq!(record.device_average(), 0.0);
    }

    #[test]
    fn zero_position_is_no_fix() {
        let clock = FixedClock::new(0);
        let no_fix = "01.01.24|10:00:00|0.000000|0.000000|0|0|0|0|0.05|0.05";
        let record = TelemetryRecord::parse(no_fix, &clock).unwrap();

        assert_eq!(record.position(), None);

        let with_fix = TelemetryRecord::parse(LINE, &clock).unwrap();
        assert_eq!(with_fix.position(), Some((52.2297, 21.0122)));
    }
}
