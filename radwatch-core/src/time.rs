//! Time sources and device timestamp resolution
//!
//! Two concerns live here:
//! - a clock abstraction so the pipeline can run against the system clock in
//!   production and a fixed clock in tests;
//! - the resolver that turns device-reported date/time text into an absolute
//!   timestamp, tolerating the several formats seen in the field.

use chrono::NaiveDateTime;

/// Timestamp in milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Source of the current time.
pub trait TimeSource {
    /// Current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// System wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Fixed time source for testing.
///
/// Clones share the same underlying instant, so a test can keep a handle to
/// the clock after boxing one into a pipeline and advance it from outside.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    timestamp: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

impl FixedClock {
    /// Creates a clock pinned at `timestamp`.
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: std::sync::Arc::new(std::sync::atomic::AtomicU64::new(timestamp)),
        }
    }

    /// Moves the clock to an absolute instant.
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp
            .store(timestamp, std::sync::atomic::Ordering::Relaxed);
    }

    /// Advances the clock by `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        self.timestamp
            .fetch_add(ms, std::sync::atomic::Ordering::Relaxed);
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// Date/time formats the device has been observed to emit, tried in order.
const DATETIME_FORMATS: [&str; 4] = [
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Resolves device date/time text to an absolute timestamp.
///
/// Candidate strings are tried against every format in [`DATETIME_FORMATS`];
/// for `dd.mm.yy` dates a 2-digit-year expansion (yy < 70 → 2000+yy,
/// yy ≥ 70 → 1900+yy) is tried *before* the raw text, so the expansion rule
/// decides rather than a lenient four-digit-year parse swallowing "24" as
/// the year 24.
///
/// When nothing parses the current wall-clock time is returned. That is a
/// best-effort policy, not an error: ingestion must never stall on a
/// malformed date, and callers tolerate the resulting inaccuracy.
pub fn resolve_datetime(date: &str, time: &str, clock: &dyn TimeSource) -> Timestamp {
    let date = date.trim();
    let time = time.trim();

    if !date.is_empty() && !time.is_empty() {
        let mut candidates: Vec<String> = Vec::with_capacity(2);
        if let Some(expanded) = expand_two_digit_year(date) {
            candidates.push(format!("{expanded} {time}"));
        }
        candidates.push(format!("{date} {time}"));

        for candidate in &candidates {
            for format in DATETIME_FORMATS {
                if let Ok(parsed) = NaiveDateTime::parse_from_str(candidate, format) {
                    return parsed.and_utc().timestamp_millis().max(0) as Timestamp;
                }
            }
        }
    }

    clock.now()
}

/// Rewrites a `dd.mm.yy` date with a four-digit year.
///
/// Years below 70 are taken as 2000s, the rest as 1900s.
fn expand_two_digit_year(date: &str) -> Option<String> {
    let parts: Vec<&str> = date.split('.').collect();
    if parts.len() != 3 || parts[2].len() != 2 {
        return None;
    }

    let yy: u32 = parts[2].parse().ok()?;
    let year = if yy < 70 { 2000 + yy } else { 1900 + yy };
    Some(format!("{}.{}.{}", parts[0], parts[1], year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn epoch_ms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
            .and_utc()
            .timestamp_millis() as Timestamp
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);
    }

    #[test]
    fn two_digit_year_expansion() {
        let clock = FixedClock::new(0);
        assert_eq!(
            resolve_datetime("01.01.24", "10:00:00", &clock),
            epoch_ms(2024, 1, 1, 10, 0, 0)
        );
        assert_eq!(
            resolve_datetime("31.12.99", "23:59:59", &clock),
            epoch_ms(1999, 12, 31, 23, 59, 59)
        );
    }

    #[test]
    fn four_digit_and_alternate_formats() {
        let clock = FixedClock::new(0);
        let expected = epoch_ms(2024, 6, 15, 12, 30, 0);

        assert_eq!(resolve_datetime("15.06.2024", "12:30:00", &clock), expected);
        assert_eq!(resolve_datetime("2024-06-15", "12:30:00", &clock), expected);
        assert_eq!(resolve_datetime("15/06/2024", "12:30:00", &clock), expected);
    }

    #[test]
    fn unparseable_falls_back_to_clock() {
        let clock = FixedClock::new(1_700_000_000_000);
        assert_eq!(
            resolve_datetime("99.99.99", "xx:yy:zz", &clock),
            1_700_000_000_000
        );
        assert_eq!(resolve_datetime("", "", &clock), 1_700_000_000_000);
        assert_eq!(resolve_datetime("01.01.24", "", &clock), 1_700_000_000_000);
    }
}
