//! Dose-Rate Severity Classification
//!
//! ## Overview
//!
//! Every filtered dose value maps to one of four ordered severity bands.
//! The band table is ordinary data - an ordered list of half-open
//! `[min, max)` intervals with a display symbol and a color token - so an
//! operator can retune the boundaries from persisted configuration without
//! touching code.
//!
//! Default bands (μSv/h):
//!
//! | level    | interval      | symbol | color  |
//! |----------|---------------|--------|--------|
//! | normal   | [0.00, 0.10)  | 🟢     | green  |
//! | elevated | [0.10, 0.25)  | 🟡     | yellow |
//! | warning  | [0.25, 1.00)  | 🟠     | orange |
//! | danger   | [1.00, ∞)     | 🔴     | red    |
//!
//! Classification walks the table in order and returns the first band whose
//! interval contains the value. A value no band claims - negative readings,
//! or a hole in a misconfigured table - classifies as **danger**. Failing
//! toward over-alarming is intentional: a dosimeter that under-reports a
//! gap in its own configuration is worse than one that cries wolf. For the
//! same reason the table is *not* validated for contiguity; a gappy table
//! is only logged at warn level and the fallback absorbs it.

use serde::{Deserialize, Serialize};

/// Ordered severity scale, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Background-level dose rate
    Normal,
    /// Above background, below concern
    Elevated,
    /// Approaching the alarm region
    Warning,
    /// Alarm-level dose rate; also the fallback for unclassifiable values
    Danger,
}

impl Severity {
    /// Human-readable band name.
    pub const fn name(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Elevated => "elevated",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

/// One classification band: a half-open dose interval plus display hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseBand {
    /// Severity this band maps to
    pub level: Severity,
    /// Inclusive lower bound, μSv/h
    pub min: f32,
    /// Exclusive upper bound, μSv/h; `None` means unbounded
    pub max: Option<f32>,
    /// Indicator symbol for status displays
    pub symbol: String,
    /// Color token for the UI layer
    pub color: String,
}

impl DoseBand {
    /// Whether `dose` falls inside this band's `[min, max)` interval.
    pub fn contains(&self, dose: f32) -> bool {
        dose >= self.min && self.max.map_or(true, |max| dose < max)
    }
}

/// Result of classifying one dose value.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Severity band the value landed in
    pub level: Severity,
    /// Indicator symbol of that band
    pub symbol: String,
    /// Color token of that band
    pub color: String,
}

/// The ordered band table.
///
/// Reloadable from configuration; see the module docs for why gaps are
/// tolerated rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DoseBand>", into = "Vec<DoseBand>")]
pub struct DoseLevels {
    bands: Vec<DoseBand>,
}

impl DoseLevels {
    /// Builds a table from ordered bands, logging a warning when consecutive
    /// bands do not line up edge to edge.
    pub fn new(bands: Vec<DoseBand>) -> Self {
        for pair in bands.windows(2) {
            match pair[0].max {
                Some(max) if (max - pair[1].min).abs() > f32::EPSILON => {
                    log::warn!(
                        "dose bands '{}' and '{}' are not contiguous ({} vs {}); \
                         values in the gap will classify as danger",
                        pair[0].level.name(),
                        pair[1].level.name(),
                        max,
                        pair[1].min,
                    );
                }
                None => {
                    log::warn!(
                        "dose band '{}' is unbounded but not last; later bands are unreachable",
                        pair[0].level.name(),
                    );
                }
                _ => {}
            }
        }
        Self { bands }
    }

    /// Maps a dose value to its band, falling back to danger.
    pub fn classify(&self, dose: f32) -> Classification {
        for band in &self.bands {
            if band.contains(dose) {
                return Classification {
                    level: band.level,
                    symbol: band.symbol.clone(),
                    color: band.color.clone(),
                };
            }
        }

        // No band claimed the value: conservative fallback
        Classification {
            level: Severity::Danger,
            symbol: "🔴".to_string(),
            color: "red".to_string(),
        }
    }

    /// Color token for a dose value.
    pub fn color_for(&self, dose: f32) -> String {
        self.classify(dose).color
    }

    /// The ordered bands.
    pub fn bands(&self) -> &[DoseBand] {
        &self.bands
    }
}

impl Default for DoseLevels {
    fn default() -> Self {
        fn band(level: Severity, min: f32, max: Option<f32>, symbol: &str, color: &str) -> DoseBand {
            DoseBand {
                level,
                min,
                max,
                symbol: symbol.to_string(),
                color: color.to_string(),
            }
        }

        Self::new(vec![
            band(Severity::Normal, 0.0, Some(0.10), "🟢", "green"),
            band(Severity::Elevated, 0.10, Some(0.25), "🟡", "yellow"),
            band(Severity::Warning, 0.25, Some(1.0), "🟠", "orange"),
            band(Severity::Danger, 1.0, None, "🔴", "red"),
        ])
    }
}

impl From<Vec<DoseBand>> for DoseLevels {
    fn from(bands: Vec<DoseBand>) -> Self {
        Self::new(bands)
    }
}

impl From<DoseLevels> for Vec<DoseBand> {
    fn from(levels: DoseLevels) -> Self {
        levels.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_band_boundaries() {
        let levels = DoseLevels::default();

        assert_eq!(levels.classify(0.0).level, Severity::Normal);
        assert_eq!(levels.classify(0.08).level, Severity::Normal);
        assert_eq!(levels.classify(0.099).level, Severity::Normal);
        assert_eq!(levels.classify(0.10).level, Severity::Elevated);
        assert_eq!(levels.classify(0.25).level, Severity::Warning);
        assert_eq!(levels.classify(0.999).level, Severity::Warning);
        assert_eq!(levels.classify(1.0).level, Severity::Danger);
        assert_eq!(levels.classify(1500.0).level, Severity::Danger);
    }

    #[test]
    fn classification_carries_display_hints() {
        let levels = DoseLevels::default();
        let c = levels.classify(0.15);

        assert_eq!(c.level.name(), "elevated");
        assert_eq!(c.symbol, "🟡");
        assert_eq!(c.color, "yellow");
        assert_eq!(levels.color_for(0.15), "yellow");
    }

    #[test]
    fn negative_falls_back_to_danger() {
        let levels = DoseLevels::default();
        assert_eq!(levels.classify(-0.01).level, Severity::Danger);
    }

    #[test]
    fn table_gap_absorbed_by_fallback() {
        let levels = DoseLevels::new(vec![
            DoseBand {
                level: Severity::Normal,
                min: 0.0,
                max: Some(0.10),
                symbol: "🟢".into(),
                color: "green".into(),
            },
            // gap: [0.10, 0.50) is claimed by nobody
            DoseBand {
                level: Severity::Warning,
                min: 0.50,
                max: Some(1.0),
                symbol: "🟠".into(),
                color: "orange".into(),
            },
        ]);

        assert_eq!(levels.classify(0.05).level, Severity::Normal);
        assert_eq!(levels.classify(0.30).level, Severity::Danger);
        assert_eq!(levels.classify(0.75).level, Severity::Warning);
        assert_eq!(levels.classify(2.0).level, Severity::Danger);
    }

    #[test]
    fn serde_round_trip() {
        let levels = DoseLevels::default();
        let json = serde_json::to_string(&levels).unwrap();
        let back: DoseLevels = serde_json::from_str(&json).unwrap();

        assert_eq!(levels, back);
        // serialized as a plain ordered array of bands
        assert!(json.starts_with('['));
    }
}
