//! Pipeline Configuration
//!
//! All tunables of the pipeline live in one serde-backed struct:
//! filter windows, alarm threshold, history depth, redraw interval, and the
//! severity band table. The defaults reproduce the deployed device profile
//! (4 h of history at one sample per 15 s, 5-sample smoothing, 16-sample
//! short-term window, 1.0 μSv/h alarm threshold).
//!
//! Configuration persists as JSON next to the application's other state.
//! Loading a missing file yields the defaults - first launch needs no
//! setup step - while a present-but-invalid file is an error the caller
//! must surface rather than silently masking an operator's edits.
//!
//! Every field is covered by `#[serde(default)]`, so a config written by an
//! older build (or trimmed by hand) fills the gaps with defaults instead of
//! failing to load.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::levels::DoseLevels;

/// Tunable parameters of the dose pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Alarm threshold in μSv/h; filtered doses strictly above it alarm
    pub alarm_threshold: f32,
    /// Moving-average window W, in samples
    pub moving_avg_window: usize,
    /// Short-term average window S, in samples
    pub short_term_window: usize,
    /// Plotted history depth, hours
    pub history_hours: u32,
    /// Expected seconds between samples
    pub update_interval_secs: u32,
    /// Minimum milliseconds between expensive redraws
    pub plot_min_interval_ms: u64,
    /// Ordered severity band table
    pub levels: DoseLevels,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alarm_threshold: 1.0,
            moving_avg_window: 5,
            short_term_window: 16,
            history_hours: 4,
            update_interval_secs: 15,
            plot_min_interval_ms: 3000,
            levels: DoseLevels::default(),
        }
    }
}

impl PipelineConfig {
    /// History buffer capacity N derived from depth and sample cadence:
    /// `max(1, history_hours × 3600 / update_interval_secs)`.
    pub fn max_data_points(&self) -> usize {
        let interval = self.update_interval_secs.max(1) as usize;
        ((self.history_hours as usize * 3600) / interval).max(1)
    }

    /// Loads configuration from a JSON file; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Saves configuration as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::Severity;

    #[test]
    fn default_profile() {
        let config = PipelineConfig::default();

        assert_eq!(config.alarm_threshold, 1.0);
        assert_eq!(config.moving_avg_window, 5);
        assert_eq!(config.short_term_window, 16);
        assert_eq!(config.history_hours, 4);
        assert_eq!(config.update_interval_secs, 15);
        assert_eq!(config.plot_min_interval_ms, 3000);
        assert_eq!(config.levels.bands().len(), 4);
    }

    #[test]
    fn capacity_formula() {
        let mut config = PipelineConfig::default();
        assert_eq!(config.max_data_points(), 960); // 4 h × 3600 / 15 s

        config.history_hours = 0;
        assert_eq!(config.max_data_points(), 1); // floor at one sample

        config.history_hours = 1;
        config.update_interval_secs = 0; // interval floor guards division
        assert_eq!(config.max_data_points(), 3600);
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("radwatch.json");

        let mut config = PipelineConfig::default();
        config.alarm_threshold = 0.8;
        config.history_hours = 2;

        config.save(&path).unwrap();
        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = PipelineConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, PipelineConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"alarm_threshold": 2.5}"#).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded.alarm_threshold, 2.5);
        assert_eq!(loaded.moving_avg_window, 5);
        assert_eq!(loaded.levels.classify(0.05).level, Severity::Normal);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            PipelineConfig::load(&path),
            Err(ConfigError::Format(_))
        ));
    }
}
