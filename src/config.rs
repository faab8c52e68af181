//! Configuration for lamp noise analysis.
//!
//! A `Config` value is built once per run (defaults, optionally overlaid by a
//! JSON file and command line flags) and passed to every stage explicitly.

use crate::core::selector::SelectionMode;
use crate::loader::types::ChannelLabel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default duration of one scored subset, in seconds.
pub const DEFAULT_SUBSET_DURATION_SECS: f64 = 30.0;

/// Default warm-up excluded from statistics, in seconds.
pub const DEFAULT_WARMUP_SECS: f64 = 1800.0;

/// Default analysis window length, in seconds.
pub const DEFAULT_WINDOW_SECS: f64 = 3600.0;

/// Default number of intervals kept per channel.
pub const DEFAULT_MAX_INTERVALS: usize = 120;

/// Conventional threshold for flagging high-noise intervals.
pub const DEFAULT_NOISE_THRESHOLD: f64 = 1200.0;

/// Default padding around a high-noise interval when extracting raw samples.
pub const DEFAULT_CONTEXT_PADDING_SECS: f64 = 10.0;

/// Main configuration for an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target duration of each scored subset
    pub subset_duration_secs: f64,

    /// Window that statistics and high-noise selection are computed over
    pub window: AnalysisWindow,

    /// Which channels to analyze
    pub channels: ChannelConfig,

    /// How high-noise intervals are picked
    pub selection: SelectionMode,

    /// Stop reading files once every channel has a full window
    pub early_stop: bool,

    /// Padding around high-noise intervals for raw sample extraction
    pub context_padding_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subset_duration_secs: DEFAULT_SUBSET_DURATION_SECS,
            window: AnalysisWindow::default(),
            channels: ChannelConfig::default(),
            selection: SelectionMode::default(),
            early_stop: true,
            context_padding_secs: DEFAULT_CONTEXT_PADDING_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lamp-noise")
            .join("config.json")
    }

    /// Reject settings no run can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.subset_duration_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "subset duration must be positive, got {}",
                self.subset_duration_secs
            )));
        }
        if self.window.warmup_secs < 0.0 || self.window.length_secs < 0.0 {
            return Err(ConfigError::Invalid(
                "analysis window bounds must be non-negative".to_string(),
            ));
        }
        if !self.channels.any_enabled() {
            return Err(ConfigError::Invalid(
                "at least one channel must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Inclusive time range on the stitched timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Span of the stitched timeline that statistics are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisWindow {
    /// Seconds excluded at the start of the run
    pub warmup_secs: f64,
    /// Length of the window after warm-up
    pub length_secs: f64,
    /// Maximum intervals per channel used for statistics
    pub max_intervals: usize,
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        Self {
            warmup_secs: DEFAULT_WARMUP_SECS,
            length_secs: DEFAULT_WINDOW_SECS,
            max_intervals: DEFAULT_MAX_INTERVALS,
        }
    }
}

impl AnalysisWindow {
    pub fn end_secs(&self) -> f64 {
        self.warmup_secs + self.length_secs
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.warmup_secs, self.end_secs())
    }

    /// Whether an interval starting at `start_time` counts toward the window.
    pub fn contains(&self, start_time: f64) -> bool {
        self.range().contains(start_time)
    }
}

/// Configuration for which channels to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub main: bool,
    pub reference: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            main: true,
            reference: true,
        }
    }
}

impl ChannelConfig {
    /// Parse channel configuration from a comma-separated string.
    pub fn from_csv(s: &str) -> Self {
        let channels: Vec<String> = s.split(',').map(|s| s.trim().to_lowercase()).collect();

        Self {
            main: channels.iter().any(|s| s == "main" || s == "all"),
            reference: channels
                .iter()
                .any(|s| s == "reference" || s == "ref" || s == "all"),
        }
    }

    /// Check if at least one channel is enabled.
    pub fn any_enabled(&self) -> bool {
        self.main || self.reference
    }

    pub fn is_enabled(&self, label: ChannelLabel) -> bool {
        match label {
            ChannelLabel::Main => self.main,
            ChannelLabel::Reference => self.reference,
        }
    }

    /// Enabled channels in reporting order.
    pub fn enabled(&self) -> Vec<ChannelLabel> {
        ChannelLabel::ALL
            .into_iter()
            .filter(|label| self.is_enabled(*label))
            .collect()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_config_parsing() {
        let config = ChannelConfig::from_csv("main,reference");
        assert!(config.main);
        assert!(config.reference);

        let config = ChannelConfig::from_csv("main");
        assert!(config.main);
        assert!(!config.reference);

        let config = ChannelConfig::from_csv(" Ref ");
        assert!(!config.main);
        assert!(config.reference);

        let config = ChannelConfig::from_csv("all");
        assert_eq!(config.enabled(), vec![ChannelLabel::Main, ChannelLabel::Reference]);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.subset_duration_secs, 30.0);
        assert_eq!(config.window.warmup_secs, 1800.0);
        assert_eq!(config.window.end_secs(), 5400.0);
        assert_eq!(config.window.max_intervals, 120);
        assert!(config.early_stop);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = AnalysisWindow::default();
        assert!(window.contains(1800.0));
        assert!(window.contains(5400.0));
        assert!(!window.contains(1799.99));
        assert!(!window.contains(5400.01));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"window": {"warmup_secs": 0.0}}"#).unwrap();
        assert_eq!(config.window.warmup_secs, 0.0);
        assert_eq!(config.window.length_secs, 3600.0);
        assert_eq!(config.subset_duration_secs, 30.0);
    }

    #[test]
    fn test_config_roundtrip_on_disk() {
        let path = std::env::temp_dir()
            .join("lamp-noise-config-test")
            .join("config.json");
        let mut config = Config::default();
        config.window.max_intervals = 7;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_validate_rejects_no_channels() {
        let config = Config {
            channels: ChannelConfig {
                main: false,
                reference: false,
            },
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
