//! Engine configuration
//!
//! Every section defaults to the constants in the crate root, so an empty
//! TOML file (or no file at all) reproduces the stock behaviour.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, FacesignalError};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tracker: TrackerConfig,
    pub blink: BlinkConfig,
    pub micro: MicroConfig,
    pub quadrant: QuadrantConfig,
    pub validation: ValidationConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FacesignalError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string and validate it
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, FacesignalError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.tracker.min_iou) {
            return Err(ConfigError::Invalid(format!(
                "tracker.min_iou must be within [0, 1], got {}",
                self.tracker.min_iou
            )));
        }
        if self.tracker.history_len == 0
            || self.blink.history_len == 0
            || self.micro.history_len == 0
            || self.micro.log_len == 0
        {
            return Err(ConfigError::Invalid("history lengths must be non-zero".into()));
        }
        if self.blink.min_duration_secs > self.blink.max_duration_secs {
            return Err(ConfigError::Invalid(format!(
                "blink.min_duration_secs ({}) exceeds blink.max_duration_secs ({})",
                self.blink.min_duration_secs, self.blink.max_duration_secs
            )));
        }
        if self.quadrant.stability_scale <= 0.0 {
            return Err(ConfigError::Invalid("quadrant.stability_scale must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub min_iou: f64,
    pub history_len: usize,
    pub speed_window: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_iou: crate::TRACK_MIN_IOU,
            history_len: crate::TRACK_HISTORY_LEN,
            speed_window: crate::TRACK_SPEED_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    pub ear_threshold: f64,
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,
    pub sync_tolerance_secs: f64,
    pub history_len: usize,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_threshold: crate::EAR_OPEN_THRESHOLD,
            min_duration_secs: crate::BLINK_MIN_DURATION_SECS,
            max_duration_secs: crate::BLINK_MAX_DURATION_SECS,
            sync_tolerance_secs: crate::BLINK_SYNC_TOLERANCE_SECS,
            history_len: crate::EYE_HISTORY_LEN,
        }
    }
}

impl BlinkConfig {
    /// Is a closure of this length a real blink?
    pub fn is_valid_duration(&self, duration: f64) -> bool {
        duration >= self.min_duration_secs - crate::TIME_EPSILON
            && duration <= self.max_duration_secs + crate::TIME_EPSILON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroConfig {
    pub history_len: usize,
    pub log_len: usize,
    pub max_span_secs: f64,
    pub stability_window: usize,
}

impl Default for MicroConfig {
    fn default() -> Self {
        Self {
            history_len: crate::EXPRESSION_HISTORY_LEN,
            log_len: crate::MICRO_LOG_LEN,
            max_span_secs: crate::MICRO_MAX_SPAN_SECS,
            stability_window: crate::STABILITY_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadrantConfig {
    pub stability_scale: f64,
}

impl Default for QuadrantConfig {
    fn default() -> Self {
        Self {
            stability_scale: crate::QUADRANT_STABILITY_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub blink_tolerance: u32,
    pub pose_tolerance_deg: f64,
    pub confidence_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            blink_tolerance: crate::VALIDATION_BLINK_TOLERANCE,
            pose_tolerance_deg: crate::VALIDATION_POSE_TOLERANCE_DEG,
            confidence_threshold: crate::VALIDATION_CONFIDENCE_THRESHOLD,
        }
    }
}
