//! Error types for facesignal
//!
//! Only caller contract violations are errors. Missing landmarks, empty
//! frames and zero-area boxes degrade to documented defaults instead.

use thiserror::Error;

/// Top-level error type
#[derive(Error, Debug)]
pub enum FacesignalError {
    #[error("Frame rejected: {0}")]
    Frame(#[from] FrameError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inbound frame contract violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("detection {index} has negative size ({w} x {h})")]
    NegativeSize { index: usize, w: f64, h: f64 },

    #[error("detection {index} has a non-finite coordinate")]
    NonFiniteBox { index: usize },

    #[error("timestamp is not finite")]
    NonFiniteTimestamp,

    #[error("timestamp {current} precedes previous frame at {previous}")]
    NonMonotonicTimestamp { previous: f64, current: f64 },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}
