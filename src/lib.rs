//! facesignal: temporal face tracking and behavioral signal fusion
//!
//! Per frame: detections → IdentityTracker → per-track extractors
//! (blink machine, quadrant analyzer, micro-expression detector, motion)
//! → published snapshot → CrossSourceValidator.

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{ConfigError, FacesignalError, FrameError};

// =============================================================================
// IDENTITY TRACKER
// =============================================================================

/// Minimum IoU for a detection to claim an existing track (strictly greater)
pub const TRACK_MIN_IOU: f64 = 0.3;

/// Maximum position history entries per track
pub const TRACK_HISTORY_LEN: usize = 30;

/// Number of most recent history deltas used for average speed
pub const TRACK_SPEED_WINDOW: usize = 5;

/// Slack applied when comparing differences of floating-point timestamps
pub const TIME_EPSILON: f64 = 1e-9;

// =============================================================================
// EYES / BLINKS
// =============================================================================

/// EAR above this value means the eye is open
pub const EAR_OPEN_THRESHOLD: f64 = 0.2;

/// EAR used when the geometry is degenerate or landmarks are absent
pub const EAR_DEFAULT: f64 = 0.3;

/// Shortest closure counted as a blink (seconds)
pub const BLINK_MIN_DURATION_SECS: f64 = 0.05;

/// Longest closure counted as a blink (seconds)
pub const BLINK_MAX_DURATION_SECS: f64 = 0.5;

/// Maximum gap between left and right cycle starts for a synchronized blink
pub const BLINK_SYNC_TOLERANCE_SECS: f64 = 0.1;

/// Per-eye sample buffer length
pub const EYE_HISTORY_LEN: usize = 30;

/// Samples used for per-eye movement metrics
pub const EYE_MOVEMENT_WINDOW: usize = 5;

// =============================================================================
// MICRO-EXPRESSIONS
// =============================================================================

/// Expression samples retained per track
pub const EXPRESSION_HISTORY_LEN: usize = 20;

/// Micro-expression events retained per track
pub const MICRO_LOG_LEN: usize = 30;

/// A reversion shorter than this is a micro-expression (seconds)
pub const MICRO_MAX_SPAN_SECS: f64 = 0.5;

/// Samples considered by the stability score
pub const STABILITY_WINDOW: usize = 10;

/// Below this many samples the stability score is 1.0
pub const STABILITY_MIN_SAMPLES: usize = 5;

/// Logged events considered by the pattern description
pub const PATTERN_WINDOW: usize = 10;

/// Same-label events needed for a "Frequent" pattern
pub const PATTERN_FREQUENT_MIN: usize = 3;

/// Events needed for a "Multiple" pattern
pub const PATTERN_MULTIPLE_MIN: usize = 5;

// =============================================================================
// QUADRANTS
// =============================================================================

/// Centroid movement (px) at which quadrant stability reaches zero
pub const QUADRANT_STABILITY_SCALE: f64 = 50.0;

/// Movement below this on both axes is reported as Stable (px)
pub const QUADRANT_STILL_PX: f64 = 2.0;

// =============================================================================
// POSE (degrees)
// =============================================================================

pub const YAW_SCALE_DEG: f64 = 30.0;
pub const PITCH_SCALE_DEG: f64 = 40.0;
pub const PITCH_THRESHOLD_DEG: f64 = 10.0;
pub const YAW_THRESHOLD_DEG: f64 = 10.0;
pub const ROLL_THRESHOLD_DEG: f64 = 5.0;

/// Gaze offset ratio under which gaze is Center
pub const GAZE_CENTER_RATIO: f64 = 0.1;

/// Gaze offset ratio past which gaze is fully Left/Right
pub const GAZE_LOOKING_RATIO: f64 = 0.2;

// =============================================================================
// CROSS-SOURCE VALIDATION
// =============================================================================

/// Maximum synchronized blink count difference that still matches
pub const VALIDATION_BLINK_TOLERANCE: u32 = 2;

/// Maximum per-axis pose difference that still matches (degrees)
pub const VALIDATION_POSE_TOLERANCE_DEG: f64 = 5.0;

/// Confidence strictly above this is Validated
pub const VALIDATION_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Confidence reported when no check could be performed
pub const VALIDATION_NO_DATA_CONFIDENCE: f64 = 0.5;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.1.0";
