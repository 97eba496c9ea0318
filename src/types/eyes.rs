//! Per-eye state and blink reporting

use serde::{Deserialize, Serialize};

use super::{CompassDirection, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeSide {
    Left,
    Right,
}

impl EyeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// One frame's observation of one eye
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeSample {
    pub position: Point,
    pub ear: f64,
    pub open: bool,
    pub time: f64,
}

/// Movement of one eye over its most recent samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeMovement {
    /// Mean speed over the window (px/s)
    pub speed: f64,
    pub total_distance: f64,
    pub direction: CompassDirection,
}

impl Default for EyeMovement {
    fn default() -> Self {
        Self {
            speed: 0.0,
            total_distance: 0.0,
            direction: CompassDirection::Stable,
        }
    }
}

/// Current state of one eye
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeStatus {
    pub side: EyeSide,
    pub position: Point,
    pub ear: f64,
    pub open: bool,
    pub movement: EyeMovement,
    /// Validated single-eye blink cycles (diagnostic, not the blink count)
    pub individual_blinks: u32,
}

impl EyeStatus {
    pub fn status(&self) -> &'static str {
        if self.open {
            "Open"
        } else {
            "Closed"
        }
    }
}

/// Both eyes for one track; `synchronized_blink_count` is authoritative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyesReport {
    pub left: EyeStatus,
    pub right: EyeStatus,
    /// Both eyes in the same open/closed state this frame
    pub synchronized: bool,
    /// |left EAR - right EAR|
    pub asymmetry: f64,
    pub synchronized_blink_count: u32,
}

/// Which eye(s) a blink event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlinkKind {
    Left,
    Right,
    Both,
}

/// A validated blink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkEvent {
    pub kind: BlinkKind,
    /// When the closure started (seconds)
    pub start: f64,
    /// Closure duration (seconds); for `Both`, the longer of the two
    pub duration: f64,
}
