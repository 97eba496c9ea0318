//! Eye-midpoint and mouth motion reporting

use serde::{Deserialize, Serialize};

use super::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GazePattern {
    Stable,
    #[serde(rename = "Fixed Gaze")]
    FixedGaze,
    #[serde(rename = "Slow Tracking")]
    SlowTracking,
    #[serde(rename = "Active Scanning")]
    ActiveScanning,
    #[serde(rename = "Rapid Movement")]
    RapidMovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Saccade {
    pub time: f64,
    pub speed: f64,
    /// Degrees, atan2 of the movement vector
    pub direction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    pub position: Point,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeMotionReport {
    pub position: Point,
    pub average_speed: f64,
    pub total_distance: f64,
    pub saccade_count: usize,
    pub fixation_count: usize,
    pub recent_saccades: Vec<Saccade>,
    pub pattern: GazePattern,
    pub is_moving: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouthState {
    Unknown,
    Closed,
    #[serde(rename = "Slightly Open")]
    SlightlyOpen,
    Open,
    #[serde(rename = "Wide Open")]
    WideOpen,
    #[serde(rename = "Very Wide")]
    VeryWide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouthReport {
    pub position: Point,
    pub width: f64,
    /// width / box height, 0 for a zero-height box
    pub opening_ratio: f64,
    pub average_opening: f64,
    pub movement_speed: f64,
    pub total_movement: f64,
    pub state: MouthState,
    pub is_moving: bool,
}
