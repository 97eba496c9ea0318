//! 2D-proxy gaze and head-pose values

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GazeDirection {
    Center,
    #[serde(rename = "Slightly Right")]
    SlightlyRight,
    #[serde(rename = "Slightly Left")]
    SlightlyLeft,
    #[serde(rename = "Looking Right")]
    LookingRight,
    #[serde(rename = "Looking Left")]
    LookingLeft,
}

impl std::fmt::Display for GazeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Center => "Center",
            Self::SlightlyRight => "Slightly Right",
            Self::SlightlyLeft => "Slightly Left",
            Self::LookingRight => "Looking Right",
            Self::LookingLeft => "Looking Left",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeEstimate {
    pub direction: GazeDirection,
    /// offset_ratio scaled to approximate degrees
    pub angle: f64,
    /// Eye midpoint offset from box center, in half box widths
    pub offset_ratio: f64,
}

impl Default for GazeEstimate {
    fn default() -> Self {
        Self {
            direction: GazeDirection::Center,
            angle: 0.0,
            offset_ratio: 0.0,
        }
    }
}

/// Per-axis coarse direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisDirection {
    Up,
    Down,
    Level,
    Left,
    Right,
    Center,
    Straight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tilt {
    Straight,
    #[serde(rename = "Tilted Right")]
    TiltedRight,
    #[serde(rename = "Tilted Left")]
    TiltedLeft,
}

impl Tilt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Straight => "Straight",
            Self::TiltedRight => "Tilted Right",
            Self::TiltedLeft => "Tilted Left",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    /// Up/down, degrees (positive = nose lower in the box than neutral)
    pub pitch: f64,
    /// Left/right turn, degrees
    pub yaw: f64,
    /// In-plane tilt, degrees
    pub roll: f64,
    pub tilt: Tilt,
    /// "Frontal" or the space-joined descriptors of axes past threshold
    pub orientation: String,
    pub pitch_direction: AxisDirection,
    pub yaw_direction: AxisDirection,
    pub roll_direction: AxisDirection,
}

impl Default for HeadPose {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            tilt: Tilt::Straight,
            orientation: "Frontal".to_string(),
            pitch_direction: AxisDirection::Level,
            yaw_direction: AxisDirection::Center,
            roll_direction: AxisDirection::Straight,
        }
    }
}

/// Simplified FACS action units from landmark geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionUnits {
    /// Inner brow raiser
    pub au1: bool,
    /// Brow lowerer
    pub au4: bool,
    /// Lip corner puller
    pub au12: bool,
}

/// Everything the stateless estimator derives from one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceGeometry {
    pub gaze: GazeEstimate,
    pub head_pose: HeadPose,
    /// 1.0 = eyes equidistant from box center; 0.5 when unknown
    pub symmetry: f64,
    pub action_units: ActionUnits,
}
