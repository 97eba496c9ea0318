//! Face quadrants and their frame-over-frame motion

use serde::{Deserialize, Serialize};

use super::{BBox, CompassDirection, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadrantName {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl QuadrantName {
    pub const ALL: [QuadrantName; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::TopRight => "top_right",
            Self::BottomLeft => "bottom_left",
            Self::BottomRight => "bottom_right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quadrant {
    pub name: QuadrantName,
    pub bounds: BBox,
    pub center: Point,
    /// Landmark names that fall inside this quadrant
    pub features: Vec<String>,
}

/// The four quadrants of one box, indexed in `QuadrantName::ALL` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadrantSet {
    pub split: Point,
    pub quadrants: [Quadrant; 4],
}

impl QuadrantSet {
    pub fn get(&self, name: QuadrantName) -> &Quadrant {
        &self.quadrants[name as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadrantMotion {
    pub name: QuadrantName,
    /// Centroid displacement since the previous frame (px)
    pub movement: f64,
    /// max(0, 1 - movement / scale)
    pub stability: f64,
    /// None on cold start
    pub direction: Option<CompassDirection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadrantReport {
    pub quadrants: QuadrantSet,
    pub motion: [QuadrantMotion; 4],
}

impl QuadrantReport {
    pub fn motion_of(&self, name: QuadrantName) -> &QuadrantMotion {
        &self.motion[name as usize]
    }

    /// Mean stability across all four quadrants
    pub fn overall_stability(&self) -> f64 {
        self.motion.iter().map(|m| m.stability).sum::<f64>() / 4.0
    }
}
