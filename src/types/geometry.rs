//! Plain 2D geometry values shared by every component

use serde::{Deserialize, Serialize};

/// A point in image coordinates (x right, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned box: top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Zero width or height: quality-dependent computations are skipped
    pub fn is_degenerate(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// Eight 45° compass sectors in image space, `Right` centered on 0° and
/// proceeding clockwise on screen (y grows downward), plus `Stable`
/// for movements too small to have a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassDirection {
    Stable,
    Right,
    #[serde(rename = "Down-Right")]
    DownRight,
    Down,
    #[serde(rename = "Down-Left")]
    DownLeft,
    Left,
    #[serde(rename = "Up-Left")]
    UpLeft,
    Up,
    #[serde(rename = "Up-Right")]
    UpRight,
}

impl CompassDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Right => "Right",
            Self::DownRight => "Down-Right",
            Self::Down => "Down",
            Self::DownLeft => "Down-Left",
            Self::Left => "Left",
            Self::UpLeft => "Up-Left",
            Self::Up => "Up",
            Self::UpRight => "Up-Right",
        }
    }
}

impl std::fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
