//! Named facial landmarks with explicit absence
//!
//! The upstream detector supplies a best-effort subset. Every consumer
//! matches on the `Option` instead of assuming a point exists.

use serde::{Deserialize, Serialize};

use super::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Landmarks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_eye: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_eye: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_eye_corner: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_eye_corner: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_eyebrow: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_eyebrow: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nose_tip: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_center: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_left: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_right: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chin: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forehead: Option<Point>,
}

impl Landmarks {
    /// All present points with their names, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Point)> {
        [
            ("left_eye", self.left_eye),
            ("right_eye", self.right_eye),
            ("left_eye_corner", self.left_eye_corner),
            ("right_eye_corner", self.right_eye_corner),
            ("left_eyebrow", self.left_eyebrow),
            ("right_eyebrow", self.right_eyebrow),
            ("nose_tip", self.nose_tip),
            ("mouth_center", self.mouth_center),
            ("mouth_left", self.mouth_left),
            ("mouth_right", self.mouth_right),
            ("chin", self.chin),
            ("forehead", self.forehead),
        ]
        .into_iter()
        .filter_map(|(name, point)| point.map(|p| (name, p)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Both eye centers, when both are present
    pub fn eyes(&self) -> Option<(Point, Point)> {
        Some((self.left_eye?, self.right_eye?))
    }

    /// Midpoint between the eye centers
    pub fn eye_midpoint(&self) -> Option<Point> {
        self.eyes().map(|(l, r)| l.midpoint(r))
    }
}
