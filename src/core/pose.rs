//! Gaze & head-pose estimator
//!
//! Pure functions of (landmarks, box); nothing is persisted between frames.
//! All angles are 2D-proxy heuristics. Missing landmarks give zero angles
//! and `Frontal`, a zero-size box skips every ratio.

use crate::core::geometry::angle_deg;
use crate::types::{
    ActionUnits, AxisDirection, BBox, FaceGeometry, GazeDirection, GazeEstimate, HeadPose,
    Landmarks, Tilt,
};

/// Eye-midpoint offset from box center x, in half box widths
fn offset_ratio(landmarks: &Landmarks, bbox: &BBox) -> Option<f64> {
    let midpoint = landmarks.eye_midpoint()?;
    if bbox.w <= 0.0 {
        return Some(0.0);
    }
    Some((midpoint.x - bbox.center().x) / (bbox.w / 2.0))
}

pub fn estimate_gaze(landmarks: &Landmarks, bbox: &BBox) -> GazeEstimate {
    let Some(ratio) = offset_ratio(landmarks, bbox) else {
        return GazeEstimate::default();
    };

    let direction = if ratio.abs() < crate::GAZE_CENTER_RATIO {
        GazeDirection::Center
    } else if ratio > crate::GAZE_LOOKING_RATIO {
        GazeDirection::LookingRight
    } else if ratio < -crate::GAZE_LOOKING_RATIO {
        GazeDirection::LookingLeft
    } else if ratio > 0.0 {
        GazeDirection::SlightlyRight
    } else {
        GazeDirection::SlightlyLeft
    };

    GazeEstimate {
        direction,
        angle: ratio * crate::YAW_SCALE_DEG,
        offset_ratio: ratio,
    }
}

fn yaw(landmarks: &Landmarks, bbox: &BBox) -> f64 {
    offset_ratio(landmarks, bbox).map_or(0.0, |r| r * crate::YAW_SCALE_DEG)
}

fn pitch(landmarks: &Landmarks, bbox: &BBox) -> f64 {
    match (landmarks.nose_tip, landmarks.forehead) {
        (Some(nose), Some(forehead)) if bbox.h > 0.0 => {
            let ratio = (nose.y - forehead.y) / bbox.h;
            (ratio - 0.5) * crate::PITCH_SCALE_DEG
        }
        _ => 0.0,
    }
}

fn roll(landmarks: &Landmarks) -> f64 {
    match landmarks.eyes() {
        Some((left, right)) if right.x != left.x => angle_deg(right.x - left.x, right.y - left.y),
        _ => 0.0,
    }
}

fn tilt(roll: f64) -> Tilt {
    if roll.abs() < crate::ROLL_THRESHOLD_DEG {
        Tilt::Straight
    } else if roll > 0.0 {
        Tilt::TiltedRight
    } else {
        Tilt::TiltedLeft
    }
}

/// "Frontal" unless some axis reaches its threshold, else the descriptors
/// of every axis past threshold joined by spaces
pub fn orientation_label(pitch: f64, yaw: f64, roll: f64) -> String {
    let mut parts = Vec::new();

    if pitch > crate::PITCH_THRESHOLD_DEG {
        parts.push("Looking Up");
    } else if pitch < -crate::PITCH_THRESHOLD_DEG {
        parts.push("Looking Down");
    }

    if yaw > crate::YAW_THRESHOLD_DEG {
        parts.push("Right");
    } else if yaw < -crate::YAW_THRESHOLD_DEG {
        parts.push("Left");
    }

    if roll > crate::ROLL_THRESHOLD_DEG {
        parts.push("Tilted Right");
    } else if roll < -crate::ROLL_THRESHOLD_DEG {
        parts.push("Tilted Left");
    }

    if parts.is_empty() {
        "Frontal".to_string()
    } else {
        parts.join(" ")
    }
}

fn axis(value: f64, threshold: f64, positive: AxisDirection, negative: AxisDirection, neutral: AxisDirection) -> AxisDirection {
    if value > threshold {
        positive
    } else if value < -threshold {
        negative
    } else {
        neutral
    }
}

pub fn estimate_head_pose(landmarks: &Landmarks, bbox: &BBox) -> HeadPose {
    let pitch = pitch(landmarks, bbox);
    let yaw = yaw(landmarks, bbox);
    let roll = roll(landmarks);

    HeadPose {
        pitch,
        yaw,
        roll,
        tilt: tilt(roll),
        orientation: orientation_label(pitch, yaw, roll),
        pitch_direction: axis(pitch, 5.0, AxisDirection::Up, AxisDirection::Down, AxisDirection::Level),
        yaw_direction: axis(yaw, crate::YAW_THRESHOLD_DEG, AxisDirection::Right, AxisDirection::Left, AxisDirection::Center),
        roll_direction: axis(roll, crate::ROLL_THRESHOLD_DEG, AxisDirection::Right, AxisDirection::Left, AxisDirection::Straight),
    }
}

/// 1 - |dl - dr| / (dl + dr) over the eyes' horizontal distance to the box
/// center; 0.5 when unknown
pub fn symmetry(landmarks: &Landmarks, bbox: &BBox) -> f64 {
    let Some((left, right)) = landmarks.eyes() else {
        return 0.5;
    };
    let cx = bbox.center().x;
    let dl = (left.x - cx).abs();
    let dr = (right.x - cx).abs();
    if dl + dr > 0.0 {
        1.0 - (dl - dr).abs() / (dl + dr)
    } else {
        0.5
    }
}

pub fn action_units(landmarks: &Landmarks, bbox: &BBox) -> ActionUnits {
    if bbox.is_degenerate() {
        return ActionUnits::default();
    }

    let au1 = match (landmarks.left_eyebrow, landmarks.forehead) {
        (Some(brow), Some(forehead)) => (brow.y - forehead.y).abs() / bbox.h > 0.15,
        _ => false,
    };
    let au4 = match (landmarks.left_eyebrow, landmarks.left_eye) {
        (Some(brow), Some(eye)) => (brow.y - eye.y).abs() / bbox.h < 0.08,
        _ => false,
    };
    let au12 = match (landmarks.mouth_left, landmarks.mouth_right) {
        (Some(l), Some(r)) => (l.x - r.x).abs() / bbox.w > 0.4,
        _ => false,
    };

    ActionUnits { au1, au4, au12 }
}

/// Everything the estimator derives from one frame
pub fn analyze(landmarks: Option<&Landmarks>, bbox: &BBox) -> FaceGeometry {
    let Some(landmarks) = landmarks else {
        return FaceGeometry {
            symmetry: 0.5,
            ..FaceGeometry::default()
        };
    };

    FaceGeometry {
        gaze: estimate_gaze(landmarks, bbox),
        head_pose: estimate_head_pose(landmarks, bbox),
        symmetry: symmetry(landmarks, bbox),
        action_units: action_units(landmarks, bbox),
    }
}
