//! Geometry utilities: IoU, distance/speed, angles, compass bucketing

use crate::types::{BBox, CompassDirection, Point};

/// Intersection over union of two boxes.
/// Disjoint or touching boxes give 0; a zero union gives 0.
pub fn iou(a: &BBox, b: &BBox) -> f64 {
    let xi1 = a.x.max(b.x);
    let yi1 = a.y.max(b.y);
    let xi2 = a.right().min(b.right());
    let yi2 = a.bottom().min(b.bottom());

    if xi2 <= xi1 || yi2 <= yi1 {
        return 0.0;
    }

    let inter = (xi2 - xi1) * (yi2 - yi1);
    let union = a.area() + b.area() - inter;

    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

/// Euclidean distance
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Distance per second, or None for a non-positive time step
pub fn speed(from: Point, to: Point, dt: f64) -> Option<f64> {
    if dt > 0.0 {
        Some(distance(from, to) / dt)
    } else {
        None
    }
}

/// Angle of the vector (dx, dy) in degrees, in (-180, 180]
pub fn angle_deg(dx: f64, dy: f64) -> f64 {
    dy.atan2(dx).to_degrees()
}

/// Bucket a movement vector into one of eight 45° sectors.
/// Vectors with both components under `still` are `Stable`.
pub fn compass_direction(dx: f64, dy: f64, still: f64) -> CompassDirection {
    if dx.abs() < still && dy.abs() < still {
        return CompassDirection::Stable;
    }

    let angle = angle_deg(dx, dy);

    if (-22.5..22.5).contains(&angle) {
        CompassDirection::Right
    } else if (22.5..67.5).contains(&angle) {
        CompassDirection::DownRight
    } else if (67.5..112.5).contains(&angle) {
        CompassDirection::Down
    } else if (112.5..157.5).contains(&angle) {
        CompassDirection::DownLeft
    } else if !(-157.5..157.5).contains(&angle) {
        CompassDirection::Left
    } else if (-157.5..-112.5).contains(&angle) {
        CompassDirection::UpLeft
    } else if (-112.5..-67.5).contains(&angle) {
        CompassDirection::Up
    } else {
        CompassDirection::UpRight
    }
}
