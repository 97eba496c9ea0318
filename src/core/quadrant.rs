//! Quadrant spatial analyzer
//!
//! `partition` is stateless. `QuadrantAnalyzer` keeps one previous snapshot
//! of quadrant centers per track and reports movement against it.

use crate::config::QuadrantConfig;
use crate::core::geometry::{compass_direction, distance};
use crate::types::{
    BBox, Landmarks, Point, Quadrant, QuadrantMotion, QuadrantName, QuadrantReport, QuadrantSet,
};

/// Split a box at its center. Landmarks on the split line belong to the
/// right / bottom quadrant.
pub fn partition(bbox: &BBox, landmarks: Option<&Landmarks>) -> QuadrantSet {
    let split = bbox.center();
    let left_w = split.x - bbox.x;
    let right_w = bbox.right() - split.x;
    let top_h = split.y - bbox.y;
    let bottom_h = bbox.bottom() - split.y;

    let bounds = |name: QuadrantName| match name {
        QuadrantName::TopLeft => BBox::new(bbox.x, bbox.y, left_w, top_h),
        QuadrantName::TopRight => BBox::new(split.x, bbox.y, right_w, top_h),
        QuadrantName::BottomLeft => BBox::new(bbox.x, split.y, left_w, bottom_h),
        QuadrantName::BottomRight => BBox::new(split.x, split.y, right_w, bottom_h),
    };

    let quadrants = QuadrantName::ALL.map(|name| {
        let b = bounds(name);
        Quadrant {
            name,
            bounds: b,
            center: b.center(),
            features: Vec::new(),
        }
    });

    let mut set = QuadrantSet { split, quadrants };

    if let Some(landmarks) = landmarks {
        for (feature, point) in landmarks.iter() {
            let name = quadrant_of(split, point);
            set.quadrants[name as usize].features.push(feature.to_string());
        }
    }

    set
}

/// Which quadrant a point falls in relative to `split`
pub fn quadrant_of(split: Point, point: Point) -> QuadrantName {
    match (point.x >= split.x, point.y >= split.y) {
        (false, false) => QuadrantName::TopLeft,
        (true, false) => QuadrantName::TopRight,
        (false, true) => QuadrantName::BottomLeft,
        (true, true) => QuadrantName::BottomRight,
    }
}

/// Per-track quadrant motion state
#[derive(Debug, Clone, Default)]
pub struct QuadrantAnalyzer {
    config: QuadrantConfig,
    previous: Option<[Point; 4]>,
}

impl QuadrantAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QuadrantConfig) -> Self {
        Self {
            config,
            previous: None,
        }
    }

    /// Partition this frame's box and compare each quadrant center to the
    /// previous frame's
    pub fn analyze(&mut self, bbox: &BBox, landmarks: Option<&Landmarks>) -> QuadrantReport {
        let quadrants = partition(bbox, landmarks);
        let centers = quadrants.quadrants.each_ref().map(|q| q.center);

        let motion = QuadrantName::ALL.map(|name| {
            let idx = name as usize;
            match self.previous {
                None => QuadrantMotion {
                    name,
                    movement: 0.0,
                    stability: 1.0,
                    direction: None,
                },
                Some(prev) => {
                    let movement = distance(prev[idx], centers[idx]);
                    QuadrantMotion {
                        name,
                        movement,
                        stability: (1.0 - movement / self.config.stability_scale).max(0.0),
                        direction: Some(compass_direction(
                            centers[idx].x - prev[idx].x,
                            centers[idx].y - prev[idx].y,
                            crate::QUADRANT_STILL_PX,
                        )),
                    }
                }
            }
        });

        self.previous = Some(centers);
        QuadrantReport { quadrants, motion }
    }

    pub fn has_snapshot(&self) -> bool {
        self.previous.is_some()
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompassDirection;
    use pretty_assertions::assert_eq;

    fn face() -> BBox {
        BBox::new(100.0, 100.0, 100.0, 100.0)
    }

    #[test]
    fn test_partition_bounds() {
        let set = partition(&face(), None);
        assert_eq!(set.split, Point::new(150.0, 150.0));
        assert_eq!(set.get(QuadrantName::TopLeft).bounds, BBox::new(100.0, 100.0, 50.0, 50.0));
        assert_eq!(set.get(QuadrantName::BottomRight).bounds, BBox::new(150.0, 150.0, 50.0, 50.0));
        assert_eq!(set.get(QuadrantName::TopRight).center, Point::new(175.0, 125.0));
    }

    #[test]
    fn test_odd_size_splits_at_float_center() {
        let set = partition(&BBox::new(0.0, 0.0, 101.0, 51.0), None);
        assert_eq!(set.split, Point::new(50.5, 25.5));
        assert_eq!(set.get(QuadrantName::TopLeft).bounds.w, 50.5);
        assert_eq!(set.get(QuadrantName::BottomRight).bounds.h, 25.5);
    }

    #[test]
    fn test_landmarks_assigned_once_ties_right_bottom() {
        let lm = Landmarks {
            left_eye: Some(Point::new(130.0, 130.0)),
            right_eye: Some(Point::new(170.0, 130.0)),
            nose_tip: Some(Point::new(150.0, 150.0)),
            mouth_left: Some(Point::new(130.0, 170.0)),
            forehead: Some(Point::new(150.0, 110.0)),
            ..Landmarks::default()
        };
        let set = partition(&face(), Some(&lm));

        assert_eq!(set.get(QuadrantName::TopLeft).features, vec!["left_eye"]);
        assert_eq!(set.get(QuadrantName::TopRight).features, vec!["right_eye", "forehead"]);
        assert_eq!(set.get(QuadrantName::BottomLeft).features, vec!["mouth_left"]);
        assert_eq!(set.get(QuadrantName::BottomRight).features, vec!["nose_tip"]);

        let total: usize = set.quadrants.iter().map(|q| q.features.len()).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_cold_start() {
        let mut analyzer = QuadrantAnalyzer::new();
        let report = analyzer.analyze(&face(), None);
        for m in &report.motion {
            assert_eq!(m.movement, 0.0);
            assert_eq!(m.stability, 1.0);
            assert_eq!(m.direction, None);
        }
        assert!(analyzer.has_snapshot());
    }

    #[test]
    fn test_identical_frames_fully_stable() {
        let mut analyzer = QuadrantAnalyzer::new();
        analyzer.analyze(&face(), None);
        let report = analyzer.analyze(&face(), None);
        for m in &report.motion {
            assert_eq!(m.movement, 0.0);
            assert_eq!(m.stability, 1.0);
            assert_eq!(m.direction, Some(CompassDirection::Stable));
        }
    }

    #[test]
    fn test_fifty_pixel_shift_zero_stability() {
        let mut analyzer = QuadrantAnalyzer::new();
        analyzer.analyze(&face(), None);
        let report = analyzer.analyze(&BBox::new(150.0, 100.0, 100.0, 100.0), None);
        let m = report.motion_of(QuadrantName::TopLeft);
        assert_eq!(m.movement, 50.0);
        assert_eq!(m.stability, 0.0);
        assert_eq!(m.direction, Some(CompassDirection::Right));
        assert_eq!(report.overall_stability(), 0.0);
    }

    #[test]
    fn test_partial_shift_and_direction() {
        let mut analyzer = QuadrantAnalyzer::new();
        analyzer.analyze(&face(), None);
        let report = analyzer.analyze(&BBox::new(100.0, 80.0, 100.0, 100.0), None);
        let m = report.motion_of(QuadrantName::BottomLeft);
        assert_eq!(m.movement, 20.0);
        assert!((m.stability - 0.6).abs() < 1e-9);
        assert_eq!(m.direction, Some(CompassDirection::Up));
    }

    #[test]
    fn test_reset_returns_to_cold_start() {
        let mut analyzer = QuadrantAnalyzer::new();
        analyzer.analyze(&face(), None);
        analyzer.reset();
        let report = analyzer.analyze(&BBox::new(400.0, 400.0, 100.0, 100.0), None);
        assert_eq!(report.motion_of(QuadrantName::TopLeft).stability, 1.0);
    }
}
