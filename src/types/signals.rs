//! Outbound per-track signal bundle and per-source snapshots

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use super::{
    BBox, BlinkEvent, EyeMotionReport, EyesReport, FaceGeometry, Landmarks,
    MicroExpressionReport, MouthReport, Placement, Point, QuadrantReport, TrackId,
};

/// Everything computed for one track on one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSignals {
    pub track_id: TrackId,
    pub bbox: BBox,
    pub center: Point,
    pub area: f64,
    /// Average speed over the recent position history (px/s)
    pub speed: f64,
    pub placement: Placement,
    pub landmarks: Option<Landmarks>,
    pub geometry: FaceGeometry,
    /// None when no eye centers were supplied
    pub eyes: Option<EyesReport>,
    /// Authoritative blink count; present on every frame, with or without
    /// eye landmarks
    pub synchronized_blink_count: u32,
    /// Blinks validated on this frame
    pub blinks: Vec<BlinkEvent>,
    pub quadrants: QuadrantReport,
    /// None until an expression has been supplied for this track
    pub micro: Option<MicroExpressionReport>,
    pub eye_motion: Option<EyeMotionReport>,
    pub mouth: Option<MouthReport>,
}

impl FaceSignals {
    pub fn expression_label(&self) -> Option<&str> {
        self.micro.as_ref().map(|m| m.record.current_label.as_str())
    }
}

/// Result of one `process_frame` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub timestamp: f64,
    /// Live tracks in ascending id order
    pub faces: Vec<FaceSignals>,
    pub new_tracks: Vec<TrackId>,
    pub dropped_tracks: Vec<TrackId>,
}

/// Latest published state of one source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub source_id: String,
    pub frame_count: u64,
    pub last_update: Option<f64>,
    pub faces: BTreeMap<TrackId, FaceSignals>,
}

impl SourceSnapshot {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            ..Default::default()
        }
    }

    /// Lowest live track id; cross-source comparison uses this face
    pub fn representative(&self) -> Option<&FaceSignals> {
        self.faces.values().next()
    }
}
