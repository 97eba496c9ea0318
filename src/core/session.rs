//! Per-source tracking session
//!
//! Owns the identity tracker and every per-track extractor for one source.
//! A frame is processed as a unit: it is validated first, so a rejected
//! frame leaves the session exactly as it was.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::core::blink::EyeBlinkMachine;
use crate::core::micro::MicroExpressionDetector;
use crate::core::motion::FeatureMotionTracker;
use crate::core::pose;
use crate::core::quadrant::QuadrantAnalyzer;
use crate::core::tracker::{placement, IdentityTracker};
use crate::error::FrameError;
use crate::types::{
    BBox, FaceDetection, FaceSignals, FrameInput, FrameReport, MicroExpressionReport, Point,
    SessionStats, SourceSnapshot, TrackId,
};

/// Everything the extractors keep for one identity
#[derive(Debug)]
pub struct TrackState {
    pub blink: EyeBlinkMachine,
    pub quadrants: QuadrantAnalyzer,
    pub micro: MicroExpressionDetector,
    pub motion: FeatureMotionTracker,
    last_micro: Option<MicroExpressionReport>,
}

impl TrackState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            blink: EyeBlinkMachine::with_config(config.blink.clone()),
            quadrants: QuadrantAnalyzer::with_config(config.quadrant.clone()),
            micro: MicroExpressionDetector::with_config(config.micro.clone()),
            motion: FeatureMotionTracker::new(),
            last_micro: None,
        }
    }

    fn reset(&mut self) {
        self.blink.reset();
        self.quadrants.reset();
        self.micro.reset();
        self.motion.reset();
        self.last_micro = None;
    }
}

/// Start a session for `source_id` with default tuning
pub fn create_session(source_id: impl Into<String>) -> TrackingSession {
    TrackingSession::new(source_id)
}

#[derive(Debug)]
pub struct TrackingSession {
    source_id: String,
    config: EngineConfig,
    tracker: IdentityTracker,
    states: BTreeMap<TrackId, TrackState>,
    snapshot: SourceSnapshot,
}

impl TrackingSession {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self::with_config(source_id, EngineConfig::default())
    }

    pub fn with_config(source_id: impl Into<String>, config: EngineConfig) -> Self {
        let source_id = source_id.into();
        Self {
            tracker: IdentityTracker::with_config(config.tracker.clone()),
            snapshot: SourceSnapshot::new(source_id.clone()),
            source_id,
            config,
            states: BTreeMap::new(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Run one frame through the tracker and every extractor
    pub fn process_frame(&mut self, frame: &FrameInput) -> Result<FrameReport, FrameError> {
        let boxes: Vec<BBox> = frame.faces.iter().map(|f| f.bbox).collect();

        let update = self.tracker.update(&boxes, frame.timestamp).map_err(|e| {
            warn!(source = %self.source_id, error = %e, "frame rejected");
            e
        })?;

        for id in &update.dropped_tracks {
            self.states.remove(id);
        }

        let mut faces: BTreeMap<TrackId, FaceSignals> = BTreeMap::new();
        for (detection, &id) in frame.faces.iter().zip(&update.assignments) {
            let signals = self.extract(id, detection, frame);
            faces.insert(id, signals);
        }

        self.snapshot = SourceSnapshot {
            source_id: self.source_id.clone(),
            frame_count: self.snapshot.frame_count + 1,
            last_update: Some(frame.timestamp),
            faces: faces.clone(),
        };

        Ok(FrameReport {
            timestamp: frame.timestamp,
            faces: faces.into_values().collect(),
            new_tracks: update.new_tracks,
            dropped_tracks: update.dropped_tracks,
        })
    }

    fn extract(&mut self, id: TrackId, detection: &FaceDetection, frame: &FrameInput) -> FaceSignals {
        let time = frame.timestamp;
        let bbox = detection.bbox;
        let landmarks = detection.landmarks.as_ref();
        let speed = self.tracker.average_speed(id).unwrap_or(0.0);

        let config = &self.config;
        let state = self
            .states
            .entry(id)
            .or_insert_with(|| TrackState::new(config));

        let (eyes, blinks) = match landmarks.and_then(|lm| state.blink.update(lm, time)) {
            Some((report, blinks)) => (Some(report), blinks),
            None => (None, Vec::new()),
        };

        let quadrants = state.quadrants.analyze(&bbox, landmarks);

        let micro = match &detection.expression {
            Some(expr) => {
                let report = state.micro.observe(&expr.label, expr.confidence, time);
                state.last_micro = Some(report.clone());
                Some(report)
            }
            None => state.last_micro.clone().map(|r| MicroExpressionReport {
                detected: None,
                ..r
            }),
        };

        let (eye_motion, mouth) = state.motion.update(landmarks, &bbox, time);

        FaceSignals {
            track_id: id,
            bbox,
            center: bbox.center(),
            area: bbox.area(),
            speed,
            placement: placement(&bbox, frame.frame_size),
            landmarks: detection.landmarks.clone(),
            geometry: pose::analyze(landmarks, &bbox),
            eyes,
            synchronized_blink_count: state.blink.synchronized_blink_count(),
            blinks,
            quadrants,
            micro,
            eye_motion,
            mouth,
        }
    }

    /// Clear every history and counter of one live track, including what
    /// the snapshot publishes for it. Other tracks are untouched. Returns
    /// false for an unknown id.
    pub fn reset_track(&mut self, id: TrackId) -> bool {
        if !self.tracker.reset_track(id) {
            return false;
        }
        if let Some(state) = self.states.get_mut(&id) {
            state.reset();
        }
        if let Some(face) = self.snapshot.faces.get_mut(&id) {
            face.speed = 0.0;
            face.eyes = None;
            face.synchronized_blink_count = 0;
            face.blinks.clear();
            face.micro = None;
            face.eye_motion = None;
            face.mouth = None;
        }
        debug!(source = %self.source_id, track_id = id, "track reset");
        true
    }

    /// Forget every track. Track ids are never reused afterwards.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.states.clear();
        self.snapshot = SourceSnapshot::new(self.source_id.clone());
        debug!(source = %self.source_id, "session reset");
    }

    /// End the session, returning its final statistics
    pub fn drop_session(self) -> SessionStats {
        debug!(source = %self.source_id, "session dropped");
        self.tracker.stats().clone()
    }

    /// Latest published state
    pub fn snapshot(&self) -> &SourceSnapshot {
        &self.snapshot
    }

    pub fn stats(&self) -> &SessionStats {
        self.tracker.stats()
    }

    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    pub fn track_state(&self, id: TrackId) -> Option<&TrackState> {
        self.states.get(&id)
    }

    pub fn track_ids(&self) -> Vec<TrackId> {
        self.states.keys().copied().collect()
    }

    /// Last eye midpoints of a track, oldest first
    pub fn trajectory(&self, id: TrackId) -> Option<Vec<Point>> {
        self.states.get(&id).map(|s| s.motion.trajectory())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
