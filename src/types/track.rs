//! Track model: one persistent identity per physical face
//!
//! - id is monotonically increasing and never reused
//! - position history is a strict FIFO capped at the tracker's history length
//! - a track lives only while it is matched every frame

use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

use super::{BBox, Point};

/// Track identity
pub type TrackId = u64;

/// One entry of a track's position history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub center: Point,
    pub area: f64,
    pub timestamp: f64,
}

/// A live track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub bbox: BBox,
    pub center: Point,
    pub area: f64,
    history: VecDeque<PositionSample>,
    history_len: usize,
}

impl Track {
    /// Create a track from its first detection
    pub fn new(id: TrackId, bbox: BBox, timestamp: f64, history_len: usize) -> Self {
        let mut track = Self {
            id,
            bbox,
            center: bbox.center(),
            area: bbox.area(),
            history: VecDeque::with_capacity(history_len),
            history_len,
        };
        track.record(timestamp);
        track
    }

    /// Move the track to a newly matched box
    pub fn update(&mut self, bbox: BBox, timestamp: f64) {
        self.bbox = bbox;
        self.center = bbox.center();
        self.area = bbox.area();
        self.record(timestamp);
    }

    fn record(&mut self, timestamp: f64) {
        self.history.push_back(PositionSample {
            center: self.center,
            area: self.area,
            timestamp,
        });
        while self.history.len() > self.history_len {
            self.history.pop_front();
        }
    }

    /// Position history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &PositionSample> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Average speed (px/s) over the most recent `window` deltas.
    /// Zero-duration deltas are skipped; no usable delta gives 0.
    pub fn average_speed(&self, window: usize) -> f64 {
        let skip = self.history.len().saturating_sub(window + 1);
        let recent: Vec<_> = self.history.iter().skip(skip).collect();

        let speeds: Vec<f64> = recent
            .windows(2)
            .filter_map(|pair| {
                crate::core::geometry::speed(
                    pair[0].center,
                    pair[1].center,
                    pair[1].timestamp - pair[0].timestamp,
                )
            })
            .collect();

        if speeds.is_empty() {
            0.0
        } else {
            speeds.iter().sum::<f64>() / speeds.len() as f64
        }
    }
}

/// How much of the frame a face covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeCategory {
    Close,
    Medium,
    Far,
    Unknown,
}

/// Face placement relative to the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub size: SizeCategory,
    /// Center as a percentage of frame width/height
    pub position_pct: Option<Point>,
}

/// Session-wide detection statistics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub frames_processed: u64,
    pub total_faces_detected: u64,
    pub unique_faces_seen: u64,
    pub max_faces_simultaneous: usize,
    pub first_timestamp: Option<f64>,
    pub last_timestamp: Option<f64>,
}

impl SessionStats {
    pub fn session_duration(&self) -> f64 {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => (last - first).max(0.0),
            _ => 0.0,
        }
    }

    pub fn avg_faces_per_second(&self) -> f64 {
        let duration = self.session_duration();
        if duration > 0.0 {
            self.total_faces_detected as f64 / duration
        } else {
            0.0
        }
    }
}
