//! Identity Tracker: greedy max-IoU matching against the previous frame
//!
//! Rules:
//! - a detection claims the unclaimed previous-frame track with the highest
//!   IoU strictly above the threshold; ties go to the lowest track id
//! - a detection with no candidate starts a new track with a fresh id
//! - a previous-frame track nobody claimed is dropped immediately
//! - ids are never reused, not even after `reset`

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::TrackerConfig;
use crate::core::geometry::iou;
use crate::error::FrameError;
use crate::types::{BBox, FrameSize, Placement, Point, SessionStats, SizeCategory, Track, TrackId};

/// Outcome of one tracker update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackUpdate {
    /// Track id assigned to each detection, in input order
    pub assignments: Vec<TrackId>,
    pub new_tracks: Vec<TrackId>,
    pub dropped_tracks: Vec<TrackId>,
}

#[derive(Debug)]
pub struct IdentityTracker {
    config: TrackerConfig,
    tracks: BTreeMap<TrackId, Track>,
    next_id: TrackId,
    stats: SessionStats,
}

impl Default for IdentityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            tracks: BTreeMap::new(),
            next_id: 0,
            stats: SessionStats::default(),
        }
    }

    /// Check a frame against the inbound contract without touching state
    pub fn validate(&self, boxes: &[BBox], timestamp: f64) -> Result<(), FrameError> {
        if !timestamp.is_finite() {
            return Err(FrameError::NonFiniteTimestamp);
        }
        if let Some(previous) = self.stats.last_timestamp {
            if timestamp < previous {
                return Err(FrameError::NonMonotonicTimestamp {
                    previous,
                    current: timestamp,
                });
            }
        }
        for (index, b) in boxes.iter().enumerate() {
            if ![b.x, b.y, b.w, b.h].iter().all(|v| v.is_finite()) {
                return Err(FrameError::NonFiniteBox { index });
            }
            if b.w < 0.0 || b.h < 0.0 {
                return Err(FrameError::NegativeSize { index, w: b.w, h: b.h });
            }
        }
        Ok(())
    }

    /// Assign identities for one frame
    pub fn update(&mut self, boxes: &[BBox], timestamp: f64) -> Result<TrackUpdate, FrameError> {
        self.validate(boxes, timestamp)?;

        let previous: Vec<TrackId> = self.tracks.keys().copied().collect();
        let mut claimed: BTreeSet<TrackId> = BTreeSet::new();
        let mut update = TrackUpdate::default();

        for bbox in boxes {
            let id = match self.best_match(bbox, &previous, &claimed) {
                Some(id) => {
                    if let Some(track) = self.tracks.get_mut(&id) {
                        track.update(*bbox, timestamp);
                    }
                    id
                }
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.tracks
                        .insert(id, Track::new(id, *bbox, timestamp, self.config.history_len));
                    update.new_tracks.push(id);
                    debug!(track_id = id, x = bbox.x, y = bbox.y, "new track");
                    id
                }
            };
            claimed.insert(id);
            update.assignments.push(id);
        }

        for id in previous {
            if !claimed.contains(&id) {
                self.tracks.remove(&id);
                update.dropped_tracks.push(id);
                debug!(track_id = id, "track dropped");
            }
        }

        self.record_stats(boxes.len(), timestamp);
        Ok(update)
    }

    fn best_match(
        &self,
        bbox: &BBox,
        previous: &[TrackId],
        claimed: &BTreeSet<TrackId>,
    ) -> Option<TrackId> {
        let mut best: Option<(TrackId, f64)> = None;

        // `previous` is ascending, and only a strictly better IoU replaces
        // the incumbent, so ties stay with the lowest id.
        for id in previous {
            if claimed.contains(id) {
                continue;
            }
            let Some(track) = self.tracks.get(id) else {
                continue;
            };
            let overlap = iou(bbox, &track.bbox);
            if overlap <= self.config.min_iou {
                continue;
            }
            if best.map_or(true, |(_, b)| overlap > b) {
                best = Some((*id, overlap));
            }
        }

        best.map(|(id, _)| id)
    }

    fn record_stats(&mut self, count: usize, timestamp: f64) {
        self.stats.frames_processed += 1;
        self.stats.total_faces_detected += count as u64;
        self.stats.unique_faces_seen = self.next_id;
        self.stats.max_faces_simultaneous = self.stats.max_faces_simultaneous.max(count);
        if self.stats.first_timestamp.is_none() {
            self.stats.first_timestamp = Some(timestamp);
        }
        self.stats.last_timestamp = Some(timestamp);
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Live tracks in ascending id order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Average speed of a track over its recent history (px/s)
    pub fn average_speed(&self, id: TrackId) -> Option<f64> {
        self.tracks
            .get(&id)
            .map(|t| t.average_speed(self.config.speed_window))
    }

    /// Clear one track's position history; the identity stays live
    pub fn reset_track(&mut self, id: TrackId) -> bool {
        match self.tracks.get_mut(&id) {
            Some(track) => {
                track.clear_history();
                true
            }
            None => false,
        }
    }

    /// Drop every track and statistic. Ids keep counting up.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.stats = SessionStats {
            unique_faces_seen: self.next_id,
            ..SessionStats::default()
        };
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Id the next new track will receive
    pub fn next_id(&self) -> TrackId {
        self.next_id
    }
}

/// Size category (>5% Close, >2% Medium, else Far) and position percentage
pub fn placement(bbox: &BBox, frame: Option<FrameSize>) -> Placement {
    let Some(frame) = frame else {
        return Placement {
            size: SizeCategory::Unknown,
            position_pct: None,
        };
    };
    let frame_area = frame.width * frame.height;
    if frame_area <= 0.0 || bbox.is_degenerate() {
        return Placement {
            size: SizeCategory::Unknown,
            position_pct: None,
        };
    }

    let size_pct = bbox.area() / frame_area * 100.0;
    let size = if size_pct > 5.0 {
        SizeCategory::Close
    } else if size_pct > 2.0 {
        SizeCategory::Medium
    } else {
        SizeCategory::Far
    };

    let center = bbox.center();
    Placement {
        size,
        position_pct: Some(Point::new(
            center.x / frame.width * 100.0,
            center.y / frame.height * 100.0,
        )),
    }
}
