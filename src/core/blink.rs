//! Eye/Blink state machine
//!
//! Per side:
//! - IDLE → IN_PROGRESS: eye goes open → closed (cycle start recorded)
//! - IN_PROGRESS → IDLE: eye reopens; counted only if the closure lasted
//!   within the valid band, otherwise discarded as noise
//!
//! Synchronized (authoritative) count: both sides' cycle starts within the
//! sync tolerance and both closures valid. Correlation is by timestamp, not
//! by sample index, so the two sides never need to advance in lockstep.

use std::collections::VecDeque;
use tracing::{debug, info};

use crate::config::BlinkConfig;
use crate::core::geometry::{compass_direction, distance, speed};
use crate::types::{
    BlinkEvent, BlinkKind, EyeMovement, EyeSample, EyeSide, EyeStatus, EyesReport, Landmarks,
    Point,
};

/// Eye-aspect-ratio proxy: vertical center-to-corner offset over the
/// horizontal center-to-corner offset. Missing corner or zero horizontal
/// offset falls back to the default (open).
pub fn eye_aspect_ratio(center: Point, corner: Option<Point>) -> f64 {
    let Some(corner) = corner else {
        return crate::EAR_DEFAULT;
    };
    let vertical = (center.y - corner.y).abs();
    let horizontal = (center.x - corner.x).abs();
    if horizontal > 0.0 {
        vertical / horizontal
    } else {
        crate::EAR_DEFAULT
    }
}

/// Transient per-side cycle state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlinkCycle {
    Idle,
    InProgress { start: f64 },
}

/// What one observation did to a side's cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleTransition {
    None,
    Started { start: f64 },
    Completed { start: f64, duration: f64, valid: bool },
}

/// One eye's samples and cycle
#[derive(Debug)]
struct EyeChannel {
    side: EyeSide,
    samples: VecDeque<EyeSample>,
    cycle: BlinkCycle,
    individual_blinks: u32,
}

impl EyeChannel {
    fn new(side: EyeSide, capacity: usize) -> Self {
        Self {
            side,
            samples: VecDeque::with_capacity(capacity),
            cycle: BlinkCycle::Idle,
            individual_blinks: 0,
        }
    }

    fn observe(&mut self, sample: EyeSample, config: &BlinkConfig) -> CycleTransition {
        let was_open = self.samples.back().map(|s| s.open);

        self.samples.push_back(sample);
        while self.samples.len() > config.history_len {
            self.samples.pop_front();
        }

        match (was_open, sample.open, self.cycle) {
            (Some(true), false, _) => {
                self.cycle = BlinkCycle::InProgress { start: sample.time };
                CycleTransition::Started { start: sample.time }
            }
            (_, true, BlinkCycle::InProgress { start }) => {
                self.cycle = BlinkCycle::Idle;
                let duration = sample.time - start;
                let valid = config.is_valid_duration(duration);
                if valid {
                    self.individual_blinks += 1;
                    debug!(side = self.side.as_str(), duration, "blink");
                } else {
                    debug!(side = self.side.as_str(), duration, "closure outside blink band");
                }
                CycleTransition::Completed { start, duration, valid }
            }
            _ => CycleTransition::None,
        }
    }

    fn movement(&self) -> EyeMovement {
        let skip = self.samples.len().saturating_sub(crate::EYE_MOVEMENT_WINDOW);
        let recent: Vec<&EyeSample> = self.samples.iter().skip(skip).collect();
        if recent.len() < 2 {
            return EyeMovement::default();
        }

        let mut total_distance = 0.0;
        let mut speeds = Vec::new();
        for pair in recent.windows(2) {
            total_distance += distance(pair[0].position, pair[1].position);
            if let Some(s) = speed(pair[0].position, pair[1].position, pair[1].time - pair[0].time) {
                speeds.push(s);
            }
        }

        let last = recent[recent.len() - 1].position;
        let prev = recent[recent.len() - 2].position;

        EyeMovement {
            speed: if speeds.is_empty() {
                0.0
            } else {
                speeds.iter().sum::<f64>() / speeds.len() as f64
            },
            total_distance,
            direction: compass_direction(last.x - prev.x, last.y - prev.y, 1.0),
        }
    }

    fn status(&self) -> Option<EyeStatus> {
        let last = self.samples.back()?;
        Some(EyeStatus {
            side: self.side,
            position: last.position,
            ear: last.ear,
            open: last.open,
            movement: self.movement(),
            individual_blinks: self.individual_blinks,
        })
    }
}

/// Valid closures kept per side while waiting for a partner
const SYNC_PENDING: usize = 4;

/// One side's valid closures awaiting a partner on the other side, keyed by
/// cycle start. A side may blink again before the other side reopens, so
/// more than one closure can be waiting.
#[derive(Debug, Default, Clone)]
struct SyncSide {
    pending: VecDeque<(f64, f64)>,
}

impl SyncSide {
    fn apply(&mut self, transition: CycleTransition) {
        if let CycleTransition::Completed { start, duration, valid: true } = transition {
            self.pending.push_back((start, duration));
            while self.pending.len() > SYNC_PENDING {
                self.pending.pop_front();
            }
        }
    }

    /// Drop the closure at `index` and everything older
    fn consume(&mut self, index: usize) {
        self.pending.drain(..=index);
    }
}

/// Correlates both sides' cycles into the authoritative blink count
#[derive(Debug, Default)]
pub struct SynchronizedBlinkCounter {
    left: SyncSide,
    right: SyncSide,
    count: u32,
}

impl SynchronizedBlinkCounter {
    /// Feed this frame's transitions; returns a `Both` event when a
    /// synchronized blink completes
    pub fn observe(
        &mut self,
        left: CycleTransition,
        right: CycleTransition,
        tolerance: f64,
    ) -> Option<BlinkEvent> {
        self.left.apply(left);
        self.right.apply(right);

        let (li, ri) = self.left.pending.iter().enumerate().find_map(|(li, &(ls, _))| {
            self.right
                .pending
                .iter()
                .position(|&(rs, _)| (ls - rs).abs() <= tolerance + crate::TIME_EPSILON)
                .map(|ri| (li, ri))
        })?;

        let (ls, ld) = self.left.pending[li];
        let (rs, rd) = self.right.pending[ri];
        self.left.consume(li);
        self.right.consume(ri);

        self.count += 1;
        info!(count = self.count, start = ls.min(rs), "synchronized blink");

        Some(BlinkEvent {
            kind: BlinkKind::Both,
            start: ls.min(rs),
            duration: ld.max(rd),
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Both eyes of one track
#[derive(Debug)]
pub struct EyeBlinkMachine {
    config: BlinkConfig,
    left: EyeChannel,
    right: EyeChannel,
    sync: SynchronizedBlinkCounter,
}

impl Default for EyeBlinkMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl EyeBlinkMachine {
    pub fn new() -> Self {
        Self::with_config(BlinkConfig::default())
    }

    pub fn with_config(config: BlinkConfig) -> Self {
        let capacity = config.history_len;
        Self {
            config,
            left: EyeChannel::new(EyeSide::Left, capacity),
            right: EyeChannel::new(EyeSide::Right, capacity),
            sync: SynchronizedBlinkCounter::default(),
        }
    }

    /// Observe one frame's landmarks. Without both eye centers nothing is
    /// recorded and `None` is returned.
    pub fn update(&mut self, landmarks: &Landmarks, time: f64) -> Option<(EyesReport, Vec<BlinkEvent>)> {
        let (left_eye, right_eye) = landmarks.eyes()?;

        let left_ear = eye_aspect_ratio(left_eye, landmarks.left_eye_corner);
        let right_ear = eye_aspect_ratio(right_eye, landmarks.right_eye_corner);

        Some(self.observe_ears(left_eye, left_ear, right_eye, right_ear, time))
    }

    /// Observe precomputed EARs for both eyes
    pub fn observe_ears(
        &mut self,
        left_position: Point,
        left_ear: f64,
        right_position: Point,
        right_ear: f64,
        time: f64,
    ) -> (EyesReport, Vec<BlinkEvent>) {
        let threshold = self.config.ear_threshold;
        let left = EyeSample {
            position: left_position,
            ear: left_ear,
            open: left_ear > threshold,
            time,
        };
        let right = EyeSample {
            position: right_position,
            ear: right_ear,
            open: right_ear > threshold,
            time,
        };
        self.observe_samples(left, right)
    }

    fn observe_samples(&mut self, left: EyeSample, right: EyeSample) -> (EyesReport, Vec<BlinkEvent>) {
        let lt = self.left.observe(left, &self.config);
        let rt = self.right.observe(right, &self.config);

        let mut events = Vec::new();
        for (kind, transition) in [(BlinkKind::Left, lt), (BlinkKind::Right, rt)] {
            if let CycleTransition::Completed { start, duration, valid: true } = transition {
                events.push(BlinkEvent { kind, start, duration });
            }
        }
        if let Some(both) = self.sync.observe(lt, rt, self.config.sync_tolerance_secs) {
            events.push(both);
        }

        (self.report(left, right), events)
    }

    fn report(&self, left: EyeSample, right: EyeSample) -> EyesReport {
        let fallback = |side: EyeSide, s: EyeSample| EyeStatus {
            side,
            position: s.position,
            ear: s.ear,
            open: s.open,
            movement: EyeMovement::default(),
            individual_blinks: 0,
        };
        EyesReport {
            left: self.left.status().unwrap_or_else(|| fallback(EyeSide::Left, left)),
            right: self.right.status().unwrap_or_else(|| fallback(EyeSide::Right, right)),
            synchronized: left.open == right.open,
            asymmetry: (left.ear - right.ear).abs(),
            synchronized_blink_count: self.sync.count(),
        }
    }

    /// Authoritative blink count
    pub fn synchronized_blink_count(&self) -> u32 {
        self.sync.count()
    }

    pub fn individual_blinks(&self, side: EyeSide) -> u32 {
        match side {
            EyeSide::Left => self.left.individual_blinks,
            EyeSide::Right => self.right.individual_blinks,
        }
    }

    pub fn cycle(&self, side: EyeSide) -> BlinkCycle {
        match side {
            EyeSide::Left => self.left.cycle,
            EyeSide::Right => self.right.cycle,
        }
    }

    pub fn sample_count(&self, side: EyeSide) -> usize {
        match side {
            EyeSide::Left => self.left.samples.len(),
            EyeSide::Right => self.right.samples.len(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::with_config(self.config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OPEN: f64 = 0.35;
    const CLOSED: f64 = 0.1;

    fn frame(machine: &mut EyeBlinkMachine, left: f64, right: f64, t: f64) -> Vec<BlinkEvent> {
        let p = Point::new(0.0, 0.0);
        machine.observe_ears(p, left, p, right, t).1
    }

    #[test]
    fn test_ear_geometry() {
        let ear = eye_aspect_ratio(Point::new(10.0, 10.0), Some(Point::new(0.0, 7.0)));
        assert!((ear - 0.3).abs() < 1e-12);
        assert_eq!(eye_aspect_ratio(Point::new(5.0, 10.0), Some(Point::new(5.0, 0.0))), crate::EAR_DEFAULT);
        assert_eq!(eye_aspect_ratio(Point::new(5.0, 10.0), None), crate::EAR_DEFAULT);
    }

    #[test]
    fn test_individual_blink_counted() {
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, OPEN, OPEN, -0.033);
        frame(&mut m, CLOSED, OPEN, 0.0);
        assert_eq!(m.cycle(EyeSide::Left), BlinkCycle::InProgress { start: 0.0 });
        let events = frame(&mut m, OPEN, OPEN, 0.2);
        assert_eq!(m.individual_blinks(EyeSide::Left), 1);
        assert_eq!(m.cycle(EyeSide::Left), BlinkCycle::Idle);
        assert_eq!(events, vec![BlinkEvent { kind: BlinkKind::Left, start: 0.0, duration: 0.2 }]);
        assert_eq!(m.synchronized_blink_count(), 0);
    }

    #[test]
    fn test_long_closure_discarded() {
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, OPEN, OPEN, -0.033);
        frame(&mut m, CLOSED, OPEN, 0.0);
        let events = frame(&mut m, OPEN, OPEN, 0.9);
        assert!(events.is_empty());
        assert_eq!(m.individual_blinks(EyeSide::Left), 0);
    }

    #[test]
    fn test_too_short_closure_discarded() {
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, OPEN, OPEN, 0.0);
        frame(&mut m, CLOSED, OPEN, 0.01);
        frame(&mut m, OPEN, OPEN, 0.03);
        assert_eq!(m.individual_blinks(EyeSide::Left), 0);
    }

    #[test]
    fn test_first_sample_closed_starts_no_cycle() {
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, CLOSED, CLOSED, 0.0);
        frame(&mut m, OPEN, OPEN, 0.1);
        assert_eq!(m.individual_blinks(EyeSide::Left), 0);
        assert_eq!(m.synchronized_blink_count(), 0);
    }

    #[test]
    fn test_synchronized_blink_within_tolerance() {
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, OPEN, OPEN, 0.95);
        frame(&mut m, CLOSED, OPEN, 1.0);
        frame(&mut m, CLOSED, CLOSED, 1.05);
        frame(&mut m, OPEN, CLOSED, 1.2);
        let events = frame(&mut m, OPEN, OPEN, 1.25);
        assert_eq!(m.synchronized_blink_count(), 1);
        assert!(events.iter().any(|e| e.kind == BlinkKind::Both));
        assert_eq!(m.individual_blinks(EyeSide::Left), 1);
        assert_eq!(m.individual_blinks(EyeSide::Right), 1);
    }

    #[test]
    fn test_synchronized_blink_outside_tolerance() {
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, OPEN, OPEN, 0.95);
        frame(&mut m, CLOSED, OPEN, 1.0);
        frame(&mut m, OPEN, OPEN, 1.15);
        frame(&mut m, OPEN, CLOSED, 1.2);
        frame(&mut m, OPEN, OPEN, 1.35);
        assert_eq!(m.synchronized_blink_count(), 0);
        assert_eq!(m.individual_blinks(EyeSide::Left), 1);
        assert_eq!(m.individual_blinks(EyeSide::Right), 1);
    }

    #[test]
    fn test_synchronized_requires_both_valid() {
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, OPEN, OPEN, 0.0);
        frame(&mut m, CLOSED, CLOSED, 0.1);
        frame(&mut m, OPEN, CLOSED, 0.3);
        frame(&mut m, OPEN, OPEN, 1.0);
        assert_eq!(m.synchronized_blink_count(), 0);
        assert_eq!(m.individual_blinks(EyeSide::Left), 1);
    }

    #[test]
    fn test_counter_with_offset_sampling() {
        // Sides observed independently: the counter correlates by time
        let mut sync = SynchronizedBlinkCounter::default();
        let tol = crate::BLINK_SYNC_TOLERANCE_SECS;
        assert!(sync.observe(CycleTransition::Started { start: 1.0 }, CycleTransition::None, tol).is_none());
        assert!(sync.observe(CycleTransition::None, CycleTransition::Started { start: 1.05 }, tol).is_none());
        assert!(sync
            .observe(CycleTransition::Completed { start: 1.0, duration: 0.2, valid: true }, CycleTransition::None, tol)
            .is_none());
        let event = sync
            .observe(CycleTransition::None, CycleTransition::Completed { start: 1.05, duration: 0.2, valid: true }, tol)
            .unwrap();
        assert_eq!(event.kind, BlinkKind::Both);
        assert_eq!(event.start, 1.0);
        assert_eq!(sync.count(), 1);
    }

    #[test]
    fn test_second_blink_keeps_pending_pair() {
        // Left blinks twice while the right eye is still closed from a
        // closure that began with the left's first one
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, OPEN, OPEN, 0.95);
        frame(&mut m, CLOSED, OPEN, 1.0);
        frame(&mut m, CLOSED, CLOSED, 1.05);
        frame(&mut m, OPEN, CLOSED, 1.2);
        frame(&mut m, CLOSED, CLOSED, 1.3);
        let events = frame(&mut m, CLOSED, OPEN, 1.35);
        let both = events.iter().find(|e| e.kind == BlinkKind::Both).unwrap();
        assert_eq!(both.start, 1.0);
        assert!((both.duration - 0.3).abs() < 1e-9);
        assert_eq!(m.synchronized_blink_count(), 1);
        assert_eq!(m.individual_blinks(EyeSide::Left), 1);
        assert_eq!(m.individual_blinks(EyeSide::Right), 1);

        // The left's second closure has no partner and never counts
        frame(&mut m, OPEN, OPEN, 1.5);
        assert_eq!(m.individual_blinks(EyeSide::Left), 2);
        assert_eq!(m.synchronized_blink_count(), 1);
    }

    #[test]
    fn test_diagnostics() {
        let mut m = EyeBlinkMachine::new();
        let p = Point::new(0.0, 0.0);
        let (report, _) = m.observe_ears(p, 0.35, p, 0.1, 0.0);
        assert!(!report.synchronized);
        assert!((report.asymmetry - 0.25).abs() < 1e-12);
        assert_eq!(report.left.status(), "Open");
        assert_eq!(report.right.status(), "Closed");
    }

    #[test]
    fn test_missing_eyes_skips_update() {
        let mut m = EyeBlinkMachine::new();
        let landmarks = Landmarks {
            left_eye: Some(Point::new(10.0, 10.0)),
            ..Landmarks::default()
        };
        assert!(m.update(&landmarks, 0.0).is_none());
        assert_eq!(m.sample_count(EyeSide::Left), 0);
    }

    #[test]
    fn test_missing_corners_default_open() {
        let mut m = EyeBlinkMachine::new();
        let landmarks = Landmarks {
            left_eye: Some(Point::new(10.0, 10.0)),
            right_eye: Some(Point::new(30.0, 10.0)),
            ..Landmarks::default()
        };
        let (report, _) = m.update(&landmarks, 0.0).unwrap();
        assert_eq!(report.left.ear, crate::EAR_DEFAULT);
        assert!(report.left.open && report.right.open);
    }

    #[test]
    fn test_movement_metrics() {
        let mut m = EyeBlinkMachine::new();
        for i in 0..6 {
            let p = Point::new(i as f64 * 10.0, 0.0);
            m.observe_ears(p, OPEN, p, OPEN, i as f64 * 0.5);
        }
        let p = Point::new(50.0, 0.0);
        let (report, _) = m.observe_ears(p, OPEN, p, OPEN, 3.0);
        // Last five samples: x = 20, 30, 40, 50 (t=2.5), 50 (t=3.0)
        assert_eq!(report.left.movement.direction, crate::types::CompassDirection::Stable);
        assert!((report.left.movement.total_distance - 30.0).abs() < 1e-9);
        // Speeds 20, 20, 20, 0 px/s
        assert!((report.left.movement.speed - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_buffer_capped() {
        let mut m = EyeBlinkMachine::new();
        for i in 0..500 {
            let ear = if i % 3 == 0 { CLOSED } else { OPEN };
            frame(&mut m, ear, ear, i as f64 * 0.033);
        }
        assert_eq!(m.sample_count(EyeSide::Left), crate::EYE_HISTORY_LEN);
        assert_eq!(m.sample_count(EyeSide::Right), crate::EYE_HISTORY_LEN);
    }

    #[test]
    fn test_reset() {
        let mut m = EyeBlinkMachine::new();
        frame(&mut m, OPEN, OPEN, 0.0);
        frame(&mut m, CLOSED, CLOSED, 0.1);
        frame(&mut m, OPEN, OPEN, 0.3);
        assert_eq!(m.synchronized_blink_count(), 1);
        m.reset();
        assert_eq!(m.synchronized_blink_count(), 0);
        assert_eq!(m.sample_count(EyeSide::Left), 0);
    }
}
