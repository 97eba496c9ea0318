//! Eye-midpoint and mouth motion tracking
//!
//! Per-track position buffers with saccade / fixation logs for the eyes and
//! opening-ratio state for the mouth. Every buffer is a capped FIFO.

use std::collections::VecDeque;

use crate::core::geometry::{angle_deg, distance, speed};
use crate::types::{
    BBox, EyeMotionReport, Fixation, GazePattern, Landmarks, MouthReport, MouthState, Point,
    Saccade,
};

const POSITION_LEN: usize = 30;
const MOVEMENT_LEN: usize = 20;
const SACCADE_LOG_LEN: usize = 50;
const FIXATION_LOG_LEN: usize = 20;
const TRAJECTORY_LEN: usize = 20;

/// Speeds averaged for reports and patterns
const SPEED_WINDOW: usize = 10;

/// Movements needed before a gaze pattern is classified
const PATTERN_MIN_MOVEMENTS: usize = 5;

/// px/s
const SACCADE_SPEED: f64 = 5.0;
const FIXATION_SPEED: f64 = 1.0;
const FIXATION_RUN: usize = 5;
const MOVING_SPEED: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Movement {
    distance: f64,
    speed: f64,
    angle: f64,
}

fn push_capped<T>(buf: &mut VecDeque<T>, item: T, cap: usize) {
    buf.push_back(item);
    while buf.len() > cap {
        buf.pop_front();
    }
}

fn mean_recent(movements: &VecDeque<Movement>) -> f64 {
    let recent: Vec<f64> = movements
        .iter()
        .skip(movements.len().saturating_sub(SPEED_WINDOW))
        .map(|m| m.speed)
        .collect();
    if recent.is_empty() {
        0.0
    } else {
        recent.iter().sum::<f64>() / recent.len() as f64
    }
}

fn step(from: (Point, f64), to: Point, time: f64) -> Movement {
    Movement {
        distance: distance(from.0, to),
        speed: speed(from.0, to, time - from.1).unwrap_or(0.0),
        angle: angle_deg(to.x - from.0.x, to.y - from.0.y),
    }
}

/// Eye-midpoint motion for one track
#[derive(Debug, Clone, Default)]
pub struct EyeMotionTracker {
    positions: VecDeque<(Point, f64)>,
    movements: VecDeque<Movement>,
    saccades: VecDeque<Saccade>,
    fixations: VecDeque<Fixation>,
    total_distance: f64,
}

impl EyeMotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// None unless both eye centers are present
    pub fn observe(&mut self, landmarks: &Landmarks, time: f64) -> Option<EyeMotionReport> {
        let position = landmarks.eye_midpoint()?;

        if let Some(&prev) = self.positions.back() {
            let movement = step(prev, position, time);
            push_capped(&mut self.movements, movement, MOVEMENT_LEN);
            self.total_distance += movement.distance;

            if movement.speed > SACCADE_SPEED {
                push_capped(
                    &mut self.saccades,
                    Saccade {
                        time,
                        speed: movement.speed,
                        direction: movement.angle,
                    },
                    SACCADE_LOG_LEN,
                );
            }

            let settled = self.movements.len() >= FIXATION_RUN
                && self
                    .movements
                    .iter()
                    .rev()
                    .take(FIXATION_RUN)
                    .all(|m| m.speed < FIXATION_SPEED);
            if settled {
                push_capped(&mut self.fixations, Fixation { position, time }, FIXATION_LOG_LEN);
            }
        }
        push_capped(&mut self.positions, (position, time), POSITION_LEN);

        let average_speed = mean_recent(&self.movements);
        Some(EyeMotionReport {
            position,
            average_speed,
            total_distance: self.total_distance,
            saccade_count: self.saccades.len(),
            fixation_count: self.fixations.len(),
            recent_saccades: self
                .saccades
                .iter()
                .skip(self.saccades.len().saturating_sub(5))
                .copied()
                .collect(),
            pattern: self.pattern(),
            is_moving: average_speed > MOVING_SPEED,
        })
    }

    pub fn pattern(&self) -> GazePattern {
        if self.movements.len() < PATTERN_MIN_MOVEMENTS {
            return GazePattern::Stable;
        }
        match mean_recent(&self.movements) {
            s if s < 1.0 => GazePattern::FixedGaze,
            s if s < 3.0 => GazePattern::SlowTracking,
            s if s < 8.0 => GazePattern::ActiveScanning,
            _ => GazePattern::RapidMovement,
        }
    }

    /// Last eye midpoints, oldest first
    pub fn trajectory(&self) -> Vec<Point> {
        self.positions
            .iter()
            .skip(self.positions.len().saturating_sub(TRAJECTORY_LEN))
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn saccade_count(&self) -> usize {
        self.saccades.len()
    }

    pub fn fixation_count(&self) -> usize {
        self.fixations.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Classify a mouth opening ratio
pub fn mouth_state(opening_ratio: f64) -> MouthState {
    match opening_ratio {
        r if r < 0.15 => MouthState::Closed,
        r if r < 0.25 => MouthState::SlightlyOpen,
        r if r < 0.35 => MouthState::Open,
        r if r < 0.45 => MouthState::WideOpen,
        _ => MouthState::VeryWide,
    }
}

/// Mouth position and opening for one track
#[derive(Debug, Clone, Default)]
pub struct MouthTracker {
    positions: VecDeque<(Point, f64)>,
    openings: VecDeque<f64>,
    movements: VecDeque<Movement>,
    total_movement: f64,
}

impl MouthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// None unless the mouth center is present. A missing corner gives zero
    /// width.
    pub fn observe(&mut self, landmarks: &Landmarks, bbox: &BBox, time: f64) -> Option<MouthReport> {
        let position = landmarks.mouth_center?;
        let width = match (landmarks.mouth_left, landmarks.mouth_right) {
            (Some(l), Some(r)) => distance(l, r),
            _ => 0.0,
        };
        let opening_ratio = if bbox.h > 0.0 { width / bbox.h } else { 0.0 };

        if let Some(&prev) = self.positions.back() {
            let movement = step(prev, position, time);
            push_capped(&mut self.movements, movement, MOVEMENT_LEN);
            self.total_movement += movement.distance;
        }
        push_capped(&mut self.positions, (position, time), POSITION_LEN);
        push_capped(&mut self.openings, opening_ratio, POSITION_LEN);

        let recent: Vec<f64> = self
            .openings
            .iter()
            .skip(self.openings.len().saturating_sub(SPEED_WINDOW))
            .copied()
            .collect();
        let average_opening = recent.iter().sum::<f64>() / recent.len() as f64;

        Some(MouthReport {
            position,
            width,
            opening_ratio,
            average_opening,
            movement_speed: mean_recent(&self.movements),
            total_movement: self.total_movement,
            state: self.state(),
            is_moving: self.movements.back().is_some_and(|m| m.speed > MOVING_SPEED),
        })
    }

    pub fn state(&self) -> MouthState {
        self.openings
            .back()
            .map_or(MouthState::Unknown, |&r| mouth_state(r))
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Eye and mouth motion for one track
#[derive(Debug, Clone, Default)]
pub struct FeatureMotionTracker {
    pub eyes: EyeMotionTracker,
    pub mouth: MouthTracker,
}

impl FeatureMotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        landmarks: Option<&Landmarks>,
        bbox: &BBox,
        time: f64,
    ) -> (Option<EyeMotionReport>, Option<MouthReport>) {
        match landmarks {
            Some(lm) => (self.eyes.observe(lm, time), self.mouth.observe(lm, bbox, time)),
            None => (None, None),
        }
    }

    pub fn trajectory(&self) -> Vec<Point> {
        self.eyes.trajectory()
    }

    pub fn reset(&mut self) {
        self.eyes.reset();
        self.mouth.reset();
    }
}
