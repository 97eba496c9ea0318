//! Core engines for facesignal

pub mod geometry;
pub mod tracker;
pub mod blink;
pub mod pose;
pub mod quadrant;
pub mod micro;
pub mod motion;
pub mod session;
pub mod validator;

pub use geometry::{iou, distance, speed, angle_deg, compass_direction};
pub use tracker::{IdentityTracker, TrackUpdate, placement};
pub use blink::{EyeBlinkMachine, SynchronizedBlinkCounter, BlinkCycle, CycleTransition, eye_aspect_ratio};
pub use quadrant::{QuadrantAnalyzer, partition};
pub use micro::MicroExpressionDetector;
pub use motion::{EyeMotionTracker, MouthTracker, FeatureMotionTracker};
pub use session::{TrackingSession, TrackState, create_session};
pub use validator::{SourceHub, CrossSourceValidator, cross_reference, compare_faces};
