//! Core types for facesignal

mod geometry;
mod landmarks;
mod frame;
mod track;
mod eyes;
mod pose;
mod quadrant;
mod expression;
mod motion;
mod signals;
mod validation;

pub use geometry::{Point, BBox, CompassDirection};
pub use landmarks::Landmarks;
pub use frame::{FaceDetection, ExpressionInput, FrameInput, FrameSize};
pub use track::{Track, TrackId, PositionSample, SizeCategory, Placement, SessionStats};
pub use eyes::{EyeSide, EyeSample, EyeMovement, EyeStatus, EyesReport, BlinkKind, BlinkEvent};
pub use pose::{GazeDirection, GazeEstimate, AxisDirection, Tilt, HeadPose, ActionUnits, FaceGeometry};
pub use quadrant::{QuadrantName, Quadrant, QuadrantSet, QuadrantMotion, QuadrantReport};
pub use expression::{ExpressionSample, ExpressionRecord, MicroExpressionEvent, MicroPattern, MicroExpressionReport};
pub use motion::{GazePattern, Saccade, Fixation, EyeMotionReport, MouthState, MouthReport};
pub use signals::{FaceSignals, FrameReport, SourceSnapshot};
pub use validation::{
    ValidationStatus, SignalMatches, CrossReferenceResult, ValidationSummary, ValidationReport,
    ValidatedSource,
};
