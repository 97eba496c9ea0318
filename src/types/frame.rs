//! Inbound contract: what the detector hands over once per frame per source

use serde::{Deserialize, Serialize};

use super::{BBox, Landmarks};

/// Expression label produced outside the core; carried through opaquely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionInput {
    pub label: String,
    pub confidence: f64,
}

impl ExpressionInput {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// One detected face, no identity yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub bbox: BBox,
    #[serde(default)]
    pub landmarks: Option<Landmarks>,
    #[serde(default)]
    pub expression: Option<ExpressionInput>,
}

impl FaceDetection {
    /// Box only, no landmarks or expression
    pub fn from_box(bbox: BBox) -> Self {
        Self {
            bbox,
            landmarks: None,
            expression: None,
        }
    }

    pub fn with_landmarks(mut self, landmarks: Landmarks) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    pub fn with_expression(mut self, label: impl Into<String>, confidence: f64) -> Self {
        self.expression = Some(ExpressionInput::new(label, confidence));
        self
    }
}

/// Frame dimensions, when known, for size/position heuristics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

/// A frame's worth of detections from one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Monotonic timestamp in seconds
    pub timestamp: f64,
    #[serde(default)]
    pub faces: Vec<FaceDetection>,
    #[serde(default)]
    pub frame_size: Option<FrameSize>,
}

impl FrameInput {
    pub fn new(timestamp: f64, faces: Vec<FaceDetection>) -> Self {
        Self {
            timestamp,
            faces,
            frame_size: None,
        }
    }

    pub fn with_frame_size(mut self, width: f64, height: f64) -> Self {
        self.frame_size = Some(FrameSize { width, height });
        self
    }
}
