//! Expression history and micro-expression events

use serde::{Deserialize, Serialize};

/// One per-frame expression observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionSample {
    pub label: String,
    pub confidence: f64,
    pub time: f64,
}

/// Running summary of a track's expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionRecord {
    pub current_label: String,
    pub confidence: f64,
    /// Seconds since the label last changed
    pub duration: f64,
    pub change_count: u32,
    /// When the current label started
    pub since: f64,
}

/// A brief reversion A → B → A; carries B
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroExpressionEvent {
    pub label: String,
    /// How long B was shown (seconds)
    pub duration: f64,
    pub confidence: f64,
    /// When B was first observed
    pub time: f64,
}

/// Coarse description of recent micro-expression activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label")]
pub enum MicroPattern {
    None,
    Frequent(String),
    Multiple,
    Occasional,
}

impl std::fmt::Display for MicroPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "No micro-expressions detected"),
            Self::Frequent(label) => write!(f, "Frequent {} micro-expressions", label),
            Self::Multiple => write!(f, "Multiple micro-expressions detected"),
            Self::Occasional => write!(f, "Occasional micro-expressions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroExpressionReport {
    /// Emitted on this frame
    pub detected: Option<MicroExpressionEvent>,
    /// Last few logged events, oldest first
    pub recent: Vec<MicroExpressionEvent>,
    pub total_count: usize,
    pub pattern: MicroPattern,
    /// 1.0 = perfectly stable
    pub stability: f64,
    pub record: ExpressionRecord,
}
