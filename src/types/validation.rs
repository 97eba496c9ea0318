//! Cross-source validation results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SourceSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    Validated,
    NeedsReview,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validated => write!(f, "Validated"),
            Self::NeedsReview => write!(f, "Needs Review"),
        }
    }
}

/// Per-signal agreement; `None` means the check was not performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalMatches {
    pub expression: Option<bool>,
    pub blinks: Option<bool>,
    pub yaw: Option<bool>,
    pub pitch: Option<bool>,
    pub roll: Option<bool>,
}

impl SignalMatches {
    fn all(&self) -> [Option<bool>; 5] {
        [self.expression, self.blinks, self.yaw, self.pitch, self.roll]
    }

    /// Number of checks actually performed
    pub fn performed(&self) -> usize {
        self.all().iter().filter(|c| c.is_some()).count()
    }

    /// Number of performed checks that agreed
    pub fn matched(&self) -> usize {
        self.all().iter().filter(|c| **c == Some(true)).count()
    }
}

/// Agreement between two sources' latest snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReferenceResult {
    pub source_a: String,
    pub source_b: String,
    pub face_count_match: bool,
    pub matches: SignalMatches,
    /// matched / performed, in [0, 1]
    pub confidence: f64,
    pub status: ValidationStatus,
}

impl CrossReferenceResult {
    pub fn pair_key(&self) -> String {
        format!("{}_vs_{}", self.source_a, self.source_b)
    }

    pub fn involves(&self, source: &str) -> bool {
        self.source_a == source || self.source_b == source
    }
}

/// Cumulative outcome of every validation run so far
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub runs: u64,
    pub total_comparisons: u64,
    pub validated: u64,
    pub needs_review: u64,
    pub average_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub results: Vec<CrossReferenceResult>,
    pub summary: ValidationSummary,
}

/// A source's published faces with the latest confidence of any pair it
/// took part in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedSource {
    pub snapshot: SourceSnapshot,
    pub confidence: f64,
    pub status: Option<ValidationStatus>,
}
