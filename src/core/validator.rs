//! Cross-source validation
//!
//! `SourceHub` holds one published snapshot slot per source, each behind its
//! own mutex. Readers copy a slot and release it before comparing, and no
//! two source locks are ever held at the same time.
//!
//! `CrossSourceValidator` compares every unordered pair of sources using one
//! representative face per source (the lowest live track id). Faces are not
//! matched across sources, so results are only meaningful when each source
//! sees the same single person.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info};

use crate::config::ValidationConfig;
use crate::error::FacesignalError;
use crate::types::{
    CrossReferenceResult, FaceSignals, SignalMatches, SourceSnapshot, ValidatedSource,
    ValidationReport, ValidationStatus, ValidationSummary,
};

type Slot = Arc<Mutex<SourceSnapshot>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Latest published snapshot per source
#[derive(Debug, Default)]
pub struct SourceHub {
    sources: Mutex<BTreeMap<String, Slot>>,
}

impl SourceHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the source was already registered
    pub fn register_source(&self, source_id: &str) -> bool {
        let mut sources = lock(&self.sources);
        if sources.contains_key(source_id) {
            return false;
        }
        sources.insert(
            source_id.to_string(),
            Arc::new(Mutex::new(SourceSnapshot::new(source_id))),
        );
        debug!(source = source_id, "source registered");
        true
    }

    fn slot(&self, source_id: &str) -> Option<Slot> {
        lock(&self.sources).get(source_id).cloned()
    }

    /// Replace a source's published snapshot
    pub fn publish(&self, snapshot: SourceSnapshot) -> Result<(), FacesignalError> {
        let slot = self
            .slot(&snapshot.source_id)
            .ok_or_else(|| FacesignalError::UnknownSource(snapshot.source_id.clone()))?;
        *lock(&slot) = snapshot;
        Ok(())
    }

    /// Copy of a source's latest snapshot
    pub fn snapshot(&self, source_id: &str) -> Option<SourceSnapshot> {
        let slot = self.slot(source_id)?;
        let copy = lock(&slot).clone();
        Some(copy)
    }

    /// Empty a source's slot; other sources are untouched
    pub fn reset_source(&self, source_id: &str) -> Result<(), FacesignalError> {
        let slot = self
            .slot(source_id)
            .ok_or_else(|| FacesignalError::UnknownSource(source_id.to_string()))?;
        *lock(&slot) = SourceSnapshot::new(source_id);
        debug!(source = source_id, "source reset");
        Ok(())
    }

    pub fn remove_source(&self, source_id: &str) -> bool {
        lock(&self.sources).remove(source_id).is_some()
    }

    /// Registered sources in ascending order
    pub fn source_ids(&self) -> Vec<String> {
        lock(&self.sources).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.sources).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn within(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Per-signal agreement of two representative faces. A check is skipped
/// when either side lacks the data it needs; the blink count is always
/// available.
pub fn compare_faces(a: &FaceSignals, b: &FaceSignals, config: &ValidationConfig) -> SignalMatches {
    let expression = match (a.expression_label(), b.expression_label()) {
        (Some(la), Some(lb)) => Some(la == lb),
        _ => None,
    };

    let blinks = Some(
        a.synchronized_blink_count
            .abs_diff(b.synchronized_blink_count)
            <= config.blink_tolerance,
    );

    let has_eyes = |f: &FaceSignals| f.landmarks.as_ref().and_then(|l| l.eyes()).is_some();
    let has_pitch = |f: &FaceSignals| {
        f.landmarks
            .as_ref()
            .is_some_and(|l| l.nose_tip.is_some() && l.forehead.is_some())
    };

    let (pa, pb) = (&a.geometry.head_pose, &b.geometry.head_pose);
    let tol = config.pose_tolerance_deg;
    let eyes_both = has_eyes(a) && has_eyes(b);

    SignalMatches {
        expression,
        blinks,
        yaw: eyes_both.then(|| within(pa.yaw, pb.yaw, tol)),
        pitch: (has_pitch(a) && has_pitch(b)).then(|| within(pa.pitch, pb.pitch, tol)),
        roll: eyes_both.then(|| within(pa.roll, pb.roll, tol)),
    }
}

/// Compare two snapshots
pub fn cross_reference(
    a: &SourceSnapshot,
    b: &SourceSnapshot,
    config: &ValidationConfig,
) -> CrossReferenceResult {
    let matches = match (a.representative(), b.representative()) {
        (Some(fa), Some(fb)) => compare_faces(fa, fb, config),
        _ => SignalMatches::default(),
    };

    let performed = matches.performed();
    let confidence = if performed == 0 {
        crate::VALIDATION_NO_DATA_CONFIDENCE
    } else {
        matches.matched() as f64 / performed as f64
    };
    let status = if performed > 0 && confidence > config.confidence_threshold {
        ValidationStatus::Validated
    } else {
        ValidationStatus::NeedsReview
    };

    CrossReferenceResult {
        source_a: a.source_id.clone(),
        source_b: b.source_id.clone(),
        face_count_match: a.faces.len() == b.faces.len(),
        matches,
        confidence,
        status,
    }
}

#[derive(Debug, Default)]
pub struct CrossSourceValidator {
    config: ValidationConfig,
    summary: ValidationSummary,
    confidence_sum: f64,
    latest: Vec<CrossReferenceResult>,
}

impl CrossSourceValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Compare every unordered pair of registered sources
    pub fn validate(&mut self, hub: &SourceHub) -> ValidationReport {
        let ids = hub.source_ids();
        let mut results = Vec::new();

        for (i, id_a) in ids.iter().enumerate() {
            for id_b in &ids[i + 1..] {
                // Sequential copies; one source lock at a time
                let Some(a) = hub.snapshot(id_a) else { continue };
                let Some(b) = hub.snapshot(id_b) else { continue };

                let result = cross_reference(&a, &b, &self.config);
                info!(
                    pair = %result.pair_key(),
                    confidence = result.confidence,
                    status = %result.status,
                    "cross-reference"
                );
                results.push(result);
            }
        }

        self.record(&results);
        self.latest = results.clone();

        ValidationReport {
            generated_at: Utc::now(),
            results,
            summary: self.summary.clone(),
        }
    }

    fn record(&mut self, results: &[CrossReferenceResult]) {
        self.summary.runs += 1;
        for result in results {
            self.summary.total_comparisons += 1;
            self.confidence_sum += result.confidence;
            match result.status {
                ValidationStatus::Validated => self.summary.validated += 1,
                ValidationStatus::NeedsReview => self.summary.needs_review += 1,
            }
        }
        if self.summary.total_comparisons > 0 {
            self.summary.average_confidence =
                self.confidence_sum / self.summary.total_comparisons as f64;
        }
    }

    /// A source's snapshot with the confidence of the first pair involving it
    /// in the latest run
    pub fn validated_faces(
        &self,
        hub: &SourceHub,
        source_id: &str,
    ) -> Result<ValidatedSource, FacesignalError> {
        let snapshot = hub
            .snapshot(source_id)
            .ok_or_else(|| FacesignalError::UnknownSource(source_id.to_string()))?;

        let result = self.latest.iter().find(|r| r.involves(source_id));
        Ok(ValidatedSource {
            snapshot,
            confidence: result.map_or(crate::VALIDATION_NO_DATA_CONFIDENCE, |r| r.confidence),
            status: result.map(|r| r.status),
        })
    }

    pub fn summary(&self) -> &ValidationSummary {
        &self.summary
    }

    /// Results of the most recent run
    pub fn latest(&self) -> &[CrossReferenceResult] {
        &self.latest
    }

    pub fn reset(&mut self) {
        self.summary = ValidationSummary::default();
        self.confidence_sum = 0.0;
        self.latest.clear();
    }
}
