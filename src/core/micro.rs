//! Micro-expression detector
//!
//! Keeps one track's expression samples (FIFO, capped) and looks at the
//! last three on every observation for a brief A → B → A reversion.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::MicroConfig;
use crate::types::{
    ExpressionRecord, ExpressionSample, MicroExpressionEvent, MicroExpressionReport, MicroPattern,
};

/// Events reported back in `MicroExpressionReport::recent`
const RECENT_EVENTS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct MicroExpressionDetector {
    config: MicroConfig,
    samples: VecDeque<ExpressionSample>,
    log: VecDeque<MicroExpressionEvent>,
    record: Option<ExpressionRecord>,
}

impl MicroExpressionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MicroConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Record one frame's expression and report on the track's history
    pub fn observe(&mut self, label: &str, confidence: f64, time: f64) -> MicroExpressionReport {
        self.samples.push_back(ExpressionSample {
            label: label.to_string(),
            confidence,
            time,
        });
        while self.samples.len() > self.config.history_len {
            self.samples.pop_front();
        }

        let record = self.update_record(label, confidence, time);

        let detected = self.detect();
        if let Some(event) = &detected {
            debug!(label = %event.label, duration = event.duration, "micro-expression");
            self.log.push_back(event.clone());
            while self.log.len() > self.config.log_len {
                self.log.pop_front();
            }
        }

        MicroExpressionReport {
            detected,
            recent: self
                .log
                .iter()
                .skip(self.log.len().saturating_sub(RECENT_EVENTS))
                .cloned()
                .collect(),
            total_count: self.log.len(),
            pattern: self.pattern(),
            stability: self.stability(),
            record,
        }
    }

    fn update_record(&mut self, label: &str, confidence: f64, time: f64) -> ExpressionRecord {
        let record = match self.record.take() {
            None => ExpressionRecord {
                current_label: label.to_string(),
                confidence,
                duration: 0.0,
                change_count: 0,
                since: time,
            },
            Some(prev) if prev.current_label != label => ExpressionRecord {
                current_label: label.to_string(),
                confidence,
                duration: 0.0,
                change_count: prev.change_count + 1,
                since: time,
            },
            Some(prev) => ExpressionRecord {
                confidence: prev.confidence.max(confidence),
                duration: time - prev.since,
                ..prev
            },
        };
        self.record = Some(record.clone());
        record
    }

    /// A → B → A with B shown for less than the max span. Both the A → B and
    /// B → A gaps must be under it; the event's duration is B's span.
    fn detect(&self) -> Option<MicroExpressionEvent> {
        let n = self.samples.len();
        if n < 3 {
            return None;
        }
        let a = &self.samples[n - 3];
        let b = &self.samples[n - 2];
        let c = &self.samples[n - 1];

        if a.label == b.label || c.label != a.label {
            return None;
        }

        let onset = b.time - a.time;
        let span = c.time - b.time;
        let max = self.config.max_span_secs;
        if onset >= max || span >= max {
            return None;
        }

        Some(MicroExpressionEvent {
            label: b.label.clone(),
            duration: span,
            confidence: b.confidence,
            time: b.time,
        })
    }

    /// 1 - unique / count over the last window samples; 1.0 while warming up
    pub fn stability(&self) -> f64 {
        if self.samples.len() < crate::STABILITY_MIN_SAMPLES {
            return 1.0;
        }
        let window: Vec<&str> = self
            .samples
            .iter()
            .skip(self.samples.len().saturating_sub(self.config.stability_window))
            .map(|s| s.label.as_str())
            .collect();

        let mut unique: Vec<&str> = Vec::new();
        for &label in &window {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        1.0 - unique.len() as f64 / window.len() as f64
    }

    pub fn pattern(&self) -> MicroPattern {
        if self.log.is_empty() {
            return MicroPattern::None;
        }
        let recent: Vec<&MicroExpressionEvent> = self
            .log
            .iter()
            .skip(self.log.len().saturating_sub(crate::PATTERN_WINDOW))
            .collect();

        // (label, count) in first-seen order; ties keep the earliest label
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for event in &recent {
            match counts.iter().position(|(l, _)| *l == event.label) {
                Some(i) => counts[i].1 += 1,
                None => counts.push((event.label.as_str(), 1)),
            }
        }
        let top = counts
            .iter()
            .fold(None::<(&str, usize)>, |best, &(l, c)| match best {
                Some((_, bc)) if bc >= c => best,
                _ => Some((l, c)),
            });

        match top {
            Some((label, count)) if count >= crate::PATTERN_FREQUENT_MIN => {
                MicroPattern::Frequent(label.to_string())
            }
            _ if recent.len() >= crate::PATTERN_MULTIPLE_MIN => MicroPattern::Multiple,
            _ => MicroPattern::Occasional,
        }
    }

    pub fn record(&self) -> Option<&ExpressionRecord> {
        self.record.as_ref()
    }

    pub fn samples(&self) -> impl Iterator<Item = &ExpressionSample> {
        self.samples.iter()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn events(&self) -> impl Iterator<Item = &MicroExpressionEvent> {
        self.log.iter()
    }

    pub fn event_count(&self) -> usize {
        self.log.len()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.log.clear();
        self.record = None;
    }
}
