//! Outcome tracking for reviewed reports.
//!
//! The tracker is a plain struct mutated through `&mut self`. Callers that
//! share one across tasks must serialise access themselves.

use serde::{Deserialize, Serialize};

use crate::report::{AnalysisReport, ReportSource};

const DECILES: usize = 10;

/// Observed accuracy for reports whose confidence fell in `[lower, upper]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationBucket {
    pub lower: u8,
    pub upper: u8,
    pub count: usize,
    pub mean_confidence: f64,
    pub observed_accuracy: f64,
}

/// Running totals for one slice of the reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    count: usize,
    correct: usize,
    confidence_sum: u64,
}

impl Tally {
    fn add(&mut self, confidence: u8, correct: bool) {
        self.count += 1;
        self.correct += usize::from(correct);
        self.confidence_sum += u64::from(confidence);
    }

    fn accuracy(&self) -> Option<f64> {
        (self.count > 0).then(|| self.correct as f64 / self.count as f64)
    }
}

/// Fixed-size aggregates: memory does not grow with the number of reviews.
#[derive(Debug, Clone, Default)]
pub struct LearningTracker {
    overall: Tally,
    backend: Tally,
    deterministic: Tally,
    deciles: [Tally; DECILES],
}

impl LearningTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a clinician's verdict on a report. Failed reports carry no
    /// prediction and are skipped; returns whether the review was recorded.
    pub fn record(&mut self, report: &AnalysisReport, correct: bool) -> bool {
        if !report.success {
            return false;
        }
        let confidence = report.confidence.min(100);
        self.overall.add(confidence, correct);
        self.by_source_mut(report.source).add(confidence, correct);
        self.deciles[decile_of(confidence)].add(confidence, correct);
        true
    }

    pub fn total(&self) -> usize {
        self.overall.count
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.overall.accuracy()
    }

    pub fn accuracy_for(&self, source: ReportSource) -> Option<f64> {
        match source {
            ReportSource::Backend => self.backend.accuracy(),
            ReportSource::Deterministic => self.deterministic.accuracy(),
        }
    }

    /// Deciles of confidence (0-9, 10-19, ... 90-100) that hold at least one
    /// review, in ascending order.
    pub fn calibration(&self) -> Vec<CalibrationBucket> {
        self.deciles
            .iter()
            .enumerate()
            .filter(|(_, tally)| tally.count > 0)
            .map(|(decile, tally)| {
                let lower = decile as u8 * 10;
                let upper = if decile == DECILES - 1 { 100 } else { lower + 9 };
                CalibrationBucket {
                    lower,
                    upper,
                    count: tally.count,
                    mean_confidence: tally.confidence_sum as f64 / tally.count as f64,
                    observed_accuracy: tally.correct as f64 / tally.count as f64,
                }
            })
            .collect()
    }

    fn by_source_mut(&mut self, source: ReportSource) -> &mut Tally {
        match source {
            ReportSource::Backend => &mut self.backend,
            ReportSource::Deterministic => &mut self.deterministic,
        }
    }
}

fn decile_of(confidence: u8) -> usize {
    usize::from(confidence / 10).min(DECILES - 1)
}
