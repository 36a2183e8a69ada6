//! Deterministic scoring: folds a [`SignalSet`] into severity, urgency and a
//! heuristic confidence.
//!
//! `score` is a pure function. The same signal set always yields the same
//! [`ScoringResult`].

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::signals::{OrganSystem, SignalKind, SignalSet, Tier};

/// Multiplier applied to the accumulated evidence before clamping.
pub const CONFIDENCE_MULTIPLIER: f64 = 1.2;
/// Upper bound of deterministic confidence.
pub const CONFIDENCE_CEILING: u8 = 98;
pub const MULTI_SYSTEM_BONUS: u32 = 10;
pub const CROSS_VALIDATION_BONUS: u32 = 10;
pub const COMPLETENESS_BONUS: u32 = 10;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Routine,
    Urgent,
    Emergency,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Routine => "routine",
            Urgency::Urgent => "urgent",
            Urgency::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One itemised addition to the confidence total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub label: String,
    pub weight: u32,
}

/// Single accumulator for confidence arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceLedger {
    contributions: Vec<Contribution>,
}

impl ConfidenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: impl Into<String>, weight: u32) {
        self.contributions.push(Contribution {
            label: label.into(),
            weight,
        });
    }

    pub fn total(&self) -> u32 {
        self.contributions.iter().map(|c| c.weight).sum()
    }

    /// `round(total × 1.2)` clamped to `[0, 98]`.
    pub fn confidence(&self) -> u8 {
        let scaled = (f64::from(self.total()) * CONFIDENCE_MULTIPLIER).round();
        scaled.clamp(0.0, f64::from(CONFIDENCE_CEILING)) as u8
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn into_contributions(self) -> Vec<Contribution> {
        self.contributions
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Deduplicated, in first-seen order.
    pub conditions: Vec<Condition>,
    pub severity: Severity,
    pub urgency: Urgency,
    /// 0..=98
    pub confidence: u8,
    pub reasoning: Vec<String>,
    pub contributions: Vec<Contribution>,
}

impl ScoringResult {
    pub fn has(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }
}

/// Fold signals into a [`ScoringResult`].
pub fn score(set: &SignalSet) -> ScoringResult {
    if set.is_empty() {
        return ScoringResult::default();
    }

    let mut result = ScoringResult::default();
    let mut ledger = ConfidenceLedger::new();

    for signal in &set.signals {
        result.severity = result.severity.max(signal.severity);
        result.urgency = result.urgency.max(signal.tier.urgency_floor());
        ledger.add(signal.label.clone(), signal.weight);
        result.reasoning.push(signal.label.clone());

        if let Some(condition) = signal.condition {
            if !result.conditions.contains(&condition) {
                result.conditions.push(condition);
            }
        }
    }

    let corroborating: BTreeSet<OrganSystem> = set
        .signals
        .iter()
        .filter(|s| s.system.is_specific() && s.tier.is_significant())
        .map(|s| s.system)
        .collect();
    if corroborating.len() >= 2 {
        let systems = corroborating
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let label = format!("Corroborating findings across systems: {}", systems);
        ledger.add(label.clone(), MULTI_SYSTEM_BONUS);
        result.reasoning.push(label);
    }

    let cardiac_complaint = set
        .signals
        .iter()
        .any(|s| s.system == OrganSystem::Cardiovascular && s.tier == Tier::Symptom);
    let objective_cardiac = set.signals.iter().any(|s| {
        s.kind == SignalKind::Vital
            && s.condition
                .is_some_and(|c| c.is_hypertension() || c == Condition::Tachycardia)
    });
    if cardiac_complaint && objective_cardiac {
        let label = "Chest complaint corroborated by abnormal blood pressure or heart rate";
        ledger.add(label, CROSS_VALIDATION_BONUS);
        result.reasoning.push(label.to_string());
    }

    if set.completeness.is_complete() {
        let label = "Complete core vitals (blood pressure, heart rate, oxygen saturation)";
        ledger.add(label, COMPLETENESS_BONUS);
        result.reasoning.push(label.to_string());
    }

    result.confidence = ledger.confidence();
    result.contributions = ledger.into_contributions();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{PatientCase, Vitals};
    use crate::signals::{Completeness, Signal, SignalExtractor};

    fn extract(case: &PatientCase) -> SignalSet {
        SignalExtractor::default().extract(case)
    }

    #[test]
    fn empty_case_scores_normal() {
        let result = score(&extract(&PatientCase::default()));
        assert!(result.conditions.is_empty());
        assert_eq!(result.severity, Severity::Normal);
        assert_eq!(result.urgency, Urgency::Routine);
        assert_eq!(result.confidence, 0);
        assert!(result.reasoning.is_empty());
    }

    #[test]
    fn hypertensive_crisis_example() {
        let case = PatientCase {
            vitals: Vitals {
                blood_pressure: Some("185/125".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = score(&extract(&case));
        assert_eq!(result.conditions, vec![Condition::HypertensiveCrisis]);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.urgency, Urgency::Emergency);
        // 30 * 1.2
        assert_eq!(result.confidence, 36);
    }

    #[test]
    fn cross_validation_and_completeness_bonuses() {
        let case = PatientCase {
            chief_complaint: Some("chest pressure".into()),
            vitals: Vitals {
                blood_pressure: Some("150/95".into()),
                heart_rate: Some("88".into()),
                oxygen_saturation: Some("97".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = score(&extract(&case));
        // symptom 5 + stage 2 (urgent) 20 + multi-system? no (one system)
        // + cross validation 10 + completeness 10 = 45 -> 54
        assert_eq!(result.confidence, 54);
        assert_eq!(result.severity, Severity::Severe);
        assert_eq!(result.urgency, Urgency::Urgent);
        assert!(result.has(Condition::ChestPain));
        assert!(result.has(Condition::HypertensionStage2));
        assert_eq!(result.contributions.len(), 4);
    }

    #[test]
    fn multi_system_bonus_requires_two_specific_systems() {
        let case = PatientCase {
            chief_complaint: Some("chest pain and shortness of breath".into()),
            ..Default::default()
        };
        let result = score(&extract(&case));
        // cardiac symptom 5 + respiratory urgent 20 + multi-system 10 = 35 -> 42
        assert_eq!(result.confidence, 42);

        let generic_only = PatientCase {
            chief_complaint: Some("chest pain with fever".into()),
            ..Default::default()
        };
        let result = score(&extract(&generic_only));
        // cardiac symptom 5 + generic fever 5, no bonus -> 12
        assert_eq!(result.confidence, 12);
    }

    #[test]
    fn confidence_is_clamped() {
        let mut set = SignalSet::default();
        for _ in 0..10 {
            set.push(Signal::keyword(
                OrganSystem::Neurological,
                Tier::Emergency,
                Condition::NeurologicalEmergency,
                "stroke",
            ));
        }
        let result = score(&set);
        assert_eq!(result.confidence, CONFIDENCE_CEILING);
        assert_eq!(result.conditions, vec![Condition::NeurologicalEmergency]);
    }

    #[test]
    fn severity_never_downgrades_within_a_fold() {
        let mut set = SignalSet::new(Vec::new(), Completeness::default());
        set.push(Signal::keyword(
            OrganSystem::Cardiovascular,
            Tier::Emergency,
            Condition::CardiacEmergency,
            "heart attack",
        ));
        set.push(Signal::keyword(
            OrganSystem::Gastrointestinal,
            Tier::Routine,
            Condition::Gastrointestinal,
            "nausea",
        ));
        let result = score(&set);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.urgency, Urgency::Emergency);
    }

    #[test]
    fn ledger_rounding() {
        let mut ledger = ConfidenceLedger::new();
        ledger.add("a", 5);
        ledger.add("b", 10);
        ledger.add("c", 10);
        // 25 * 1.2 = 30
        assert_eq!(ledger.confidence(), 30);
        ledger.add("d", 3);
        // 28 * 1.2 = 33.6
        assert_eq!(ledger.confidence(), 34);
        assert_eq!(ConfidenceLedger::new().confidence(), 0);
    }
}
