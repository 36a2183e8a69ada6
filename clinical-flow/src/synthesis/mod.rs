//! Recommendation synthesis from condition tags.
//!
//! Protocol blocks are evaluated independently, in order, and their output is
//! concatenated. Synthesis never fails and always yields at least one
//! medication.

pub mod protocols;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::case::{PatientCase, Sex};
use crate::condition::Condition;
use crate::scoring::Severity;

pub use protocols::{PROTOCOLS, Protocol};

/// A single medication suggestion. Rationale and at least one alternative are
/// always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecommendation {
    pub drug_name: String,
    pub category: String,
    pub dose: String,
    pub route: String,
    pub frequency: String,
    pub rationale: String,
    pub precautions: Vec<String>,
    pub alternatives: Vec<String>,
}

impl TreatmentRecommendation {
    pub fn new(drug_name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            drug_name: drug_name.into(),
            category: category.into(),
            dose: String::new(),
            route: "Oral".to_string(),
            frequency: String::new(),
            rationale: String::new(),
            precautions: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    pub fn dose(mut self, dose: impl Into<String>) -> Self {
        self.dose = dose.into();
        self
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = frequency.into();
        self
    }

    pub fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn precaution(mut self, precaution: impl Into<String>) -> Self {
        self.precautions.push(precaution.into());
        self
    }

    pub fn alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    pub fn is_documented(&self) -> bool {
        !self.rationale.trim().is_empty() && !self.alternatives.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis {
    pub recommendations: Vec<String>,
    pub medications: Vec<TreatmentRecommendation>,
    pub monitoring: Vec<String>,
    pub follow_up: String,
}

/// Patient attributes the protocol blocks may gate on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatientProfile {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub weight_kg: Option<f64>,
    pub smoking: bool,
    pub alcohol: bool,
}

impl PatientProfile {
    pub fn is_older_adult(&self) -> bool {
        self.age.is_some_and(|a| a >= 65)
    }

    pub fn is_child(&self) -> bool {
        self.age.is_some_and(|a| a < 12)
    }

    pub fn could_be_pregnant(&self) -> bool {
        self.sex == Some(Sex::Female) && self.age.is_none_or(|a| (12..=50).contains(&a))
    }
}

impl From<&PatientCase> for PatientProfile {
    fn from(case: &PatientCase) -> Self {
        Self {
            age: case.age,
            sex: case.sex,
            weight_kg: case.weight_kg,
            smoking: case.social_history.smoking,
            alcohol: case.social_history.alcohol,
        }
    }
}

/// What a protocol block sees.
pub struct ProtocolInput<'a> {
    pub conditions: &'a [Condition],
    pub severity: Severity,
    pub patient: &'a PatientProfile,
}

impl ProtocolInput<'_> {
    pub fn has(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    pub fn has_any(&self, conditions: &[Condition]) -> bool {
        conditions.iter().any(|c| self.has(*c))
    }
}

/// Accumulates block output. Free-text lists are deduplicated on insert;
/// medications are not.
#[derive(Debug, Default)]
pub struct TreatmentPlan {
    recommendations: Vec<String>,
    medications: Vec<TreatmentRecommendation>,
    monitoring: Vec<String>,
}

impl TreatmentPlan {
    pub fn recommend(&mut self, text: impl Into<String>) {
        push_unique(&mut self.recommendations, text.into());
    }

    pub fn medicate(&mut self, medication: TreatmentRecommendation) {
        self.medications.push(medication);
    }

    pub fn monitor(&mut self, text: impl Into<String>) {
        push_unique(&mut self.monitoring, text.into());
    }

    pub fn has_medications(&self) -> bool {
        !self.medications.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, text: String) {
    if !list.iter().any(|existing| existing.eq_ignore_ascii_case(&text)) {
        list.push(text);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(
        &self,
        conditions: &[Condition],
        severity: Severity,
        patient: &PatientProfile,
    ) -> Synthesis {
        let input = ProtocolInput {
            conditions,
            severity,
            patient,
        };
        let mut plan = TreatmentPlan::default();

        for protocol in PROTOCOLS {
            if (protocol.applies)(&input) {
                debug!(protocol = protocol.name, "Applying protocol block");
                (protocol.apply)(&input, &mut plan);
            }
        }

        if !plan.has_medications() {
            protocols::supportive_care(&input, &mut plan);
        }

        Synthesis {
            recommendations: plan.recommendations,
            medications: plan.medications,
            monitoring: plan.monitoring,
            follow_up: follow_up_interval(severity).to_string(),
        }
    }
}

pub fn follow_up_interval(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Immediate emergency evaluation; reassess continuously until stable",
        Severity::Severe => "Same-day clinical review, within 24 hours",
        Severity::Moderate => "Follow up within 1 week",
        Severity::Mild => "Follow up in 2-4 weeks or sooner if symptoms worsen",
        Severity::Normal => "Routine follow-up at next scheduled visit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adult() -> PatientProfile {
        PatientProfile {
            age: Some(45),
            sex: Some(Sex::Male),
            ..Default::default()
        }
    }

    #[test]
    fn empty_conditions_still_yield_a_medication() {
        for patient in [PatientProfile::default(), adult()] {
            let synthesis = Synthesizer::new().synthesize(&[], Severity::Normal, &patient);
            assert!(!synthesis.medications.is_empty());
            assert!(!synthesis.recommendations.is_empty());
            assert_eq!(synthesis.follow_up, follow_up_interval(Severity::Normal));
        }
    }

    #[test]
    fn every_medication_is_documented() {
        let all = [
            Condition::CardiacEmergency,
            Condition::RespiratoryEmergency,
            Condition::HypertensiveCrisis,
            Condition::HypertensionStage2,
            Condition::HypertensionStage1,
            Condition::Fever,
            Condition::Infection,
            Condition::Pain,
            Condition::Neurological,
            Condition::Anemia,
            Condition::Fatigue,
            Condition::Anaphylaxis,
            Condition::AllergicReaction,
            Condition::Anxiety,
        ];
        let patient = PatientProfile {
            age: Some(30),
            sex: Some(Sex::Female),
            weight_kg: Some(62.0),
            smoking: true,
            alcohol: true,
        };
        let synthesis = Synthesizer::new().synthesize(&all, Severity::Critical, &patient);
        assert!(synthesis.medications.len() > 10);
        for medication in &synthesis.medications {
            assert!(medication.is_documented(), "{} lacks documentation", medication.drug_name);
            assert!(!medication.dose.is_empty(), "{} lacks a dose", medication.drug_name);
        }
    }

    #[test]
    fn blocks_combine_and_recommendations_dedupe() {
        let synthesis = Synthesizer::new().synthesize(
            &[Condition::HypertensionStage2, Condition::Anemia],
            Severity::Moderate,
            &adult(),
        );
        let names: Vec<_> = synthesis.medications.iter().map(|m| m.drug_name.as_str()).collect();
        assert!(names.contains(&"Amlodipine"));
        assert!(names.iter().any(|n| n.starts_with("Ferrous")));

        let mut seen = std::collections::HashSet::new();
        for rec in &synthesis.recommendations {
            assert!(seen.insert(rec.to_lowercase()), "duplicate recommendation: {}", rec);
        }
        assert_eq!(synthesis.follow_up, "Follow up within 1 week");
    }

    #[test]
    fn smoking_adds_cessation_advice() {
        let patient = PatientProfile {
            smoking: true,
            ..adult()
        };
        let synthesis =
            Synthesizer::new().synthesize(&[Condition::HypertensionStage1], Severity::Mild, &patient);
        assert!(synthesis
            .recommendations
            .iter()
            .any(|r| r.contains("Smoking cessation")));
    }

    #[test]
    fn profile_helpers() {
        let teen = PatientProfile {
            age: Some(16),
            sex: Some(Sex::Female),
            ..Default::default()
        };
        assert!(teen.could_be_pregnant());
        assert!(!teen.is_older_adult());
        assert!(!adult().could_be_pregnant());
        let child = PatientProfile {
            age: Some(6),
            ..Default::default()
        };
        assert!(child.is_child());
    }
}
