use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::case::PatientCase;
use crate::collaborators::{DrugDetails, InteractionRecord, ReferenceData};
use crate::error::Result;
use crate::scoring::{ScoringResult, score};
use crate::signals::SignalExtractor;
use crate::synthesis::{PatientProfile, Synthesis, Synthesizer};

/// Output of the rule-based path, before it is rendered into a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalAssessment {
    pub scoring: ScoringResult,
    pub synthesis: Synthesis,
    /// Interactions among current medications and the recommended drugs.
    pub interactions: Vec<InteractionRecord>,
    /// Catalog entries for recommended drugs.
    pub reference_notes: Vec<DrugDetails>,
}

/// Extractor, scoring and synthesizer chained together, with reference
/// lookups for the recommended drugs.
pub struct DeterministicEngine {
    extractor: SignalExtractor,
    synthesizer: Synthesizer,
    reference: Arc<dyn ReferenceData>,
}

impl DeterministicEngine {
    pub fn new(reference: Arc<dyn ReferenceData>) -> Self {
        Self {
            extractor: SignalExtractor::default(),
            synthesizer: Synthesizer::new(),
            reference,
        }
    }

    pub fn with_extractor(mut self, extractor: SignalExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub async fn assess(&self, case: &PatientCase) -> Result<ClinicalAssessment> {
        let signals = self.extractor.extract(case);
        let scoring = score(&signals);
        debug!(
            signals = signals.signals.len(),
            severity = %scoring.severity,
            urgency = %scoring.urgency,
            confidence = scoring.confidence,
            "Scored case"
        );

        let profile = PatientProfile::from(case);
        let synthesis = self
            .synthesizer
            .synthesize(&scoring.conditions, scoring.severity, &profile);
        let mut drugs = case.medications.clone();
        drugs.extend(synthesis.medications.iter().map(|m| m.drug_name.clone()));
        let interactions = self.reference.check_all_interactions(&drugs).await?;

        let mut reference_notes: Vec<DrugDetails> = Vec::new();
        for medication in &synthesis.medications {
            if let Some(details) = self.reference.drug_details(&medication.drug_name).await? {
                if !reference_notes.iter().any(|d| d.name == details.name) {
                    reference_notes.push(details);
                }
            }
        }

        Ok(ClinicalAssessment {
            scoring,
            synthesis,
            interactions,
            reference_notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::Vitals;
    use crate::collaborators::InMemoryReferenceData;
    use crate::condition::Condition;
    use crate::scoring::{Severity, Urgency};

    fn engine() -> DeterministicEngine {
        DeterministicEngine::new(Arc::new(InMemoryReferenceData::standard()))
    }

    #[tokio::test]
    async fn crisis_case_end_to_end() {
        let case = PatientCase {
            vitals: Vitals {
                blood_pressure: Some("185/125".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let assessment = engine().assess(&case).await.unwrap();
        assert_eq!(
            assessment.scoring.conditions,
            vec![Condition::HypertensiveCrisis]
        );
        assert_eq!(assessment.scoring.severity, Severity::Critical);
        assert_eq!(assessment.scoring.urgency, Urgency::Emergency);
        assert_eq!(assessment.synthesis.medications[0].drug_name, "Labetalol");
        assert_eq!(assessment.reference_notes[0].name, "labetalol");
    }

    #[tokio::test]
    async fn interactions_include_current_medications() {
        let case = PatientCase {
            chief_complaint: Some("knee pain after a fall".into()),
            medications: vec!["Warfarin".into()],
            ..Default::default()
        };
        let assessment = engine().assess(&case).await.unwrap();
        assert_eq!(assessment.synthesis.medications[0].drug_name, "Ibuprofen");
        assert!(assessment
            .interactions
            .iter()
            .any(|i| i.drug1 == "warfarin" && i.drug2 == "ibuprofen"));
    }

    #[tokio::test]
    async fn empty_case_gets_supportive_care() {
        let assessment = engine().assess(&PatientCase::default()).await.unwrap();
        assert!(assessment.scoring.conditions.is_empty());
        assert_eq!(assessment.scoring.confidence, 0);
        assert!(!assessment.synthesis.medications.is_empty());
    }

    struct OfflineReference;

    #[async_trait::async_trait]
    impl ReferenceData for OfflineReference {
        async fn check_all_interactions(
            &self,
            _drugs: &[String],
        ) -> Result<Vec<crate::collaborators::InteractionRecord>> {
            Err(crate::error::FlowError::Reference("offline".into()))
        }

        async fn drug_details(&self, _name: &str) -> Result<Option<DrugDetails>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn only_reference_lookups_can_fail() {
        for complaint in ["", "feeling dizzy", "itchy eyes", "stroke"] {
            let case = PatientCase {
                chief_complaint: Some(complaint.into()),
                ..Default::default()
            };
            let assessment = engine().assess(&case).await.unwrap();
            assert!(!assessment.synthesis.medications.is_empty(), "{}", complaint);
        }

        let offline = DeterministicEngine::new(Arc::new(OfflineReference));
        let error = offline.assess(&PatientCase::default()).await.unwrap_err();
        assert!(matches!(error, crate::error::FlowError::Reference(_)));
    }
}
