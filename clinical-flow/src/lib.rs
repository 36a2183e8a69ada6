pub mod backend;
pub mod bands;
pub mod cascade;
pub mod case;
pub mod collaborators;
pub mod condition;
pub mod engine;
pub mod error;
pub mod learning;
pub mod orchestrator;
pub mod prompt;
pub mod report;
pub mod scoring;
pub mod signals;
pub mod synthesis;
pub mod taxonomy;

// Re-export commonly used types
pub use backend::{BackendReply, ReasoningBackend};
pub use cascade::{AttemptOutcome, CascadeConfig, CascadeEvent, CascadeState, ProviderAttempt};
pub use case::{Labs, PatientCase, Sex, SocialHistory, Vitals};
pub use collaborators::{
    DrugDetails, InMemoryReferenceData, InteractionRecord, NameExtractor, ReferenceData,
};
pub use condition::Condition;
pub use engine::{ClinicalAssessment, DeterministicEngine};
pub use error::{BackendError, FlowError, Result};
pub use learning::{CalibrationBucket, LearningTracker};
pub use orchestrator::{AnalysisRun, FallbackOrchestrator};
pub use prompt::CasePrompt;
pub use report::{AnalysisReport, ReportAssembler, ReportSource};
pub use scoring::{ConfidenceLedger, ScoringResult, Severity, Urgency, score};
pub use signals::{OrganSystem, Signal, SignalExtractor, SignalSet, Tier};
pub use synthesis::{PatientProfile, Synthesis, Synthesizer, TreatmentRecommendation};
pub use taxonomy::Taxonomy;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoBackend;

    #[async_trait]
    impl ReasoningBackend for EchoBackend {
        fn id(&self) -> &str {
            "echo"
        }

        fn model_candidates(&self) -> Vec<String> {
            vec!["echo-1".to_string()]
        }

        async fn analyze(
            &self,
            _model: &str,
            prompt: &CasePrompt,
        ) -> std::result::Result<BackendReply, BackendError> {
            Ok(BackendReply::success(format!("Reviewed:\n{}", prompt.user))
                .with_patient_message("Please follow up with your doctor."))
        }
    }

    #[tokio::test]
    async fn test_end_to_end_analysis() {
        let case: PatientCase = serde_json::from_value(serde_json::json!({
            "id": "case-1",
            "age": 67,
            "sex": "male",
            "chiefComplaint": "Chest tightness on exertion",
            "vitals": { "bloodPressure": "152/96", "heartRate": 92, "oxygenSaturation": "97%" },
            "medications": ["Warfarin"]
        }))
        .unwrap();

        let reference: Arc<dyn ReferenceData> = Arc::new(InMemoryReferenceData::standard());
        let orchestrator =
            FallbackOrchestrator::new(Arc::clone(&reference)).with_primary(Arc::new(EchoBackend));

        let run = orchestrator.analyze(&case).await;
        assert!(run.report.success);
        assert_eq!(run.report.source, ReportSource::Backend);
        assert!(run.report.analysis.contains("Chest tightness on exertion"));
        assert_eq!(run.attempts.len(), 1);

        let assessment = orchestrator.engine().assess(&case).await.unwrap();
        // symptom 5 + stage 2 20 + cross-validation 10 + completeness 10 = 45
        assert_eq!(assessment.scoring.confidence, 54);
        assert!(assessment.scoring.has(Condition::ChestPain));
        let report = orchestrator.assembler().from_assessment(assessment);
        assert_eq!(report.source, ReportSource::Deterministic);
        assert_eq!(report.confidence, 54);
    }
}
