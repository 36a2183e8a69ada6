//! Report assembly. Every path through the orchestrator ends here, so callers
//! always receive the same [`AnalysisReport`] shape.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::backend::BackendReply;
use crate::cascade::CascadeConfig;
use crate::engine::ClinicalAssessment;
use crate::error::FlowError;
use crate::scoring::{Severity, Urgency};
use crate::synthesis::TreatmentRecommendation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportSource {
    /// A reasoning backend produced the analysis.
    #[serde(rename = "ai")]
    Backend,
    /// The rule-based engine produced the analysis.
    #[serde(rename = "logic")]
    Deterministic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub success: bool,
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_friendly_message: Option<String>,
    /// 0..=100
    pub confidence: u8,
    pub source: ReportSource,
    /// `provider/model` of the backend that answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<ClinicalAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler {
    backend_confidence: u8,
    rescue_confidence: u8,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(&CascadeConfig::default())
    }
}

impl ReportAssembler {
    pub fn new(config: &CascadeConfig) -> Self {
        Self {
            backend_confidence: config.backend_confidence,
            rescue_confidence: config.rescue_confidence,
        }
    }

    pub fn from_backend(&self, provider: &str, model: &str, reply: BackendReply) -> AnalysisReport {
        AnalysisReport {
            success: true,
            analysis: reply.analysis,
            patient_friendly_message: reply.patient_friendly_message,
            confidence: reply
                .confidence
                .unwrap_or(self.backend_confidence)
                .min(100),
            source: ReportSource::Backend,
            backend: Some(format!("{}/{}", provider, model)),
            assessment: None,
            error: None,
        }
    }

    pub fn from_assessment(&self, assessment: ClinicalAssessment) -> AnalysisReport {
        let confidence = assessment.scoring.confidence;
        self.deterministic(assessment, confidence, false)
    }

    /// Deterministic report produced after an error elsewhere in the pipeline.
    pub fn rescued(&self, assessment: ClinicalAssessment) -> AnalysisReport {
        self.deterministic(assessment, self.rescue_confidence, true)
    }

    pub fn failure(&self, error: &FlowError) -> AnalysisReport {
        AnalysisReport {
            success: false,
            analysis: String::new(),
            patient_friendly_message: None,
            confidence: 0,
            source: ReportSource::Deterministic,
            backend: None,
            assessment: None,
            error: Some(error.to_string()),
        }
    }

    fn deterministic(
        &self,
        assessment: ClinicalAssessment,
        confidence: u8,
        rescued: bool,
    ) -> AnalysisReport {
        let mut analysis = render_narrative(&assessment, confidence);
        if rescued {
            analysis.push_str(
                "\nNOTE: Produced by the rule-based engine after an internal error; confidence has been reduced.\n",
            );
        }
        AnalysisReport {
            success: true,
            analysis,
            patient_friendly_message: Some(
                patient_message(assessment.scoring.urgency, assessment.scoring.severity)
                    .to_string(),
            ),
            confidence,
            source: ReportSource::Deterministic,
            backend: None,
            assessment: Some(assessment),
            error: None,
        }
    }
}

/// Multi-section narrative for a deterministic assessment.
pub fn render_narrative(assessment: &ClinicalAssessment, confidence: u8) -> String {
    let scoring = &assessment.scoring;
    let synthesis = &assessment.synthesis;
    let mut out = String::new();

    let _ = writeln!(out, "CLINICAL ASSESSMENT (rule-based)");
    let _ = writeln!(
        out,
        "Severity: {} | Urgency: {} | Confidence: {}%",
        scoring.severity, scoring.urgency, confidence
    );

    heading(&mut out, "IDENTIFIED CONDITIONS");
    if scoring.conditions.is_empty() {
        let _ = writeln!(out, "- No specific conditions identified");
    }
    for condition in &scoring.conditions {
        let _ = writeln!(out, "- {}", condition);
    }

    if !scoring.reasoning.is_empty() {
        heading(&mut out, "CLINICAL REASONING");
        bullets(&mut out, &scoring.reasoning);
    }

    heading(&mut out, "RECOMMENDATIONS");
    bullets(&mut out, &synthesis.recommendations);

    heading(&mut out, "MEDICATIONS");
    for medication in &synthesis.medications {
        render_medication(&mut out, medication);
    }

    if !assessment.interactions.is_empty() {
        heading(&mut out, "DRUG INTERACTION ALERTS");
        for interaction in &assessment.interactions {
            let _ = writeln!(
                out,
                "- {} + {} ({}): {}",
                interaction.drug1, interaction.drug2, interaction.severity, interaction.description
            );
        }
    }

    if !assessment.reference_notes.is_empty() {
        heading(&mut out, "REFERENCE NOTES");
        for details in &assessment.reference_notes {
            let _ = writeln!(
                out,
                "- {} ({}): {}",
                details.name,
                details.drug_class,
                details.notes.join("; ")
            );
        }
    }

    if !synthesis.monitoring.is_empty() {
        heading(&mut out, "MONITORING");
        bullets(&mut out, &synthesis.monitoring);
    }

    heading(&mut out, "FOLLOW-UP");
    let _ = writeln!(out, "{}", synthesis.follow_up);

    let _ = writeln!(
        out,
        "\nDecision support only. A licensed clinician must confirm every recommendation."
    );
    out
}

fn render_medication(out: &mut String, medication: &TreatmentRecommendation) {
    let _ = writeln!(
        out,
        "- {} ({}): {} {}, {}",
        medication.drug_name,
        medication.category,
        medication.dose,
        medication.route,
        medication.frequency
    );
    let _ = writeln!(out, "  Rationale: {}", medication.rationale);
    if !medication.precautions.is_empty() {
        let _ = writeln!(out, "  Precautions: {}", medication.precautions.join("; "));
    }
    let _ = writeln!(out, "  Alternatives: {}", medication.alternatives.join("; "));
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title);
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}

pub fn patient_message(urgency: Urgency, severity: Severity) -> &'static str {
    match (urgency, severity) {
        (Urgency::Emergency, _) | (_, Severity::Critical) => {
            "Your symptoms and measurements point to a problem that needs emergency care. \
             Call emergency services or go to the nearest emergency department now."
        }
        (Urgency::Urgent, _) | (_, Severity::Severe) => {
            "Some of your findings need prompt attention. \
             Please see a doctor or urgent care clinic today."
        }
        (_, Severity::Moderate | Severity::Mild) => {
            "Some of your results are outside the normal range. \
             Follow the plan below and book a follow-up visit; seek care sooner if you feel worse."
        }
        (_, Severity::Normal) => {
            "Nothing in the information provided points to an urgent problem. \
             Keep an eye on your symptoms and contact your doctor if they change or get worse."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::InteractionRecord;
    use crate::scoring::ScoringResult;
    use crate::synthesis::{PatientProfile, Synthesizer};
    use crate::condition::Condition;

    fn assessment(severity: Severity, urgency: Urgency, confidence: u8) -> ClinicalAssessment {
        let conditions = vec![Condition::HypertensionStage2];
        let synthesis =
            Synthesizer::new().synthesize(&conditions, severity, &PatientProfile::default());
        ClinicalAssessment {
            scoring: ScoringResult {
                conditions,
                severity,
                urgency,
                confidence,
                reasoning: vec!["Blood pressure 150/95 mmHg indicates stage 2 hypertension".into()],
                contributions: Vec::new(),
            },
            synthesis,
            interactions: vec![InteractionRecord {
                drug1: "lisinopril".into(),
                drug2: "ibuprofen".into(),
                severity: "moderate".into(),
                description: "NSAIDs reduce antihypertensive effect".into(),
                confidence: 0.9,
            }],
            reference_notes: Vec::new(),
        }
    }

    #[test]
    fn backend_confidence_defaults_and_overrides() {
        let assembler = ReportAssembler::default();
        let report = assembler.from_backend("openrouter", "gpt", BackendReply::success("ok"));
        assert_eq!(report.confidence, 85);
        assert_eq!(report.source, ReportSource::Backend);
        assert_eq!(report.backend.as_deref(), Some("openrouter/gpt"));

        let report = assembler.from_backend(
            "gemini",
            "flash",
            BackendReply::success("ok").with_confidence(72),
        );
        assert_eq!(report.confidence, 72);
    }

    #[test]
    fn deterministic_report_uses_scoring_confidence() {
        let report =
            ReportAssembler::default().from_assessment(assessment(Severity::Moderate, Urgency::Urgent, 54));
        assert!(report.success);
        assert_eq!(report.confidence, 54);
        assert_eq!(report.source, ReportSource::Deterministic);
        assert!(report.analysis.contains("IDENTIFIED CONDITIONS\n- hypertension_stage_2"));
        assert!(report.analysis.contains("DRUG INTERACTION ALERTS"));
        assert!(report.analysis.contains("Amlodipine"));
        assert!(report
            .patient_friendly_message
            .as_deref()
            .is_some_and(|m| m.contains("today")));
    }

    #[test]
    fn rescue_forces_reduced_confidence() {
        let report =
            ReportAssembler::default().rescued(assessment(Severity::Critical, Urgency::Emergency, 90));
        assert_eq!(report.confidence, 50);
        assert!(report.success);
        assert!(report.analysis.contains("confidence has been reduced"));
    }

    #[test]
    fn failure_report_shape() {
        let report = ReportAssembler::default()
            .failure(&FlowError::Reference("catalog offline".into()));
        assert!(!report.success);
        assert_eq!(report.confidence, 0);
        assert!(report.analysis.is_empty());
        assert_eq!(
            report.error.as_deref(),
            Some("Reference data lookup failed: catalog offline")
        );
    }

    #[test]
    fn serializes_with_wire_names() {
        let report = ReportAssembler::default().from_backend(
            "openrouter",
            "gpt",
            BackendReply::success("ok").with_patient_message("Rest and hydrate."),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "ai");
        assert_eq!(json["patientFriendlyMessage"], "Rest and hydrate.");
        assert!(json.get("error").is_none());

        let failure = ReportAssembler::default().failure(&FlowError::Assessment("x".into()));
        assert_eq!(serde_json::to_value(&failure).unwrap()["source"], "logic");
    }
}
