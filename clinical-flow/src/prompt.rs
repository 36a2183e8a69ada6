use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::case::PatientCase;
use crate::collaborators::InteractionRecord;
use crate::error::Result;

pub const SYSTEM_PREAMBLE: &str = "You are a clinical decision support assistant. \
You assist licensed clinicians; you do not replace their judgement. \
Assess the case, state the most likely conditions with severity and urgency, \
recommend evidence-based management with doses and alternatives, and flag red flags. \
Finish with a section starting 'PATIENT SUMMARY:' written in plain language for the patient, \
and a final line 'CONFIDENCE: NN%'.";

/// The rendered request sent to a reasoning backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasePrompt {
    pub system: String,
    pub user: String,
}

impl CasePrompt {
    /// Render a prompt for `case`, including known interactions among its
    /// current medications. Fails on an implausible case.
    pub fn build(case: &PatientCase, interactions: &[InteractionRecord]) -> Result<Self> {
        case.validate()?;

        let mut user = String::from("Please analyze the following patient case.\n\n");
        section(&mut user, "Patient", &demographics(case));
        if let Some(text) = &case.chief_complaint {
            section(&mut user, "Chief complaint", text);
        }
        if let Some(text) = &case.symptoms {
            section(&mut user, "Symptoms", text);
        }
        if let Some(text) = &case.history {
            section(&mut user, "History", text);
        }

        let readings = [
            ("Blood pressure", &case.vitals.blood_pressure),
            ("Heart rate", &case.vitals.heart_rate),
            ("Temperature", &case.vitals.temperature),
            ("Oxygen saturation", &case.vitals.oxygen_saturation),
            ("WBC", &case.labs.white_cell_count),
            ("Hemoglobin", &case.labs.hemoglobin),
            ("Platelets", &case.labs.platelets),
            ("Creatinine", &case.labs.creatinine),
        ];
        let measured: Vec<String> = readings
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("- {}: {}", name, v)))
            .collect();
        if !measured.is_empty() {
            section(&mut user, "Vitals and labs", &measured.join("\n"));
        }

        if !case.medications.is_empty() {
            section(&mut user, "Current medications", &case.medications.join(", "));
        }
        if !case.allergies.is_empty() {
            section(&mut user, "Allergies", &case.allergies.join(", "));
        }
        if !interactions.is_empty() {
            let lines: Vec<String> = interactions
                .iter()
                .map(|i| {
                    format!(
                        "- {} + {} ({}): {}",
                        i.drug1, i.drug2, i.severity, i.description
                    )
                })
                .collect();
            section(&mut user, "Known drug interactions", &lines.join("\n"));
        }

        Ok(Self {
            system: SYSTEM_PREAMBLE.to_string(),
            user,
        })
    }
}

fn demographics(case: &PatientCase) -> String {
    let mut parts = Vec::new();
    if let Some(age) = case.age {
        parts.push(format!("{} years", age));
    }
    if let Some(sex) = case.sex {
        parts.push(format!("{:?}", sex).to_lowercase());
    }
    if let Some(weight) = case.weight_kg {
        parts.push(format!("{:.1} kg", weight));
    }
    let social = &case.social_history;
    if social.smoking {
        parts.push("smoker".to_string());
    }
    if social.alcohol {
        parts.push("drinks alcohol".to_string());
    }
    if parts.is_empty() {
        "not provided".to_string()
    } else {
        parts.join(", ")
    }
}

fn section(out: &mut String, title: &str, body: &str) {
    let _ = write!(out, "{}:\n{}\n\n", title, body.trim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{Sex, Vitals};
    use crate::error::FlowError;

    #[test]
    fn renders_case_and_interactions() {
        let case = PatientCase {
            age: Some(58),
            sex: Some(Sex::Male),
            chief_complaint: Some("Chest pressure for two hours".into()),
            vitals: Vitals {
                blood_pressure: Some("150/95".into()),
                ..Default::default()
            },
            medications: vec!["Lisinopril".into(), "Ibuprofen".into()],
            ..Default::default()
        };
        let interactions = vec![InteractionRecord {
            drug1: "lisinopril".into(),
            drug2: "ibuprofen".into(),
            severity: "moderate".into(),
            description: "Reduced antihypertensive effect".into(),
            confidence: 0.9,
        }];
        let prompt = CasePrompt::build(&case, &interactions).unwrap();
        assert!(prompt.system.contains("PATIENT SUMMARY:"));
        assert!(prompt.user.contains("58 years, male"));
        assert!(prompt.user.contains("- Blood pressure: 150/95"));
        assert!(prompt.user.contains("lisinopril + ibuprofen (moderate)"));
        assert!(!prompt.user.contains("Heart rate"));
    }

    #[test]
    fn rejects_implausible_demographics() {
        let invalid = PatientCase {
            age: Some(212),
            chief_complaint: Some("headache".into()),
            ..Default::default()
        };
        assert!(matches!(
            CasePrompt::build(&invalid, &[]),
            Err(FlowError::InvalidCase(_))
        ));
        assert!(CasePrompt::build(&PatientCase::default(), &[]).is_ok());
    }
}
