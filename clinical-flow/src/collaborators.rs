//! Read-only collaborators the pipeline consults: a drug reference catalog and
//! a medication-name extractor.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub drug1: String,
    pub drug2: String,
    pub severity: String,
    pub description: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugDetails {
    pub name: String,
    pub drug_class: String,
    pub notes: Vec<String>,
}

/// Drug reference lookups. Implementations must be safe to share across
/// requests.
#[async_trait]
pub trait ReferenceData: Send + Sync {
    /// Every known pairwise interaction among `drugs`.
    async fn check_all_interactions(&self, drugs: &[String]) -> Result<Vec<InteractionRecord>>;
    async fn drug_details(&self, name: &str) -> Result<Option<DrugDetails>>;
}

/// Turns free text into recognised medication names. Never fails; unknown
/// input yields an empty list.
pub trait NameExtractor: Send + Sync {
    fn extract_drugs_safely(&self, text: &str) -> Vec<String>;
}

/// In-memory implementation of ReferenceData
#[derive(Clone, Default)]
pub struct InMemoryReferenceData {
    drugs: Arc<DashMap<String, DrugDetails>>,
    interactions: Arc<DashMap<(String, String), InteractionRecord>>,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small catalog covering the drugs the synthesizer recommends and the
    /// interactions most often hit with them.
    pub fn standard() -> Self {
        let reference = Self::new();
        for (name, class, note) in [
            ("aspirin", "Antiplatelet", "Increases bleeding risk with other antithrombotics"),
            ("nitroglycerin", "Nitrate", "Causes headache and hypotension"),
            ("labetalol", "Alpha/beta blocker", "Can mask hypoglycemia"),
            ("amlodipine", "Calcium channel blocker", "Peripheral oedema is dose related"),
            ("lisinopril", "ACE inhibitor", "Dry cough in up to 10% of patients"),
            ("acetaminophen", "Analgesic/antipyretic", "Hepatotoxic above the daily maximum"),
            ("ibuprofen", "NSAID", "Reduces renal perfusion in volume depletion"),
            ("ferrous sulfate", "Iron supplement", "Absorption reduced by antacids and tea"),
            ("cetirizine", "Antihistamine", "Less sedating than first-generation agents"),
            ("hydroxyzine", "Antihistamine anxiolytic", "QT prolongation at high doses"),
            ("epinephrine", "Sympathomimetic", "No absolute contraindication in anaphylaxis"),
            ("albuterol", "Short-acting beta agonist", "Can lower serum potassium"),
        ] {
            reference.insert_drug(DrugDetails {
                name: name.to_string(),
                drug_class: class.to_string(),
                notes: vec![note.to_string()],
            });
        }

        for (a, b, severity, description) in [
            ("warfarin", "aspirin", "major", "Additive bleeding risk"),
            ("warfarin", "ibuprofen", "major", "NSAIDs raise bleeding risk on anticoagulants"),
            ("aspirin", "ibuprofen", "moderate", "Ibuprofen can blunt aspirin's antiplatelet effect"),
            ("lisinopril", "ibuprofen", "moderate", "NSAIDs reduce antihypertensive effect and renal function"),
            ("lisinopril", "spironolactone", "major", "Risk of hyperkalemia"),
            ("sildenafil", "nitroglycerin", "major", "Profound hypotension"),
            ("tadalafil", "nitroglycerin", "major", "Profound hypotension"),
            ("simvastatin", "amlodipine", "moderate", "Limit simvastatin to 20 mg daily"),
            ("metoprolol", "labetalol", "moderate", "Additive beta blockade and bradycardia"),
            ("sertraline", "tramadol", "major", "Serotonin syndrome and seizure risk"),
            ("levothyroxine", "ferrous sulfate", "moderate", "Iron reduces levothyroxine absorption"),
            ("alprazolam", "hydroxyzine", "moderate", "Additive CNS depression"),
        ] {
            reference.insert_interaction(InteractionRecord {
                drug1: a.to_string(),
                drug2: b.to_string(),
                severity: severity.to_string(),
                description: description.to_string(),
                confidence: 0.9,
            });
        }
        reference
    }

    pub fn insert_drug(&self, details: DrugDetails) {
        self.drugs.insert(normalize(&details.name), details);
    }

    pub fn insert_interaction(&self, record: InteractionRecord) {
        self.interactions
            .insert(pair_key(&record.drug1, &record.drug2), record);
    }
}

#[async_trait]
impl ReferenceData for InMemoryReferenceData {
    async fn check_all_interactions(&self, drugs: &[String]) -> Result<Vec<InteractionRecord>> {
        let mut names: Vec<String> = Vec::new();
        for drug in drugs {
            let name = normalize(drug);
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }

        let mut found = Vec::new();
        for (i, first) in names.iter().enumerate() {
            for second in &names[i + 1..] {
                if let Some(record) = self.interactions.get(&pair_key(first, second)) {
                    found.push(record.clone());
                }
            }
        }
        Ok(found)
    }

    async fn drug_details(&self, name: &str) -> Result<Option<DrugDetails>> {
        Ok(self.drugs.get(&normalize(name)).map(|entry| entry.clone()))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    let (a, b) = (normalize(a), normalize(b));
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interactions_are_symmetric_and_deduplicated() {
        let reference = InMemoryReferenceData::standard();
        let drugs = vec![
            "Ibuprofen".to_string(),
            "warfarin".to_string(),
            "IBUPROFEN".to_string(),
            "Aspirin".to_string(),
        ];
        let found = reference.check_all_interactions(&drugs).await.unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|r| r.confidence > 0.0));
    }

    #[tokio::test]
    async fn drug_lookup_is_case_insensitive() {
        let reference = InMemoryReferenceData::standard();
        let details = reference.drug_details(" Amlodipine ").await.unwrap();
        assert_eq!(details.unwrap().drug_class, "Calcium channel blocker");
        assert!(reference.drug_details("unobtainium").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_catalog_finds_nothing() {
        let reference = InMemoryReferenceData::new();
        let found = reference
            .check_all_interactions(&["aspirin".to_string(), "warfarin".to_string()])
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
