use std::fmt;

use serde::{Deserialize, Serialize};

/// Condition tags produced by signal extraction and consumed by synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    CardiacEmergency,
    ChestPain,
    Arrhythmia,
    CardiovascularHistory,
    RespiratoryEmergency,
    Dyspnea,
    RespiratorySymptoms,
    NeurologicalEmergency,
    Neurological,
    Headache,
    GastrointestinalEmergency,
    Gastrointestinal,
    Anaphylaxis,
    AllergicReaction,
    PsychiatricEmergency,
    Anxiety,
    Pain,
    Sepsis,
    Infection,
    Fever,
    HighFever,
    Hyperpyrexia,
    Hypothermia,
    HypertensiveCrisis,
    #[serde(rename = "hypertension_stage_2")]
    HypertensionStage2,
    #[serde(rename = "hypertension_stage_1")]
    HypertensionStage1,
    Hypotension,
    Tachycardia,
    Bradycardia,
    SevereHypoxemia,
    Hypoxemia,
    Leukocytosis,
    Leukopenia,
    SevereAnemia,
    Anemia,
    Thrombocytopenia,
    Thrombocytosis,
    RenalImpairment,
    AcuteKidneyInjury,
    Fatigue,
    Dizziness,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::CardiacEmergency => "cardiac_emergency",
            Condition::ChestPain => "chest_pain",
            Condition::Arrhythmia => "arrhythmia",
            Condition::CardiovascularHistory => "cardiovascular_history",
            Condition::RespiratoryEmergency => "respiratory_emergency",
            Condition::Dyspnea => "dyspnea",
            Condition::RespiratorySymptoms => "respiratory_symptoms",
            Condition::NeurologicalEmergency => "neurological_emergency",
            Condition::Neurological => "neurological",
            Condition::Headache => "headache",
            Condition::GastrointestinalEmergency => "gastrointestinal_emergency",
            Condition::Gastrointestinal => "gastrointestinal",
            Condition::Anaphylaxis => "anaphylaxis",
            Condition::AllergicReaction => "allergic_reaction",
            Condition::PsychiatricEmergency => "psychiatric_emergency",
            Condition::Anxiety => "anxiety",
            Condition::Pain => "pain",
            Condition::Sepsis => "sepsis",
            Condition::Infection => "infection",
            Condition::Fever => "fever",
            Condition::HighFever => "high_fever",
            Condition::Hyperpyrexia => "hyperpyrexia",
            Condition::Hypothermia => "hypothermia",
            Condition::HypertensiveCrisis => "hypertensive_crisis",
            Condition::HypertensionStage2 => "hypertension_stage_2",
            Condition::HypertensionStage1 => "hypertension_stage_1",
            Condition::Hypotension => "hypotension",
            Condition::Tachycardia => "tachycardia",
            Condition::Bradycardia => "bradycardia",
            Condition::SevereHypoxemia => "severe_hypoxemia",
            Condition::Hypoxemia => "hypoxemia",
            Condition::Leukocytosis => "leukocytosis",
            Condition::Leukopenia => "leukopenia",
            Condition::SevereAnemia => "severe_anemia",
            Condition::Anemia => "anemia",
            Condition::Thrombocytopenia => "thrombocytopenia",
            Condition::Thrombocytosis => "thrombocytosis",
            Condition::RenalImpairment => "renal_impairment",
            Condition::AcuteKidneyInjury => "acute_kidney_injury",
            Condition::Fatigue => "fatigue",
            Condition::Dizziness => "dizziness",
        }
    }

    pub fn is_hypertension(&self) -> bool {
        matches!(
            self,
            Condition::HypertensiveCrisis
                | Condition::HypertensionStage2
                | Condition::HypertensionStage1
        )
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
