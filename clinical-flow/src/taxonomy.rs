use std::sync::LazyLock;

use regex::Regex;

use crate::condition::Condition;
use crate::signals::{OrganSystem, Signal, Tier};

/// A negation cue followed by at most two words, at the end of a clause
/// prefix: "no", "denies chest", "negative for fever or".
static NEGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:no|not|denies|denied|denying|without|negative for|free of)\s+(?:[\w'-]+\s+){0,2}$",
    )
    .expect("Invalid negation regex")
});

/// Keywords for one tier of one organ system.
#[derive(Debug, Clone)]
pub struct TierKeywords {
    pub tier: Tier,
    pub condition: Condition,
    pub terms: Vec<String>,
    pattern: Regex,
}

impl TierKeywords {
    pub fn new(tier: Tier, condition: Condition, terms: Vec<String>) -> Self {
        let pattern = term_pattern(&terms);
        Self {
            tier,
            condition,
            terms,
            pattern,
        }
    }
}

/// Keyword tiers of one organ system. The `Symptom` tier is an allow-list:
/// only the listed, system-specific complaints may fire it.
#[derive(Debug, Clone)]
pub struct SystemKeywords {
    pub system: OrganSystem,
    pub tiers: Vec<TierKeywords>,
}

/// Non-specific complaints (fatigue, dizziness, fever). They only ever yield
/// `OrganSystem::General` signals.
#[derive(Debug, Clone)]
pub struct GenericSymptom {
    pub condition: Condition,
    pub terms: Vec<String>,
    pattern: Regex,
}

impl GenericSymptom {
    pub fn new(condition: Condition, terms: Vec<String>) -> Self {
        let pattern = term_pattern(&terms);
        Self {
            condition,
            terms,
            pattern,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    systems: Vec<SystemKeywords>,
    generic: Vec<GenericSymptom>,
}

impl Taxonomy {
    pub fn new(systems: Vec<SystemKeywords>, generic: Vec<GenericSymptom>) -> Self {
        Self { systems, generic }
    }

    /// Match lowercase free text. Each (system, tier) contributes at most one
    /// signal, from its first affirmed (not negated) term in the text.
    pub fn match_text(&self, text: &str) -> Vec<Signal> {
        let mut signals = Vec::new();

        for system in &self.systems {
            for tier in &system.tiers {
                if let Some(term) = first_affirmed(&tier.pattern, text) {
                    signals.push(Signal::keyword(
                        system.system,
                        tier.tier,
                        tier.condition,
                        term,
                    ));
                }
            }
        }

        for symptom in &self.generic {
            if let Some(term) = first_affirmed(&symptom.pattern, text) {
                signals.push(Signal::keyword(
                    OrganSystem::General,
                    Tier::Symptom,
                    symptom.condition,
                    term,
                ));
            }
        }

        signals
    }

    pub fn systems(&self) -> &[SystemKeywords] {
        &self.systems
    }

    pub fn standard() -> Self {
        use Condition as C;
        use OrganSystem as S;

        let systems = vec![
            system(
                S::Cardiovascular,
                [
                    (
                        Tier::Emergency,
                        C::CardiacEmergency,
                        &[
                            "heart attack",
                            "cardiac arrest",
                            "crushing chest pain",
                            "chest pain radiating",
                            "pain radiating to left arm",
                            "pain radiating to jaw",
                            "myocardial infarction",
                        ][..],
                    ),
                    (
                        Tier::Urgent,
                        C::Arrhythmia,
                        &[
                            "palpitations",
                            "irregular heartbeat",
                            "racing heart",
                            "heart racing",
                            "fainted",
                            "fainting",
                            "syncope",
                        ][..],
                    ),
                    (
                        Tier::Routine,
                        C::CardiovascularHistory,
                        &[
                            "high blood pressure",
                            "hypertension",
                            "high cholesterol",
                            "heart murmur",
                            "coronary artery disease",
                        ][..],
                    ),
                    (
                        Tier::Symptom,
                        C::ChestPain,
                        &["chest pain", "chest pressure", "chest tightness", "tight chest"][..],
                    ),
                ],
            ),
            system(
                S::Respiratory,
                [
                    (
                        Tier::Emergency,
                        C::RespiratoryEmergency,
                        &[
                            "can't breathe",
                            "cannot breathe",
                            "unable to breathe",
                            "choking",
                            "respiratory distress",
                            "turning blue",
                            "blue lips",
                            "cyanosis",
                        ][..],
                    ),
                    (
                        Tier::Urgent,
                        C::Dyspnea,
                        &[
                            "shortness of breath",
                            "short of breath",
                            "difficulty breathing",
                            "trouble breathing",
                            "coughing up blood",
                            "wheezing",
                        ][..],
                    ),
                    (
                        Tier::Routine,
                        C::RespiratorySymptoms,
                        &["cough", "coughing", "congestion", "runny nose", "sore throat", "asthma"][..],
                    ),
                    (
                        Tier::Symptom,
                        C::Dyspnea,
                        &["breathless", "winded", "dyspnea"][..],
                    ),
                ],
            ),
            system(
                S::Neurological,
                [
                    (
                        Tier::Emergency,
                        C::NeurologicalEmergency,
                        &[
                            "stroke",
                            "seizure",
                            "seizures",
                            "unconscious",
                            "unresponsive",
                            "facial droop",
                            "slurred speech",
                            "worst headache",
                            "sudden weakness",
                        ][..],
                    ),
                    (
                        Tier::Urgent,
                        C::Neurological,
                        &[
                            "confusion",
                            "confused",
                            "severe headache",
                            "numbness",
                            "vision loss",
                            "loss of vision",
                        ][..],
                    ),
                    (Tier::Routine, C::Headache, &["headache", "migraine"][..]),
                    (
                        Tier::Symptom,
                        C::Neurological,
                        &["tingling", "tremor", "memory loss"][..],
                    ),
                ],
            ),
            system(
                S::Gastrointestinal,
                [
                    (
                        Tier::Emergency,
                        C::GastrointestinalEmergency,
                        &[
                            "vomiting blood",
                            "black tarry stool",
                            "severe abdominal pain",
                            "rigid abdomen",
                        ][..],
                    ),
                    (
                        Tier::Urgent,
                        C::Gastrointestinal,
                        &[
                            "persistent vomiting",
                            "blood in stool",
                            "abdominal pain",
                            "stomach pain",
                        ][..],
                    ),
                    (
                        Tier::Routine,
                        C::Gastrointestinal,
                        &[
                            "nausea",
                            "vomiting",
                            "diarrhea",
                            "diarrhoea",
                            "constipation",
                            "heartburn",
                        ][..],
                    ),
                    (
                        Tier::Symptom,
                        C::Gastrointestinal,
                        &["bloating", "stomach cramps", "indigestion"][..],
                    ),
                ],
            ),
            system(
                S::Immunologic,
                [
                    (
                        Tier::Emergency,
                        C::Anaphylaxis,
                        &[
                            "anaphylaxis",
                            "anaphylactic",
                            "throat swelling",
                            "throat closing",
                            "tongue swelling",
                            "swollen tongue",
                        ][..],
                    ),
                    (
                        Tier::Urgent,
                        C::AllergicReaction,
                        &[
                            "hives",
                            "facial swelling",
                            "swollen face",
                            "lip swelling",
                            "allergic reaction",
                        ][..],
                    ),
                    (
                        Tier::Routine,
                        C::AllergicReaction,
                        &["rash", "itching", "itchy", "sneezing", "seasonal allergies"][..],
                    ),
                    (
                        Tier::Symptom,
                        C::AllergicReaction,
                        &["itchy eyes", "watery eyes"][..],
                    ),
                ],
            ),
            system(
                S::Psychiatric,
                [
                    (
                        Tier::Emergency,
                        C::PsychiatricEmergency,
                        &[
                            "suicidal",
                            "want to die",
                            "kill myself",
                            "self-harm",
                            "self harm",
                            "overdose",
                        ][..],
                    ),
                    (
                        Tier::Urgent,
                        C::Anxiety,
                        &[
                            "panic attack",
                            "panic attacks",
                            "severe anxiety",
                            "hallucinations",
                            "hearing voices",
                        ][..],
                    ),
                    (
                        Tier::Routine,
                        C::Anxiety,
                        &[
                            "anxiety",
                            "anxious",
                            "stress",
                            "stressed",
                            "insomnia",
                            "depressed",
                            "depression",
                        ][..],
                    ),
                    (
                        Tier::Symptom,
                        C::Anxiety,
                        &["racing thoughts", "nervous", "restless"][..],
                    ),
                ],
            ),
            system(
                S::Musculoskeletal,
                [
                    (
                        Tier::Emergency,
                        C::Pain,
                        &["open fracture", "bone sticking out"][..],
                    ),
                    (
                        Tier::Urgent,
                        C::Pain,
                        &[
                            "severe pain",
                            "broken bone",
                            "fracture",
                            "dislocation",
                            "can't bear weight",
                        ][..],
                    ),
                    (
                        Tier::Routine,
                        C::Pain,
                        &[
                            "back pain",
                            "joint pain",
                            "muscle pain",
                            "neck pain",
                            "knee pain",
                            "shoulder pain",
                            "body aches",
                            "sprain",
                            "arthritis",
                        ][..],
                    ),
                    (
                        Tier::Symptom,
                        C::Pain,
                        &["stiffness", "stiff joints", "muscle cramps"][..],
                    ),
                ],
            ),
            system(
                S::Infectious,
                [
                    (
                        Tier::Emergency,
                        C::Sepsis,
                        &["sepsis", "septic", "septic shock"][..],
                    ),
                    (
                        Tier::Urgent,
                        C::Infection,
                        &[
                            "infection",
                            "infected wound",
                            "abscess",
                            "pus",
                            "spreading redness",
                            "cellulitis",
                            "pneumonia",
                        ][..],
                    ),
                    (
                        Tier::Routine,
                        C::Infection,
                        &[
                            "burning urination",
                            "painful urination",
                            "ear infection",
                            "sinus infection",
                            "uti",
                        ][..],
                    ),
                    (
                        Tier::Symptom,
                        C::Infection,
                        &["swollen glands", "swollen lymph nodes", "night sweats"][..],
                    ),
                ],
            ),
        ];

        let generic = vec![
            generic(
                C::Fatigue,
                &[
                    "fatigue",
                    "fatigued",
                    "tired",
                    "exhausted",
                    "exhaustion",
                    "weakness",
                    "weak",
                    "lethargic",
                    "malaise",
                ],
            ),
            generic(
                C::Dizziness,
                &["dizzy", "dizziness", "lightheaded", "light-headed", "vertigo"],
            ),
            generic(
                C::Fever,
                &["fever", "feverish", "chills", "high temperature"],
            ),
        ];

        Self::new(systems, generic)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

fn system<const N: usize>(
    system: OrganSystem,
    tiers: [(Tier, Condition, &[&str]); N],
) -> SystemKeywords {
    SystemKeywords {
        system,
        tiers: tiers
            .into_iter()
            .map(|(tier, condition, terms)| {
                TierKeywords::new(tier, condition, terms.iter().map(|t| t.to_string()).collect())
            })
            .collect(),
    }
}

fn generic(condition: Condition, terms: &[&str]) -> GenericSymptom {
    GenericSymptom::new(condition, terms.iter().map(|t| t.to_string()).collect())
}

/// Whole-word alternation over the escaped terms, in declaration order.
/// An empty list compiles to a pattern that never matches.
fn term_pattern(terms: &[String]) -> Regex {
    let alternation = terms
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let source = if alternation.is_empty() {
        r"\b\B".to_string()
    } else {
        format!(r"\b(?:{})\b", alternation)
    };
    Regex::new(&source).expect("escaped term alternation is a valid pattern")
}

fn first_affirmed<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .find_iter(text)
        .find(|m| !is_negated(&text[..m.start()]))
        .map(|m| m.as_str())
}

/// True when the clause leading up to a match ends in a negation cue.
fn is_negated(prefix: &str) -> bool {
    let clause_start = prefix
        .rfind(['.', ',', ';', ':', '!', '?', '\n'])
        .map(|i| i + 1)
        .unwrap_or(0);
    NEGATION.is_match(&prefix[clause_start..])
}
