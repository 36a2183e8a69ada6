//! Property tests for signal extraction and scoring.

use clinical_flow::scoring::{CONFIDENCE_CEILING, score};
use clinical_flow::signals::{Completeness, SignalKind};
use clinical_flow::{
    Condition, OrganSystem, PatientCase, PatientProfile, Severity, Signal, SignalExtractor,
    SignalSet, Synthesizer, Tier, Urgency, Vitals,
};
use proptest::prelude::*;

const SYSTEMS: [OrganSystem; 6] = [
    OrganSystem::Cardiovascular,
    OrganSystem::Respiratory,
    OrganSystem::Neurological,
    OrganSystem::Psychiatric,
    OrganSystem::Hematologic,
    OrganSystem::General,
];

const TIERS: [Tier; 4] = [Tier::Emergency, Tier::Urgent, Tier::Routine, Tier::Symptom];

const CONDITIONS: [Condition; 8] = [
    Condition::ChestPain,
    Condition::HypertensionStage2,
    Condition::Tachycardia,
    Condition::Dyspnea,
    Condition::Fever,
    Condition::Anemia,
    Condition::Anxiety,
    Condition::Fatigue,
];

const PHRASES: [&str; 12] = [
    "chest pain",
    "shortness of breath",
    "feeling dizzy and tired",
    "worst headache of my life",
    "hives after peanuts",
    "anxious and cannot sleep",
    "vomiting since morning",
    "fever and chills",
    "back pain",
    "history of heart attack",
    "",
    "no complaints",
];

fn arb_signal() -> impl Strategy<Value = Signal> {
    (
        prop::sample::select(SYSTEMS.to_vec()),
        prop::sample::select(TIERS.to_vec()),
        prop::sample::select(CONDITIONS.to_vec()),
        any::<bool>(),
    )
        .prop_map(|(system, tier, condition, is_band)| {
            if is_band {
                Signal::band(
                    SignalKind::Vital,
                    system,
                    tier,
                    condition,
                    format!("{} band", condition),
                )
            } else {
                Signal::keyword(system, tier, condition, condition.as_str())
            }
        })
}

fn arb_signal_set() -> impl Strategy<Value = SignalSet> {
    (
        prop::collection::vec(arb_signal(), 0..12),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(signals, blood_pressure, heart_rate, oxygen_saturation)| {
            SignalSet::new(
                signals,
                Completeness {
                    blood_pressure,
                    heart_rate,
                    oxygen_saturation,
                },
            )
        })
}

fn arb_case() -> impl Strategy<Value = PatientCase> {
    (
        prop::sample::select(PHRASES.to_vec()),
        prop::sample::select(PHRASES.to_vec()),
        prop::option::of((60u32..240, 30u32..140)),
        prop::option::of(20u32..220),
        prop::option::of(prop::sample::select(vec![
            "36.8", "38.4 C", "39.5 C", "103.1 F", "95 F", "hot",
        ])),
        prop::option::of(60u32..101),
    )
        .prop_map(|(complaint, symptoms, bp, hr, temp, spo2)| PatientCase {
            chief_complaint: Some(complaint.to_string()),
            symptoms: Some(symptoms.to_string()),
            vitals: Vitals {
                blood_pressure: bp.map(|(s, d)| format!("{}/{}", s, d)),
                heart_rate: hr.map(|v| v.to_string()),
                temperature: temp.map(str::to_string),
                oxygen_saturation: spo2.map(|v| format!("{}%", v)),
            },
            ..Default::default()
        })
}

proptest! {
    /// Scoring the same set twice gives the same result.
    #[test]
    fn scoring_is_deterministic(set in arb_signal_set()) {
        prop_assert_eq!(score(&set), score(&set));
    }

    /// Confidence never leaves [0, 98].
    #[test]
    fn confidence_is_bounded(set in arb_signal_set()) {
        prop_assert!(score(&set).confidence <= CONFIDENCE_CEILING);
    }

    /// Appending an emergency keyword never lowers severity or urgency and
    /// always lands on critical / emergency.
    #[test]
    fn emergency_signal_is_monotone(set in arb_signal_set(), system in prop::sample::select(SYSTEMS.to_vec())) {
        let before = score(&set);
        let mut extended = set.clone();
        extended.push(Signal::keyword(system, Tier::Emergency, Condition::CardiacEmergency, "collapse"));
        let after = score(&extended);

        prop_assert!(after.severity >= before.severity);
        prop_assert!(after.urgency >= before.urgency);
        prop_assert_eq!(after.severity, Severity::Critical);
        prop_assert_eq!(after.urgency, Urgency::Emergency);
        prop_assert!(after.confidence >= before.confidence);
    }

    /// Every signal, keyword or band, lifts severity to at least its tier floor.
    #[test]
    fn severity_respects_every_tier_floor(case in arb_case()) {
        let set = SignalExtractor::default().extract(&case);
        let result = score(&set);
        for signal in &set.signals {
            prop_assert_eq!(signal.severity, signal.tier.severity_floor());
            prop_assert!(result.severity >= signal.tier.severity_floor());
            prop_assert!(result.urgency >= signal.tier.urgency_floor());
        }
    }

    /// Condition tags come out deduplicated.
    #[test]
    fn conditions_are_unique(set in arb_signal_set()) {
        let result = score(&set);
        let mut sorted: Vec<_> = result.conditions.iter().map(|c| c.as_str()).collect();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), result.conditions.len());
    }

    /// Extraction plus scoring is deterministic and bounded for arbitrary cases,
    /// and synthesis always yields a medication.
    #[test]
    fn case_pipeline_invariants(case in arb_case()) {
        let extractor = SignalExtractor::default();
        let first = score(&extractor.extract(&case));
        let second = score(&extractor.extract(&case));
        prop_assert_eq!(&first, &second);
        prop_assert!(first.confidence <= CONFIDENCE_CEILING);

        let synthesis = Synthesizer::new().synthesize(
            &first.conditions,
            first.severity,
            &PatientProfile::from(&case),
        );
        prop_assert!(!synthesis.medications.is_empty());
        for medication in &synthesis.medications {
            prop_assert!(medication.is_documented());
        }
    }
}

#[test]
fn dizzy_and_tired_stays_generic() {
    let case = PatientCase {
        chief_complaint: Some("feeling dizzy and tired".into()),
        ..Default::default()
    };
    let set = SignalExtractor::default().extract(&case);
    assert!(!set.is_empty());
    assert!(set.signals.iter().all(|s| !s.system.is_specific()));
}

#[test]
fn fever_units_share_a_band() {
    let band = |temperature: &str| {
        let case = PatientCase {
            vitals: Vitals {
                temperature: Some(temperature.into()),
                ..Default::default()
            },
            ..Default::default()
        };
        score(&SignalExtractor::default().extract(&case)).conditions
    };
    assert_eq!(band("39.5 C"), band("103.1 F"));
    assert_eq!(band("39.5 C"), vec![Condition::HighFever]);
}
