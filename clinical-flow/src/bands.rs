//! Fixed numeric bands for vitals and labs.
//!
//! Each function returns at most one signal: the highest band the value falls in.

use crate::case::{BloodPressure, Sex};
use crate::condition::Condition;
use crate::signals::{OrganSystem, Signal, SignalKind, Tier};

pub fn blood_pressure(bp: BloodPressure) -> Option<Signal> {
    let BloodPressure {
        systolic,
        diastolic,
    } = bp;
    let reading = format!("{:.0}/{:.0} mmHg", systolic, diastolic);

    let (tier, condition, label) = if systolic >= 180.0 || diastolic >= 120.0 {
        (
            Tier::Emergency,
            Condition::HypertensiveCrisis,
            format!("Blood pressure {} is in hypertensive crisis range (>=180/120)", reading),
        )
    } else if systolic >= 140.0 || diastolic >= 90.0 {
        (
            Tier::Urgent,
            Condition::HypertensionStage2,
            format!("Blood pressure {} indicates stage 2 hypertension", reading),
        )
    } else if systolic >= 130.0 || diastolic >= 80.0 {
        (
            Tier::Routine,
            Condition::HypertensionStage1,
            format!("Blood pressure {} indicates stage 1 hypertension", reading),
        )
    } else if systolic < 90.0 {
        (
            Tier::Urgent,
            Condition::Hypotension,
            format!("Blood pressure {} indicates hypotension", reading),
        )
    } else {
        return None;
    };

    Some(vital(OrganSystem::Cardiovascular, tier, condition, label))
}

pub fn heart_rate(bpm: f64) -> Option<Signal> {
    let (tier, condition, label) = if bpm >= 130.0 {
        (
            Tier::Urgent,
            Condition::Tachycardia,
            format!("Heart rate {:.0} bpm indicates marked tachycardia", bpm),
        )
    } else if bpm > 100.0 {
        (
            Tier::Routine,
            Condition::Tachycardia,
            format!("Heart rate {:.0} bpm indicates tachycardia", bpm),
        )
    } else if bpm < 40.0 {
        (
            Tier::Urgent,
            Condition::Bradycardia,
            format!("Heart rate {:.0} bpm indicates marked bradycardia", bpm),
        )
    } else if bpm < 50.0 {
        (
            Tier::Routine,
            Condition::Bradycardia,
            format!("Heart rate {:.0} bpm indicates bradycardia", bpm),
        )
    } else {
        return None;
    };

    Some(vital(OrganSystem::Cardiovascular, tier, condition, label))
}

/// Temperature in Celsius. Fever is a non-specific finding and stays `General`.
pub fn temperature(celsius: f64) -> Option<Signal> {
    let (tier, condition, label) = if celsius >= 40.0 {
        (
            Tier::Urgent,
            Condition::Hyperpyrexia,
            format!("Temperature {:.1} °C indicates hyperpyrexia", celsius),
        )
    } else if celsius >= 39.0 {
        (
            Tier::Urgent,
            Condition::HighFever,
            format!("Temperature {:.1} °C indicates high fever", celsius),
        )
    } else if celsius >= 38.0 {
        (
            Tier::Routine,
            Condition::Fever,
            format!("Temperature {:.1} °C indicates fever", celsius),
        )
    } else if celsius < 35.0 {
        (
            Tier::Urgent,
            Condition::Hypothermia,
            format!("Temperature {:.1} °C indicates hypothermia", celsius),
        )
    } else {
        return None;
    };

    Some(vital(OrganSystem::General, tier, condition, label))
}

pub fn oxygen_saturation(percent: f64) -> Option<Signal> {
    if percent < 90.0 {
        Some(vital(
            OrganSystem::Respiratory,
            Tier::Emergency,
            Condition::SevereHypoxemia,
            format!("Oxygen saturation {:.0}% indicates severe hypoxemia", percent),
        ))
    } else if percent < 95.0 {
        Some(vital(
            OrganSystem::Respiratory,
            Tier::Urgent,
            Condition::Hypoxemia,
            format!("Oxygen saturation {:.0}% indicates hypoxemia", percent),
        ))
    } else {
        None
    }
}

/// White cell count in 10^9/L. Values entered per µL are rescaled.
pub fn white_cell_count(value: f64) -> Option<Signal> {
    let wbc = if value > 1000.0 { value / 1000.0 } else { value };
    let (tier, condition, label) = if wbc >= 20.0 {
        (
            Tier::Urgent,
            Condition::Leukocytosis,
            format!("WBC {:.1} x10^9/L indicates marked leukocytosis", wbc),
        )
    } else if wbc > 11.0 {
        (
            Tier::Routine,
            Condition::Leukocytosis,
            format!("WBC {:.1} x10^9/L indicates leukocytosis", wbc),
        )
    } else if wbc < 1.0 {
        (
            Tier::Urgent,
            Condition::Leukopenia,
            format!("WBC {:.1} x10^9/L indicates severe leukopenia", wbc),
        )
    } else if wbc < 4.0 {
        (
            Tier::Routine,
            Condition::Leukopenia,
            format!("WBC {:.1} x10^9/L indicates leukopenia", wbc),
        )
    } else {
        return None;
    };

    Some(lab(OrganSystem::Hematologic, tier, condition, label))
}

/// Hemoglobin in g/dL (g/L is rescaled). The anemia threshold is sex-specific.
pub fn hemoglobin(value: f64, sex: Option<Sex>) -> Option<Signal> {
    let hgb = if value > 25.0 { value / 10.0 } else { value };
    let threshold = match sex {
        Some(Sex::Male) => 13.0,
        _ => 12.0,
    };

    if hgb < 7.0 {
        Some(lab(
            OrganSystem::Hematologic,
            Tier::Urgent,
            Condition::SevereAnemia,
            format!("Hemoglobin {:.1} g/dL indicates severe anemia", hgb),
        ))
    } else if hgb < threshold {
        Some(lab(
            OrganSystem::Hematologic,
            Tier::Routine,
            Condition::Anemia,
            format!(
                "Hemoglobin {:.1} g/dL is below the {:.0} g/dL threshold (anemia)",
                hgb, threshold
            ),
        ))
    } else {
        None
    }
}

/// Platelets in 10^9/L (per µL is rescaled).
pub fn platelets(value: f64) -> Option<Signal> {
    let plt = if value > 5000.0 { value / 1000.0 } else { value };
    if plt < 50.0 {
        Some(lab(
            OrganSystem::Hematologic,
            Tier::Urgent,
            Condition::Thrombocytopenia,
            format!("Platelets {:.0} x10^9/L indicate severe thrombocytopenia", plt),
        ))
    } else if plt < 150.0 {
        Some(lab(
            OrganSystem::Hematologic,
            Tier::Routine,
            Condition::Thrombocytopenia,
            format!("Platelets {:.0} x10^9/L indicate thrombocytopenia", plt),
        ))
    } else if plt > 450.0 {
        Some(lab(
            OrganSystem::Hematologic,
            Tier::Routine,
            Condition::Thrombocytosis,
            format!("Platelets {:.0} x10^9/L indicate thrombocytosis", plt),
        ))
    } else {
        None
    }
}

/// Creatinine in mg/dL (µmol/L is rescaled).
pub fn creatinine(value: f64) -> Option<Signal> {
    let cr = if value > 20.0 { value / 88.4 } else { value };
    if cr >= 3.0 {
        Some(lab(
            OrganSystem::Renal,
            Tier::Urgent,
            Condition::AcuteKidneyInjury,
            format!("Creatinine {:.1} mg/dL suggests acute kidney injury", cr),
        ))
    } else if cr > 1.3 {
        Some(lab(
            OrganSystem::Renal,
            Tier::Routine,
            Condition::RenalImpairment,
            format!("Creatinine {:.1} mg/dL suggests renal impairment", cr),
        ))
    } else {
        None
    }
}

fn vital(system: OrganSystem, tier: Tier, condition: Condition, label: String) -> Signal {
    Signal::band(SignalKind::Vital, system, tier, condition, label)
}

fn lab(system: OrganSystem, tier: Tier, condition: Condition, label: String) -> Signal {
    Signal::band(SignalKind::Lab, system, tier, condition, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Severity;

    fn bp(systolic: f64, diastolic: f64) -> Option<Condition> {
        blood_pressure(BloodPressure {
            systolic,
            diastolic,
        })
        .and_then(|s| s.condition)
    }

    #[test]
    fn blood_pressure_bands() {
        assert_eq!(bp(185.0, 125.0), Some(Condition::HypertensiveCrisis));
        assert_eq!(bp(150.0, 118.0), Some(Condition::HypertensionStage2));
        assert_eq!(bp(125.0, 122.0), Some(Condition::HypertensiveCrisis));
        assert_eq!(bp(134.0, 78.0), Some(Condition::HypertensionStage1));
        assert_eq!(bp(118.0, 76.0), None);
        assert_eq!(bp(82.0, 50.0), Some(Condition::Hypotension));
    }

    #[test]
    fn stage_two_hypertension_is_urgent_and_severe() {
        let signal = blood_pressure(BloodPressure {
            systolic: 152.0,
            diastolic: 94.0,
        })
        .unwrap();
        assert_eq!(signal.tier, Tier::Urgent);
        assert_eq!(signal.severity, Severity::Severe);
        assert_eq!(signal.kind, SignalKind::Vital);
    }

    #[test]
    fn band_severity_follows_the_tier_floor() {
        let bands = [
            blood_pressure(BloodPressure {
                systolic: 185.0,
                diastolic: 125.0,
            }),
            blood_pressure(BloodPressure {
                systolic: 150.0,
                diastolic: 95.0,
            }),
            blood_pressure(BloodPressure {
                systolic: 134.0,
                diastolic: 78.0,
            }),
            heart_rate(135.0),
            heart_rate(45.0),
            temperature(39.5),
            temperature(38.2),
            oxygen_saturation(86.0),
            oxygen_saturation(92.0),
            white_cell_count(24.0),
            white_cell_count(3.1),
            hemoglobin(6.0, None),
            platelets(40.0),
            creatinine(1.6),
        ];
        for signal in bands.into_iter().flatten() {
            assert_eq!(signal.severity, signal.tier.severity_floor(), "{}", signal.label);
        }
        assert_eq!(oxygen_saturation(92.0).unwrap().severity, Severity::Severe);
        assert_eq!(temperature(39.5).unwrap().severity, Severity::Severe);
        assert_eq!(white_cell_count(24.0).unwrap().severity, Severity::Severe);
    }

    #[test]
    fn hemoglobin_threshold_depends_on_sex() {
        assert_eq!(
            hemoglobin(12.5, Some(Sex::Male)).and_then(|s| s.condition),
            Some(Condition::Anemia)
        );
        assert!(hemoglobin(12.5, Some(Sex::Female)).is_none());
        assert_eq!(
            hemoglobin(64.0, None).and_then(|s| s.condition),
            Some(Condition::SevereAnemia)
        );
    }

    #[test]
    fn unit_rescaling_for_labs() {
        assert_eq!(
            white_cell_count(15500.0).and_then(|s| s.condition),
            Some(Condition::Leukocytosis)
        );
        assert_eq!(
            platelets(90000.0).and_then(|s| s.condition),
            Some(Condition::Thrombocytopenia)
        );
        assert_eq!(
            creatinine(300.0).and_then(|s| s.condition),
            Some(Condition::AcuteKidneyInjury)
        );
        assert!(creatinine(80.0).is_none());
    }

    #[test]
    fn temperature_bands() {
        assert_eq!(temperature(40.2).and_then(|s| s.condition), Some(Condition::Hyperpyrexia));
        assert_eq!(temperature(39.5).and_then(|s| s.condition), Some(Condition::HighFever));
        assert_eq!(temperature(38.2).and_then(|s| s.condition), Some(Condition::Fever));
        assert_eq!(temperature(34.0).and_then(|s| s.condition), Some(Condition::Hypothermia));
        assert!(temperature(37.0).is_none());
        assert_eq!(temperature(39.5).unwrap().system, OrganSystem::General);
    }
}
