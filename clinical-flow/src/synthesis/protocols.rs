use crate::condition::Condition;
use crate::scoring::Severity;
use crate::synthesis::{PatientProfile, ProtocolInput, TreatmentPlan, TreatmentRecommendation};
use crate::case::Sex;

/// A protocol block: a membership test over condition tags and the items it
/// contributes when it applies.
pub struct Protocol {
    pub name: &'static str,
    pub applies: fn(&ProtocolInput<'_>) -> bool,
    pub apply: fn(&ProtocolInput<'_>, &mut TreatmentPlan),
}

pub const PROTOCOLS: &[Protocol] = &[
    Protocol {
        name: "cardiac_emergency",
        applies: |input| {
            input.has(Condition::CardiacEmergency)
                || (input.has(Condition::ChestPain) && input.severity >= Severity::Severe)
        },
        apply: cardiac_emergency,
    },
    Protocol {
        name: "respiratory_emergency",
        applies: |input| {
            input.has_any(&[Condition::RespiratoryEmergency, Condition::SevereHypoxemia])
        },
        apply: respiratory_emergency,
    },
    Protocol {
        name: "hypertensive_crisis",
        applies: |input| input.has(Condition::HypertensiveCrisis),
        apply: hypertensive_crisis,
    },
    Protocol {
        name: "hypertension_stage_2",
        applies: |input| input.has(Condition::HypertensionStage2),
        apply: hypertension_stage_2,
    },
    Protocol {
        name: "hypertension_stage_1",
        applies: |input| input.has(Condition::HypertensionStage1),
        apply: hypertension_stage_1,
    },
    Protocol {
        name: "infection_fever",
        applies: |input| {
            input.has_any(&[
                Condition::Sepsis,
                Condition::Infection,
                Condition::Fever,
                Condition::HighFever,
                Condition::Hyperpyrexia,
                Condition::Leukocytosis,
            ])
        },
        apply: infection_fever,
    },
    Protocol {
        name: "pain",
        applies: |input| input.has_any(&[Condition::Pain, Condition::Headache]),
        apply: pain,
    },
    Protocol {
        name: "neurological",
        applies: |input| {
            input.has_any(&[Condition::NeurologicalEmergency, Condition::Neurological])
        },
        apply: neurological,
    },
    Protocol {
        name: "anemia",
        applies: |input| input.has_any(&[Condition::Anemia, Condition::SevereAnemia]),
        apply: anemia,
    },
    Protocol {
        name: "fatigue_weakness",
        applies: |input| input.has_any(&[Condition::Fatigue, Condition::Dizziness]),
        apply: fatigue_weakness,
    },
    Protocol {
        name: "allergic",
        applies: |input| input.has_any(&[Condition::Anaphylaxis, Condition::AllergicReaction]),
        apply: allergic,
    },
    Protocol {
        name: "anxiety",
        applies: |input| input.has_any(&[Condition::Anxiety, Condition::PsychiatricEmergency]),
        apply: anxiety,
    },
];

fn cardiac_emergency(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    plan.recommend("Call emergency services immediately; do not drive to the hospital");
    plan.recommend("Obtain a 12-lead ECG within 10 minutes of arrival");
    plan.monitor("Continuous cardiac monitoring");
    plan.monitor("Serial troponin at presentation and 3 hours");

    let mut aspirin = TreatmentRecommendation::new("Aspirin", "Antiplatelet")
        .dose("325 mg")
        .route("Oral (chewed)")
        .frequency("Once")
        .rationale("Limits thrombus propagation in suspected acute coronary syndrome")
        .alternative("Clopidogrel 300 mg loading dose if aspirin allergy")
        .precaution("Avoid with active bleeding or known aspirin allergy");
    if input.patient.age.is_some_and(|a| a >= 75) {
        aspirin = aspirin.precaution("Higher bleeding risk at age 75 and over");
    }
    if input.has(Condition::Thrombocytopenia) {
        aspirin = aspirin.precaution("Low platelet count: weigh bleeding risk before dosing");
    }
    plan.medicate(aspirin);

    if input.has(Condition::Hypotension) {
        plan.recommend("Withhold nitrates while hypotensive");
    } else {
        plan.medicate(
            TreatmentRecommendation::new("Nitroglycerin", "Nitrate")
                .dose("0.4 mg")
                .route("Sublingual")
                .frequency("Every 5 minutes, up to 3 doses")
                .rationale("Relieves ischemic chest pain by reducing preload")
                .alternative("Intravenous nitroglycerin infusion under monitoring")
                .precaution("Contraindicated if systolic BP < 90 mmHg")
                .precaution("Contraindicated within 48 hours of a PDE-5 inhibitor"),
        );
    }

    smoking_cessation(input.patient, plan);
}

fn respiratory_emergency(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    plan.recommend("Seek emergency care immediately");
    plan.recommend("Sit upright and minimise exertion");
    plan.monitor("Continuous pulse oximetry");
    plan.monitor("Respiratory rate every 15 minutes");

    plan.medicate(
        TreatmentRecommendation::new("Oxygen", "Medical gas")
            .dose("Titrate to SpO2 94-98% (88-92% with chronic CO2 retention)")
            .route("Nasal cannula or face mask")
            .frequency("Continuous")
            .rationale("Corrects hypoxemia")
            .alternative("High-flow nasal oxygen")
            .alternative("Non-invasive ventilation")
            .precaution("Watch for hypercapnia in chronic lung disease"),
    );
    plan.medicate(
        TreatmentRecommendation::new("Albuterol", "Short-acting beta agonist")
            .dose("2.5 mg")
            .route("Nebulized")
            .frequency("Every 20 minutes, up to 3 doses")
            .rationale("Reverses bronchospasm when wheeze is present")
            .alternative("Levalbuterol 1.25 mg nebulized")
            .alternative("Ipratropium 0.5 mg nebulized")
            .precaution("May cause tachycardia and tremor"),
    );

    smoking_cessation(input.patient, plan);
}

fn hypertensive_crisis(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    plan.recommend(
        "Emergency evaluation for target-organ damage (chest pain, neurological deficit, vision change)",
    );
    plan.recommend("Lower blood pressure by no more than 25% within the first hour");
    plan.monitor("Blood pressure every 15 minutes");
    plan.monitor("Renal function and urinalysis");

    let mut labetalol = TreatmentRecommendation::new("Labetalol", "Alpha/beta blocker")
        .dose("20 mg over 2 minutes, then 40-80 mg every 10 minutes (max 300 mg)")
        .route("Intravenous")
        .frequency("Titrated to response")
        .rationale("Controlled reduction of severely elevated blood pressure")
        .alternative("Nicardipine infusion 5 mg/h, titrated by 2.5 mg/h")
        .alternative("Hydralazine 10-20 mg IV")
        .precaution("Avoid in asthma, bradycardia or heart block");
    if input.has(Condition::Bradycardia) {
        labetalol = labetalol.precaution("Bradycardia present: prefer nicardipine");
    }
    plan.medicate(labetalol);

    smoking_cessation(input.patient, plan);
}

fn hypertension_stage_2(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    plan.recommend("Start antihypertensive therapy alongside lifestyle modification");
    plan.recommend("Reduce sodium intake below 2,300 mg/day (DASH diet)");
    plan.recommend("Aerobic exercise 150 minutes per week");
    plan.monitor("Home blood pressure log twice daily");
    plan.monitor("Basic metabolic panel 2-4 weeks after starting therapy");

    let mut amlodipine = TreatmentRecommendation::new("Amlodipine", "Calcium channel blocker")
        .dose("5 mg")
        .frequency("Once daily")
        .rationale("First-line agent for stage 2 hypertension")
        .alternative("Chlorthalidone 12.5 mg once daily")
        .precaution("May cause ankle oedema");
    if input.patient.is_older_adult() {
        amlodipine = amlodipine.precaution("Start at 2.5 mg in adults 65 and over");
    }
    plan.medicate(amlodipine);

    if input.patient.could_be_pregnant() {
        plan.recommend("Avoid ACE inhibitors and ARBs until pregnancy is excluded");
    } else {
        let mut lisinopril = TreatmentRecommendation::new("Lisinopril", "ACE inhibitor")
            .dose("10 mg")
            .frequency("Once daily")
            .rationale("Combination therapy is usually needed to reach target in stage 2")
            .alternative("Losartan 50 mg once daily if ACE inhibitor cough")
            .precaution("Check potassium and creatinine after starting")
            .precaution("Contraindicated in pregnancy");
        if input.has_any(&[Condition::RenalImpairment, Condition::AcuteKidneyInjury]) {
            lisinopril = lisinopril
                .precaution("Reduced renal function: start at 5 mg and recheck creatinine in 1-2 weeks");
        }
        plan.medicate(lisinopril);
    }

    alcohol_limit(input.patient, plan);
    smoking_cessation(input.patient, plan);
}

fn hypertension_stage_1(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    plan.recommend("Reduce sodium intake below 2,300 mg/day (DASH diet)");
    plan.recommend("Aerobic exercise 150 minutes per week");
    plan.recommend("Recheck blood pressure in 3-6 months");
    plan.monitor("Home blood pressure monitoring");

    let mut amlodipine = TreatmentRecommendation::new("Amlodipine", "Calcium channel blocker")
        .dose("2.5 mg")
        .frequency("Once daily")
        .rationale(
            "Only if blood pressure stays above target after 3-6 months of lifestyle change",
        )
        .alternative("Hydrochlorothiazide 12.5 mg once daily");
    if input.patient.could_be_pregnant() {
        amlodipine = amlodipine.precaution("Confirm pregnancy status before any antihypertensive");
    } else {
        amlodipine = amlodipine.alternative("Lisinopril 5 mg once daily");
    }
    if input.patient.is_older_adult() {
        amlodipine = amlodipine.precaution("Watch for orthostatic hypotension in older adults");
    }
    plan.medicate(amlodipine);

    alcohol_limit(input.patient, plan);
    smoking_cessation(input.patient, plan);
}

fn infection_fever(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    if input.has(Condition::Sepsis) {
        plan.recommend("Emergency evaluation for sepsis: blood cultures and lactate before antibiotics");
        plan.monitor("Vital signs every 15 minutes");
    }
    if input.has_any(&[Condition::Infection, Condition::Leukocytosis]) {
        plan.recommend("Clinical evaluation to determine the need for antibiotics");
        plan.monitor("Repeat CBC in 48-72 hours");
    }
    if input.has(Condition::Hyperpyrexia) {
        plan.recommend("Active cooling measures and urgent assessment");
    }
    plan.recommend("Maintain hydration with oral fluids");
    plan.monitor("Temperature twice daily");

    let renal = input.has_any(&[Condition::RenalImpairment, Condition::AcuteKidneyInjury]);
    let alternative = if renal {
        "Tepid sponging and cooling (NSAIDs avoided with reduced renal function)".to_string()
    } else if input.patient.is_child() {
        "Ibuprofen 10 mg/kg every 6-8 hours with food".to_string()
    } else {
        "Ibuprofen 400 mg every 6-8 hours with food".to_string()
    };
    plan.medicate(
        acetaminophen(input.patient, "650 mg")
            .rationale("Reduces fever and associated discomfort")
            .alternative(alternative),
    );
}

fn pain(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    if input.has(Condition::Pain) {
        plan.recommend("Rest, with ice or heat to the affected area");
    }
    if input.has(Condition::Headache) {
        plan.recommend("Keep a headache diary; seek urgent care for a sudden or worst-ever headache");
    }
    plan.monitor("Pain score at each review");

    let avoid_nsaid = input.has_any(&[
        Condition::RenalImpairment,
        Condition::AcuteKidneyInjury,
        Condition::Thrombocytopenia,
        Condition::GastrointestinalEmergency,
    ]);

    if avoid_nsaid {
        plan.medicate(
            acetaminophen(input.patient, "650 mg")
                .rationale("Analgesia without renal or platelet effects")
                .alternative("Topical diclofenac gel for localised pain"),
        );
        return;
    }

    let mut ibuprofen = TreatmentRecommendation::new("Ibuprofen", "NSAID")
        .dose(if input.patient.is_child() {
            "10 mg/kg"
        } else {
            "400 mg"
        })
        .frequency("Every 6-8 hours with food")
        .rationale("Anti-inflammatory analgesia")
        .alternative("Acetaminophen 650 mg every 6 hours")
        .alternative("Naproxen 250-500 mg twice daily")
        .precaution("Gastrointestinal bleeding risk; take with food");
    if input.patient.is_older_adult() {
        ibuprofen = ibuprofen.precaution("Use the lowest effective dose for the shortest time at 65+");
    }
    if input.conditions.iter().any(|c| c.is_hypertension()) {
        ibuprofen = ibuprofen.precaution("NSAIDs can raise blood pressure");
    }
    plan.medicate(ibuprofen);
}

fn neurological(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    if input.has(Condition::NeurologicalEmergency) {
        plan.recommend("Activate the stroke/seizure emergency pathway; call emergency services");
        plan.recommend("Record the time of symptom onset (last known well)");
        plan.recommend("Do not give aspirin until intracranial haemorrhage is excluded by imaging");
        plan.monitor("Neurological checks every 15 minutes");
        plan.monitor("Point-of-care blood glucose");
    }
    if input.has(Condition::Neurological) {
        plan.recommend("Prompt neurological examination");
        plan.monitor("Neurological status checks");
    }
}

fn anemia(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    let patient = input.patient;
    if input.has(Condition::SevereAnemia) {
        plan.recommend("Urgent evaluation for transfusion and source of blood loss");
    }
    plan.monitor("Repeat CBC and ferritin in 4-6 weeks");

    let base = TreatmentRecommendation::new("Ferrous sulfate", "Iron supplement")
        .alternative("Ferrous gluconate 324 mg")
        .alternative("Intravenous iron sucrose if oral iron is not tolerated")
        .precaution("Take on an empty stomach with vitamin C; separate from antacids by 2 hours")
        .precaution("May darken stools");

    let menstruating =
        patient.sex == Some(Sex::Female) && patient.age.is_none_or(|a| (12..=50).contains(&a));

    let iron = if patient.is_child() {
        base.dose("3 mg/kg elemental iron")
            .frequency("Once daily")
            .rationale("Weight-based iron repletion in children")
    } else if menstruating {
        base.dose("325 mg (65 mg elemental iron)")
            .frequency("Once daily")
            .rationale("Replaces ongoing menstrual iron losses")
    } else {
        plan.recommend(
            "Evaluate for gastrointestinal blood loss (iron deficiency in men and postmenopausal women)",
        );
        base.dose("325 mg (65 mg elemental iron)")
            .frequency("Every other day")
            .rationale("Alternate-day dosing improves absorption and tolerance")
    };
    plan.medicate(iron);

    if patient.could_be_pregnant() && !patient.is_child() {
        plan.medicate(
            TreatmentRecommendation::new("Folic acid", "Vitamin supplement")
                .dose("400 mcg")
                .frequency("Once daily")
                .rationale("Supports red cell production and neural tube protection if pregnancy occurs")
                .alternative("Prenatal multivitamin containing folate"),
        );
    }
}

fn fatigue_weakness(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    let patient = input.patient;
    if input.has(Condition::Fatigue) {
        plan.recommend("Screening labs: CBC, TSH, metabolic panel, vitamin D and B12");
        plan.recommend("Sleep hygiene and graded daily activity");
    }
    if input.has(Condition::Dizziness) {
        plan.recommend("Rise slowly from lying or sitting");
        plan.recommend("Maintain hydration with oral fluids");
        plan.monitor("Orthostatic blood pressure");
    }
    if patient.alcohol {
        plan.recommend("Reduce alcohol intake; alcohol worsens fatigue and sleep quality");
    }

    let over_fifty = patient.age.is_some_and(|a| a >= 50);
    let supplement = match (patient.sex, over_fifty) {
        (Some(Sex::Female), true) => {
            TreatmentRecommendation::new("Calcium carbonate with vitamin D3", "Supplement")
                .dose("600 mg / 800 IU")
                .frequency("Once daily with food")
                .rationale("Bone health support after menopause")
                .alternative("Calcium citrate 600 mg with vitamin D3 800 IU")
                .precaution("Separate from iron and thyroid medication by 4 hours")
        }
        (_, true) => TreatmentRecommendation::new("Vitamin D3", "Supplement")
            .dose("1000 IU")
            .frequency("Once daily")
            .rationale("Low vitamin D is common after 50 and contributes to fatigue and weakness")
            .alternative("Vitamin D3 2000 IU daily if deficient on testing"),
        (_, false) => TreatmentRecommendation::new("Vitamin B12 (cyanocobalamin)", "Supplement")
            .dose("1000 mcg")
            .frequency("Once daily")
            .rationale("Empiric support while deficiency work-up is pending")
            .alternative("Daily multivitamin"),
    };
    plan.medicate(supplement);
}

fn allergic(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    let patient = input.patient;
    if input.has(Condition::Anaphylaxis) {
        plan.recommend("Call emergency services");
        plan.recommend("Lie flat with legs raised unless breathing is difficult");
        plan.monitor("Observe for a biphasic reaction for at least 4-6 hours");

        let small = patient.is_child() || patient.weight_kg.is_some_and(|w| w < 30.0);
        plan.medicate(
            TreatmentRecommendation::new("Epinephrine", "Sympathomimetic")
                .dose(if small { "0.15 mg (1 mg/mL)" } else { "0.3 mg (1 mg/mL)" })
                .route("Intramuscular, anterolateral thigh")
                .frequency("Repeat every 5-15 minutes if no improvement")
                .rationale("First-line treatment for anaphylaxis")
                .alternative(if small {
                    "Epinephrine auto-injector 0.15 mg"
                } else {
                    "Epinephrine auto-injector 0.3 mg"
                })
                .precaution("Do not delay for antihistamines or steroids"),
        );
    }

    if input.has(Condition::AllergicReaction) {
        plan.recommend("Identify and avoid the trigger");

        let mut cetirizine = TreatmentRecommendation::new("Cetirizine", "Antihistamine")
            .dose(if patient.is_child() { "5 mg" } else { "10 mg" })
            .frequency("Once daily")
            .rationale("Relieves urticaria, itching and allergic rhinitis")
            .alternative("Loratadine 10 mg once daily")
            .precaution("May cause drowsiness");
        if patient.is_older_adult() {
            cetirizine =
                cetirizine.precaution("Avoid sedating antihistamines such as diphenhydramine at 65+");
        } else {
            cetirizine = cetirizine.alternative("Diphenhydramine 25-50 mg every 6 hours (sedating)");
        }
        if patient.alcohol {
            cetirizine = cetirizine.precaution("Avoid alcohol: additive sedation");
        }
        plan.medicate(cetirizine);
    }
}

fn anxiety(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    let patient = input.patient;
    if input.has(Condition::PsychiatricEmergency) {
        plan.recommend("Do not leave the patient alone; contact a crisis line (988) or emergency services");
        plan.recommend("Remove access to means of self-harm");
        plan.monitor("Continuous observation until mental health assessment");
    }

    if input.has(Condition::Anxiety) {
        plan.recommend("Structured breathing exercises and grounding techniques");
        plan.recommend("Referral for cognitive behavioural therapy");

        let mut hydroxyzine = TreatmentRecommendation::new("Hydroxyzine", "Antihistamine anxiolytic")
            .dose("25 mg")
            .frequency("Up to 4 times daily as needed")
            .rationale("Short-term relief of acute anxiety without dependence risk")
            .alternative("Sertraline 25-50 mg once daily for persistent anxiety")
            .precaution("Sedating; avoid driving until the effect is known");
        if patient.is_older_adult() {
            hydroxyzine =
                hydroxyzine.precaution("Anticholinergic effects at 65+: prefer sertraline");
        }
        if patient.alcohol {
            hydroxyzine = hydroxyzine.precaution("Avoid alcohol: additive sedation");
            plan.recommend("Reduce alcohol use; alcohol worsens anxiety over time");
        }
        plan.medicate(hydroxyzine);
    }
}

/// Generic fallback used when no block produced a medication.
pub fn supportive_care(input: &ProtocolInput<'_>, plan: &mut TreatmentPlan) {
    plan.recommend("Supportive care: rest, oral hydration and symptom monitoring");
    plan.recommend("Seek care promptly if symptoms worsen or new symptoms develop");
    plan.medicate(
        acetaminophen(input.patient, "500 mg")
            .rationale("Symptomatic relief of mild discomfort or fever")
            .alternative("Ibuprofen 200-400 mg every 6-8 hours with food"),
    );
}

/// Acetaminophen with weight-based dosing for children and an alcohol-aware
/// daily maximum.
fn acetaminophen(patient: &PatientProfile, adult_dose: &str) -> TreatmentRecommendation {
    let dose = match (patient.is_child(), patient.weight_kg) {
        (true, Some(weight)) => format!("{:.0} mg (15 mg/kg)", weight * 15.0),
        (true, None) => "15 mg/kg".to_string(),
        (false, _) => adult_dose.to_string(),
    };
    let ceiling = if patient.alcohol {
        "Regular alcohol use: do not exceed 2 g per day"
    } else if patient.is_child() {
        "Do not exceed 5 doses in 24 hours"
    } else {
        "Do not exceed 3 g per day"
    };
    TreatmentRecommendation::new("Acetaminophen", "Analgesic/antipyretic")
        .dose(dose)
        .frequency("Every 6 hours as needed")
        .precaution(ceiling)
}

fn smoking_cessation(patient: &PatientProfile, plan: &mut TreatmentPlan) {
    if patient.smoking {
        plan.recommend("Smoking cessation counselling; offer nicotine replacement therapy");
    }
}

fn alcohol_limit(patient: &PatientProfile, plan: &mut TreatmentPlan) {
    if patient.alcohol {
        plan.recommend("Limit alcohol to no more than 1-2 drinks per day");
    }
}
