//! Signal extraction: turns a [`PatientCase`] into tagged observations.
//!
//! Extraction never fails. A missing, blank or unparsable reading produces no
//! signal for that field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bands;
use crate::case::{PatientCase, parse_blood_pressure, parse_measurement, parse_temperature};
use crate::condition::Condition;
use crate::scoring::{Severity, Urgency};
use crate::taxonomy::Taxonomy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganSystem {
    Cardiovascular,
    Respiratory,
    Neurological,
    Gastrointestinal,
    Immunologic,
    Psychiatric,
    Musculoskeletal,
    Infectious,
    Hematologic,
    Renal,
    /// Non-specific findings that must not be attributed to one organ system.
    General,
}

impl OrganSystem {
    pub fn is_specific(&self) -> bool {
        *self != OrganSystem::General
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrganSystem::Cardiovascular => "cardiovascular",
            OrganSystem::Respiratory => "respiratory",
            OrganSystem::Neurological => "neurological",
            OrganSystem::Gastrointestinal => "gastrointestinal",
            OrganSystem::Immunologic => "immunologic",
            OrganSystem::Psychiatric => "psychiatric",
            OrganSystem::Musculoskeletal => "musculoskeletal",
            OrganSystem::Infectious => "infectious",
            OrganSystem::Hematologic => "hematologic",
            OrganSystem::Renal => "renal",
            OrganSystem::General => "general",
        }
    }
}

impl fmt::Display for OrganSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity class of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Emergency,
    Urgent,
    Routine,
    Symptom,
}

impl Tier {
    pub fn weight(&self) -> u32 {
        match self {
            Tier::Emergency => 30,
            Tier::Urgent => 20,
            Tier::Routine => 10,
            Tier::Symptom => 5,
        }
    }

    pub fn severity_floor(&self) -> Severity {
        match self {
            Tier::Emergency => Severity::Critical,
            Tier::Urgent => Severity::Severe,
            Tier::Routine => Severity::Mild,
            Tier::Symptom => Severity::Normal,
        }
    }

    pub fn urgency_floor(&self) -> Urgency {
        match self {
            Tier::Emergency => Urgency::Emergency,
            Tier::Urgent => Urgency::Urgent,
            Tier::Routine | Tier::Symptom => Urgency::Routine,
        }
    }

    /// Tiers that count as corroborating evidence across organ systems.
    pub fn is_significant(&self) -> bool {
        !matches!(self, Tier::Routine)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Emergency => "emergency",
            Tier::Urgent => "urgent",
            Tier::Routine => "routine",
            Tier::Symptom => "symptom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Keyword,
    Vital,
    Lab,
}

/// A discrete observation extracted from a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub system: OrganSystem,
    pub tier: Tier,
    pub label: String,
    pub weight: u32,
    /// Lowest severity this signal forces on the result; always the tier floor.
    pub severity: Severity,
    pub condition: Option<Condition>,
    pub kind: SignalKind,
}

impl Signal {
    pub fn keyword(system: OrganSystem, tier: Tier, condition: Condition, term: &str) -> Self {
        let label = if system.is_specific() {
            format!("{} {} keyword: '{}'", capitalize(tier.as_str()), system, term)
        } else {
            format!("Non-specific symptom: '{}'", term)
        };
        Self {
            system,
            tier,
            label,
            weight: tier.weight(),
            severity: tier.severity_floor(),
            condition: Some(condition),
            kind: SignalKind::Keyword,
        }
    }

    /// A numeric band match. Severity is the tier floor, as for keywords.
    pub fn band(
        kind: SignalKind,
        system: OrganSystem,
        tier: Tier,
        condition: Condition,
        label: impl Into<String>,
    ) -> Self {
        Self {
            system,
            tier,
            label: label.into(),
            weight: tier.weight(),
            severity: tier.severity_floor(),
            condition: Some(condition),
            kind,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Which of the vitals that earn the completeness bonus were readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completeness {
    pub blood_pressure: bool,
    pub heart_rate: bool,
    pub oxygen_saturation: bool,
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        self.blood_pressure && self.heart_rate && self.oxygen_saturation
    }
}

/// Signals in encounter order plus data completeness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub signals: Vec<Signal>,
    pub completeness: Completeness,
}

impl SignalSet {
    pub fn new(signals: Vec<Signal>, completeness: Completeness) -> Self {
        Self {
            signals,
            completeness,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn push(&mut self, signal: Signal) {
        self.signals.push(signal);
    }
}

/// Builds a [`SignalSet`] from a case: keywords first, then vitals, then labs.
pub struct SignalExtractor {
    taxonomy: Taxonomy,
}

impl SignalExtractor {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn extract(&self, case: &PatientCase) -> SignalSet {
        let mut set = SignalSet::default();

        let text = case.narrative_text();
        if !text.is_empty() {
            set.signals.extend(self.taxonomy.match_text(&text));
        }

        let vitals = &case.vitals;
        if let Some(bp) = vitals.blood_pressure.as_deref().and_then(parse_blood_pressure) {
            set.completeness.blood_pressure = true;
            set.signals.extend(bands::blood_pressure(bp));
        }
        if let Some(hr) = vitals
            .heart_rate
            .as_deref()
            .and_then(parse_measurement)
            .filter(|v| (20.0..=300.0).contains(v))
        {
            set.completeness.heart_rate = true;
            set.signals.extend(bands::heart_rate(hr));
        }
        if let Some(celsius) = vitals.temperature.as_deref().and_then(parse_temperature) {
            set.signals.extend(bands::temperature(celsius));
        }
        if let Some(spo2) = vitals
            .oxygen_saturation
            .as_deref()
            .and_then(parse_measurement)
            .filter(|v| (50.0..=100.0).contains(v))
        {
            set.completeness.oxygen_saturation = true;
            set.signals.extend(bands::oxygen_saturation(spo2));
        }

        let labs = &case.labs;
        if let Some(wbc) = labs.white_cell_count.as_deref().and_then(parse_measurement) {
            set.signals.extend(bands::white_cell_count(wbc));
        }
        if let Some(hgb) = labs.hemoglobin.as_deref().and_then(parse_measurement) {
            set.signals.extend(bands::hemoglobin(hgb, case.sex));
        }
        if let Some(plt) = labs.platelets.as_deref().and_then(parse_measurement) {
            set.signals.extend(bands::platelets(plt));
        }
        if let Some(cr) = labs.creatinine.as_deref().and_then(parse_measurement) {
            set.signals.extend(bands::creatinine(cr));
        }

        set
    }
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new(Taxonomy::standard())
    }
}
