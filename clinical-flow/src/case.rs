use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{FlowError, Result};

/// Snapshot of a patient presented for analysis.
///
/// Every field is optional or defaulted. The pipeline only ever reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCase {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub labs: Labs,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub social_history: SocialHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[serde(alias = "m", alias = "M", alias = "Male")]
    Male,
    #[serde(alias = "f", alias = "F", alias = "Female")]
    Female,
    #[serde(other)]
    Other,
}

/// Raw vital-sign readings as entered. Numbers and strings are both accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    #[serde(default, alias = "bp", deserialize_with = "reading")]
    pub blood_pressure: Option<String>,
    #[serde(default, alias = "hr", deserialize_with = "reading")]
    pub heart_rate: Option<String>,
    #[serde(default, alias = "temp", deserialize_with = "reading")]
    pub temperature: Option<String>,
    #[serde(default, alias = "spo2", deserialize_with = "reading")]
    pub oxygen_saturation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Labs {
    #[serde(default, alias = "wbc", deserialize_with = "reading")]
    pub white_cell_count: Option<String>,
    #[serde(default, alias = "hgb", deserialize_with = "reading")]
    pub hemoglobin: Option<String>,
    #[serde(default, alias = "plt", deserialize_with = "reading")]
    pub platelets: Option<String>,
    #[serde(default, alias = "cr", deserialize_with = "reading")]
    pub creatinine: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SocialHistory {
    #[serde(default)]
    pub smoking: bool,
    #[serde(default)]
    pub alcohol: bool,
}

/// Accept a JSON number or string; anything else becomes "no reading".
fn reading<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl PatientCase {
    /// Complaint, symptoms and history joined into one lowercase haystack.
    pub fn narrative_text(&self) -> String {
        [&self.chief_complaint, &self.symptoms, &self.history]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
            .replace(['\u{2019}', '\u{2018}'], "'")
    }

    pub fn has_content(&self) -> bool {
        !self.narrative_text().is_empty()
            || self.vitals.blood_pressure.is_some()
            || self.vitals.heart_rate.is_some()
            || self.vitals.temperature.is_some()
            || self.vitals.oxygen_saturation.is_some()
            || self.labs.white_cell_count.is_some()
            || self.labs.hemoglobin.is_some()
            || self.labs.platelets.is_some()
            || self.labs.creatinine.is_some()
    }

    /// Reject demographics no real patient can have.
    ///
    /// Vitals and labs are never validated here; the signal extractor treats
    /// bad readings as absent.
    pub fn validate(&self) -> Result<()> {
        if let Some(age) = self.age {
            if age > 130 {
                return Err(FlowError::InvalidCase(format!("age {} is out of range", age)));
            }
        }
        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight <= 0.0 || weight > 500.0 {
                return Err(FlowError::InvalidCase(format!(
                    "weight {} kg is out of range",
                    weight
                )));
            }
        }
        Ok(())
    }
}

/// Systolic/diastolic pair in mmHg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

static BLOOD_PRESSURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2,3}(?:\.\d+)?)\s*/\s*(\d{2,3}(?:\.\d+)?)").expect("Invalid blood pressure regex")
});

/// A number that is not glued to a preceding letter or digit, so the "2" in
/// "SpO2" or the "10" in "x10^9/L" is skipped.
static MEASUREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9.])(\d+(?:\.\d+)?)").expect("Invalid measurement regex")
});

static FAHRENHEIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d\s*°?\s*f(?:ahrenheit)?\b|\bfahrenheit\b").expect("Invalid fahrenheit regex")
});

static CELSIUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d\s*°?\s*c(?:elsius)?\b|\bcelsius\b").expect("Invalid celsius regex")
});

/// Parse "185/125", "185/125 mmHg" or "BP 120 / 80".
pub fn parse_blood_pressure(raw: &str) -> Option<BloodPressure> {
    let captures = BLOOD_PRESSURE.captures(raw)?;
    let systolic = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let diastolic = captures.get(2)?.as_str().parse::<f64>().ok()?;
    if systolic <= 0.0 || diastolic <= 0.0 {
        return None;
    }
    Some(BloodPressure {
        systolic,
        diastolic,
    })
}

/// The reading in "110 bpm", "92%", "Hgb 9.8" or "SpO2 86%".
pub fn parse_measurement(raw: &str) -> Option<f64> {
    MEASUREMENT
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Temperature normalised to Celsius.
///
/// The unit comes from a marker after the number ("C", "°F", "fahrenheit",
/// ...). Without one, readings above 45 are taken as Fahrenheit.
pub fn parse_temperature(raw: &str) -> Option<f64> {
    let value = parse_measurement(raw)?;

    let fahrenheit = if FAHRENHEIT.is_match(raw) {
        true
    } else if CELSIUS.is_match(raw) {
        false
    } else {
        value > 45.0
    };

    let celsius = if fahrenheit {
        (value - 32.0) * 5.0 / 9.0
    } else {
        value
    };
    if (20.0..=46.0).contains(&celsius) {
        Some(celsius)
    } else {
        None
    }
}
