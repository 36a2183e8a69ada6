use std::sync::LazyLock;

use clinical_flow::NameExtractor;
use regex::Regex;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[,;\n/+]|\band\b|\bwith\b|\bplus\b").expect("Invalid separator regex")
});

static DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+(?:\.\d+)?\s*(?:mg|mcg|µg|g|ml|iu|units?|%)?\b.*$").expect("Invalid dose regex")
});

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z\-]*").expect("Invalid word regex"));

const STOPWORDS: &[&str] = &[
    "takes", "taking", "take", "on", "uses", "using", "currently", "daily", "nightly", "tablet",
    "tablets", "tab", "tabs", "capsule", "capsules", "oral", "po", "bid", "tid", "qid", "qd",
    "prn", "once", "twice", "as", "needed", "every", "day", "the", "a", "an", "of", "for", "mg",
    "inhaler", "none", "no", "medications", "meds", "otc", "over", "counter",
];

/// Pulls medication names out of free text such as
/// "Lisinopril 10mg daily, metformin 500 mg BID and aspirin".
///
/// Names are lowercased and deduplicated in first-seen order. Text with no
/// recognisable name yields an empty list.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternNameExtractor;

impl PatternNameExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl NameExtractor for PatternNameExtractor {
    fn extract_drugs_safely(&self, text: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        for fragment in SEPARATORS.split(text) {
            let without_dose = DOSE.replace(fragment, "");
            let words: Vec<String> = WORD
                .find_iter(&without_dose)
                .map(|m| m.as_str().to_lowercase())
                .filter(|w| w.len() >= 3 && !STOPWORDS.contains(&w.as_str()))
                .take(3)
                .collect();
            if words.is_empty() {
                continue;
            }
            let name = words.join(" ");
            if !names.contains(&name) {
                names.push(name);
            }
        }

        names
    }
}
