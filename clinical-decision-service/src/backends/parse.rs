use std::sync::LazyLock;

use clinical_flow::{BackendError, BackendReply};
use regex::Regex;

static PATIENT_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\**PATIENT\s+SUMMARY:?\**:?\s*(.*?)\s*(?:\n\s*\**CONFIDENCE\b|\z)")
        .expect("Invalid patient summary regex")
});

static CONFIDENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*\**CONFIDENCE:?\**:?\s*(\d{1,3})\s*%?.*$")
        .expect("Invalid confidence regex")
});

/// Split a free-text model response into analysis, patient summary and
/// self-reported confidence.
pub fn parse_reply(text: &str) -> Result<BackendReply, BackendError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BackendError::Malformed("empty response".to_string()));
    }

    let confidence = CONFIDENCE_LINE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .filter(|v| *v <= 100);

    let (analysis, summary) = match PATIENT_SUMMARY.captures(text) {
        Some(captures) => {
            let start = captures.get(0).map(|m| m.start()).unwrap_or(text.len());
            let summary = captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty());
            (&text[..start], summary)
        }
        None => (text, None),
    };

    let analysis = CONFIDENCE_LINE.replace_all(analysis, "");
    let analysis = analysis.trim();
    if analysis.is_empty() {
        return Err(BackendError::Malformed(
            "response has no analysis section".to_string(),
        ));
    }

    let mut reply = BackendReply::success(analysis);
    if let Some(summary) = summary {
        reply = reply.with_patient_message(summary);
    }
    if let Some(confidence) = confidence {
        reply = reply.with_confidence(confidence);
    }
    Ok(reply)
}
