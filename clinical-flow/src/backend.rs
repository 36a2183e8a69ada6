use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::prompt::CasePrompt;

/// What a reasoning backend hands back for one case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendReply {
    pub success: bool,
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_friendly_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Self-reported confidence, 0..=100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

impl BackendReply {
    pub fn success(analysis: impl Into<String>) -> Self {
        Self {
            success: true,
            analysis: analysis.into(),
            ..Default::default()
        }
    }

    pub fn with_patient_message(mut self, message: impl Into<String>) -> Self {
        self.patient_friendly_message = Some(message.into());
        self
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = Some(confidence.min(100));
        self
    }

    /// Accept the reply only if it is successful and carries a non-empty
    /// analysis. Unsuccessful replies with an error text are classified like
    /// any other provider error.
    pub fn into_validated(self) -> Result<Self, BackendError> {
        if !self.success {
            return Err(match self.error.as_deref().map(str::trim) {
                Some(message) if !message.is_empty() => BackendError::classify(message),
                _ => BackendError::Malformed("unsuccessful reply without error text".to_string()),
            });
        }
        if self.analysis.trim().is_empty() {
            return Err(BackendError::Malformed("empty analysis".to_string()));
        }
        Ok(self)
    }
}

/// A generative backend able to analyse a case.
///
/// The orchestrator treats every backend as interchangeable behind this trait.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    fn id(&self) -> &str;

    /// Model identifiers in declared priority order.
    fn model_candidates(&self) -> Vec<String>;

    async fn analyze(&self, model: &str, prompt: &CasePrompt) -> Result<BackendReply, BackendError>;
}
