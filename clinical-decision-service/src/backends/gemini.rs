use async_trait::async_trait;
use clinical_flow::{BackendError, BackendReply, CasePrompt, ReasoningBackend};
use rig::{client::CompletionClient, completion::Prompt, providers::gemini};
use tracing::debug;

use super::parse::parse_reply;

/// Secondary backend: Gemini with an ordered list of model candidates.
pub struct GeminiBackend {
    client: gemini::Client,
    candidates: Vec<String>,
}

impl GeminiBackend {
    pub fn new(api_key: &str, candidates: Vec<String>) -> Self {
        Self {
            client: gemini::Client::new(api_key),
            candidates,
        }
    }
}

#[async_trait]
impl ReasoningBackend for GeminiBackend {
    fn id(&self) -> &str {
        "gemini"
    }

    fn model_candidates(&self) -> Vec<String> {
        self.candidates.clone()
    }

    async fn analyze(&self, model: &str, prompt: &CasePrompt) -> Result<BackendReply, BackendError> {
        debug!(model, "Sending case to Gemini");
        let agent = self.client.agent(model).preamble(&prompt.system).build();
        let response = agent
            .prompt(prompt.user.as_str())
            .await
            .map_err(|e| BackendError::classify(e.to_string()))?;
        parse_reply(&response)
    }
}
