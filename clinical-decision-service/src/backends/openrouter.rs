use async_trait::async_trait;
use clinical_flow::{BackendError, BackendReply, CasePrompt, ReasoningBackend};
use rig::{client::CompletionClient, completion::Prompt, providers::openrouter};
use tracing::debug;

use super::parse::parse_reply;

/// Primary backend: a single OpenRouter-hosted model.
pub struct OpenRouterBackend {
    client: openrouter::Client,
    model: String,
}

impl OpenRouterBackend {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openrouter::Client::new(api_key),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ReasoningBackend for OpenRouterBackend {
    fn id(&self) -> &str {
        "openrouter"
    }

    fn model_candidates(&self) -> Vec<String> {
        vec![self.model.clone()]
    }

    async fn analyze(&self, model: &str, prompt: &CasePrompt) -> Result<BackendReply, BackendError> {
        debug!(model, "Sending case to OpenRouter");
        let agent = self.client.agent(model).preamble(&prompt.system).build();
        let response = agent
            .prompt(prompt.user.as_str())
            .await
            .map_err(|e| BackendError::classify(e.to_string()))?;
        parse_reply(&response)
    }
}
