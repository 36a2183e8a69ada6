pub mod gemini;
pub mod openrouter;
pub mod parse;

use std::sync::Arc;

use clinical_flow::ReasoningBackend;
use tracing::{info, warn};

use crate::config::ServiceConfig;

pub use gemini::GeminiBackend;
pub use openrouter::OpenRouterBackend;
pub use parse::parse_reply;

/// The backends the configuration allows, in cascade order.
#[derive(Default)]
pub struct Backends {
    pub primary: Option<Arc<dyn ReasoningBackend>>,
    pub secondary: Option<Arc<dyn ReasoningBackend>>,
}

/// A backend is registered only when its API key is present.
pub fn from_config(config: &ServiceConfig) -> Backends {
    let mut backends = Backends::default();

    match &config.openrouter_api_key {
        Some(key) => {
            info!(model = %config.primary_model, "Primary backend: OpenRouter");
            backends.primary = Some(Arc::new(OpenRouterBackend::new(
                key,
                config.primary_model.clone(),
            )));
        }
        None => warn!("OPENROUTER_API_KEY not set, primary backend disabled"),
    }

    match &config.gemini_api_key {
        Some(key) if !config.model_candidates.is_empty() => {
            info!(candidates = ?config.model_candidates, "Secondary backend: Gemini");
            backends.secondary = Some(Arc::new(GeminiBackend::new(
                key,
                config.model_candidates.clone(),
            )));
        }
        Some(_) => warn!("No Gemini model candidates configured, secondary backend disabled"),
        None => warn!("GEMINI_API_KEY not set, secondary backend disabled"),
    }

    backends
}
