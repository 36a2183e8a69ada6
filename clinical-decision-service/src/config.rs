use std::time::Duration;

use anyhow::{Context, bail};
use clinical_flow::CascadeConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PRIMARY_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_MODEL_CANDIDATES: &str = "gemini-2.0-flash,gemini-1.5-flash,gemini-1.5-pro";
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 15;

/// Service settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub openrouter_api_key: Option<String>,
    pub primary_model: String,
    pub gemini_api_key: Option<String>,
    pub model_candidates: Vec<String>,
    pub attempt_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let attempt_timeout_secs = match get("CLINICAL_ATTEMPT_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("CLINICAL_ATTEMPT_TIMEOUT_SECS must be whole seconds, got '{}'", raw)
            })?,
            None => DEFAULT_ATTEMPT_TIMEOUT_SECS,
        };
        if attempt_timeout_secs == 0 {
            bail!("CLINICAL_ATTEMPT_TIMEOUT_SECS must be greater than zero");
        }

        let model_candidates = get("CLINICAL_MODEL_CANDIDATES")
            .unwrap_or_else(|| DEFAULT_MODEL_CANDIDATES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            port,
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            primary_model: get("CLINICAL_PRIMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string()),
            gemini_api_key: get("GEMINI_API_KEY"),
            model_candidates,
            attempt_timeout: Duration::from_secs(attempt_timeout_secs),
        })
    }

    pub fn cascade(&self) -> CascadeConfig {
        CascadeConfig {
            attempt_timeout: self.attempt_timeout,
            ..CascadeConfig::default()
        }
    }
}
