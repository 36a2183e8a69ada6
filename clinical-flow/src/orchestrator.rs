//! FallbackOrchestrator: runs one case through the backend cascade and falls
//! back to the deterministic engine.
//!
//! Attempts are strictly sequential. Each one runs as its own task raced
//! against the configured timeout; on timeout the orchestrator stops waiting
//! and moves to the next candidate without cancelling the call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, timeout};
use tracing::{debug, error, info, warn};

use crate::backend::{BackendReply, ReasoningBackend};
use crate::case::PatientCase;
use crate::cascade::{AttemptOutcome, CascadeConfig, CascadeEvent, CascadeState, ProviderAttempt};
use crate::collaborators::ReferenceData;
use crate::engine::DeterministicEngine;
use crate::error::{BackendError, FlowError, Result};
use crate::prompt::CasePrompt;
use crate::report::{AnalysisReport, ReportAssembler};

/// Result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    pub attempts: Vec<ProviderAttempt>,
}

impl AnalysisRun {
    pub fn failed_attempts(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| !a.outcome.is_success())
            .count()
    }
}

pub struct FallbackOrchestrator {
    primary: Option<Arc<dyn ReasoningBackend>>,
    secondary: Option<Arc<dyn ReasoningBackend>>,
    engine: DeterministicEngine,
    reference: Arc<dyn ReferenceData>,
    config: CascadeConfig,
    assembler: ReportAssembler,
}

impl FallbackOrchestrator {
    /// An orchestrator with no reasoning backends; every request goes to the
    /// deterministic engine until backends are attached.
    pub fn new(reference: Arc<dyn ReferenceData>) -> Self {
        let config = CascadeConfig::default();
        Self {
            primary: None,
            secondary: None,
            engine: DeterministicEngine::new(Arc::clone(&reference)),
            reference,
            config,
            assembler: ReportAssembler::new(&config),
        }
    }

    pub fn with_primary(mut self, backend: Arc<dyn ReasoningBackend>) -> Self {
        self.primary = Some(backend);
        self
    }

    pub fn with_secondary(mut self, backend: Arc<dyn ReasoningBackend>) -> Self {
        self.secondary = Some(backend);
        self
    }

    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = config;
        self.assembler = ReportAssembler::new(&config);
        self
    }

    pub fn with_engine(mut self, engine: DeterministicEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> &DeterministicEngine {
        &self.engine
    }

    pub fn assembler(&self) -> &ReportAssembler {
        &self.assembler
    }

    /// Analyse a case. Always returns a report; only a failure of the
    /// deterministic rescue yields `success == false`.
    pub async fn analyze(&self, case: &PatientCase) -> AnalysisRun {
        let mut attempts = Vec::new();

        let report = match self.run_cascade(case, &mut attempts).await {
            Ok(report) => report,
            Err(cause) => {
                warn!(error = %cause, "Analysis failed outside the candidate loop, running deterministic rescue");
                match self.engine.assess(case).await {
                    Ok(assessment) => self.assembler.rescued(assessment),
                    Err(rescue_error) => {
                        error!(error = %rescue_error, "Deterministic rescue failed");
                        self.assembler.failure(&rescue_error)
                    }
                }
            }
        };

        info!(
            case_id = case.id.as_deref().unwrap_or("-"),
            success = report.success,
            source = ?report.source,
            confidence = report.confidence,
            attempts = attempts.len(),
            "Analysis completed"
        );
        AnalysisRun { report, attempts }
    }

    async fn run_cascade(
        &self,
        case: &PatientCase,
        attempts: &mut Vec<ProviderAttempt>,
    ) -> Result<AnalysisReport> {
        let interactions = self
            .reference
            .check_all_interactions(&case.medications)
            .await?;
        let prompt = Arc::new(CasePrompt::build(case, &interactions)?);

        let mut state = CascadeState::NotStarted;
        let mut secondary_models: Vec<String> = Vec::new();
        let mut report = None;

        while !state.is_terminal() {
            debug!(state = ?state, "Cascade step");
            let event = match state {
                CascadeState::NotStarted => CascadeEvent::Begin,

                CascadeState::TryingPrimaryBackend => {
                    let candidate = self.primary.as_ref().and_then(|backend| {
                        backend
                            .model_candidates()
                            .into_iter()
                            .next()
                            .map(|model| (backend, model))
                    });
                    match candidate {
                        Some((backend, model)) => {
                            self.try_candidate(backend, &model, &prompt, attempts, &mut report)
                                .await
                        }
                        None => CascadeEvent::Skipped,
                    }
                }

                CascadeState::TryingSecondaryBackend => match &self.secondary {
                    Some(backend) => {
                        secondary_models = backend.model_candidates();
                        CascadeEvent::SecondaryReady {
                            candidates: secondary_models.len(),
                        }
                    }
                    None => CascadeEvent::Skipped,
                },

                CascadeState::TryingModelCandidate { index, .. } => {
                    match (self.secondary.as_ref(), secondary_models.get(index)) {
                        (Some(backend), Some(model)) => {
                            self.try_candidate(backend, model, &prompt, attempts, &mut report)
                                .await
                        }
                        _ => CascadeEvent::Skipped,
                    }
                }

                CascadeState::DeterministicFallback => {
                    info!(
                        failed_attempts = attempts.len(),
                        "Reasoning backends exhausted, using deterministic engine"
                    );
                    let assessment = self.engine.assess(case).await?;
                    report = Some(self.assembler.from_assessment(assessment));
                    CascadeEvent::FallbackComplete
                }

                CascadeState::Done => break,
            };
            state = state.on(event);
        }

        report.ok_or_else(|| FlowError::Assessment("cascade ended without a report".to_string()))
    }

    async fn try_candidate(
        &self,
        backend: &Arc<dyn ReasoningBackend>,
        model: &str,
        prompt: &Arc<CasePrompt>,
        attempts: &mut Vec<ProviderAttempt>,
        report: &mut Option<AnalysisReport>,
    ) -> CascadeEvent {
        let (attempt, reply) = self.attempt(backend, model, prompt).await;
        let outcome = attempt.outcome;
        attempts.push(attempt);
        if let Some(reply) = reply {
            *report = Some(self.assembler.from_backend(backend.id(), model, reply));
        }
        CascadeEvent::Attempted(outcome)
    }

    async fn attempt(
        &self,
        backend: &Arc<dyn ReasoningBackend>,
        model: &str,
        prompt: &Arc<CasePrompt>,
    ) -> (ProviderAttempt, Option<BackendReply>) {
        let started = Instant::now();

        let task_backend = Arc::clone(backend);
        let task_model = model.to_string();
        let task_prompt = Arc::clone(prompt);
        let handle =
            tokio::spawn(async move { task_backend.analyze(&task_model, &task_prompt).await });

        // Dropping the handle on timeout detaches the task; a late reply is ignored.
        let result = match timeout(self.config.attempt_timeout, handle).await {
            Ok(Ok(result)) => result.and_then(BackendReply::into_validated),
            Ok(Err(join_error)) => Err(BackendError::Other(format!(
                "backend task failed: {}",
                join_error
            ))),
            Err(_) => Err(BackendError::Timeout(self.config.attempt_timeout)),
        };
        let latency = started.elapsed();

        let outcome = match &result {
            Ok(_) => AttemptOutcome::Success,
            Err(e) => e.outcome(),
        };
        match &result {
            Ok(_) => info!(
                provider = backend.id(),
                model,
                latency_ms = latency.as_millis() as u64,
                "Backend attempt succeeded"
            ),
            Err(e) => warn!(
                provider = backend.id(),
                model,
                outcome = ?outcome,
                retryable = e.is_retryable(),
                latency_ms = latency.as_millis() as u64,
                error = %e,
                "Backend attempt failed"
            ),
        }

        let attempt = ProviderAttempt {
            provider_id: backend.id().to_string(),
            model_candidate: model.to_string(),
            outcome,
            latency_ms: latency.as_millis() as u64,
        };
        (attempt, result.ok())
    }
}
