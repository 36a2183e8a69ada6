use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use clinical_flow::{
    FallbackOrchestrator, InMemoryReferenceData, LearningTracker, NameExtractor, PatientCase,
    ReferenceData, ReportSource,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    backends,
    config::ServiceConfig,
    extractor::PatternNameExtractor,
    models::{
        AnalyzeCaseRequest, AnalyzeCaseResponse, AssessCaseResponse, MetricsResponse,
        ReviewRequest,
    },
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<FallbackOrchestrator>,
    pub name_extractor: Arc<dyn NameExtractor>,
    pub learning: Arc<Mutex<LearningTracker>>,
}

pub fn create_app(config: &ServiceConfig) -> Router {
    let app_state = create_app_state(config);
    build_router(app_state)
}

pub fn create_app_state(config: &ServiceConfig) -> AppState {
    let reference: Arc<dyn ReferenceData> = Arc::new(InMemoryReferenceData::standard());
    let backends = backends::from_config(config);

    let mut orchestrator = FallbackOrchestrator::new(reference).with_config(config.cascade());
    if let Some(primary) = backends.primary {
        orchestrator = orchestrator.with_primary(primary);
    }
    if let Some(secondary) = backends.secondary {
        orchestrator = orchestrator.with_secondary(secondary);
    }

    AppState {
        orchestrator: Arc::new(orchestrator),
        name_extractor: Arc::new(PatternNameExtractor::new()),
        learning: Arc::new(Mutex::new(LearningTracker::new())),
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/clinical/analyze", post(analyze_case))
        .route("/clinical/assess", post(assess_case))
        .route("/clinical/review", post(review_report))
        .route("/clinical/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Clinical Decision Service",
        "version": "1.0.0",
        "description": "Clinical case analysis across reasoning backends with a deterministic scoring fallback",
        "endpoints": {
            "POST /clinical/analyze": "Analyze a patient case (reasoning backends, then rule-based fallback)",
            "POST /clinical/assess": "Rule-based assessment only",
            "POST /clinical/review": "Record whether a report was clinically correct",
            "GET /clinical/metrics": "Accuracy and calibration of reviewed reports",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn analyze_case(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCaseRequest>,
) -> ApiResult<AnalyzeCaseResponse> {
    let case = prepare_case(&state, request)?;
    let case_id = case.id.clone().unwrap_or_default();
    info!("Starting clinical analysis for case {}", case_id);

    let run = state.orchestrator.analyze(&case).await;
    if !run.report.success {
        error!(
            "Clinical analysis for case {} failed: {}",
            case_id,
            run.report.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(Json(AnalyzeCaseResponse {
        case_id,
        report: run.report,
        attempts: run.attempts,
    }))
}

async fn assess_case(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCaseRequest>,
) -> ApiResult<AssessCaseResponse> {
    let case = prepare_case(&state, request)?;
    let case_id = case.id.clone().unwrap_or_default();
    info!("Running rule-based assessment for case {}", case_id);

    let assessment = state.orchestrator.engine().assess(&case).await.map_err(|e| {
        error!("Assessment failed for case {}: {}", case_id, e);
        internal_error("Failed to assess case", &e.to_string())
    })?;

    Ok(Json(AssessCaseResponse {
        case_id,
        report: state.orchestrator.assembler().from_assessment(assessment),
    }))
}

fn prepare_case(state: &AppState, request: AnalyzeCaseRequest) -> Result<PatientCase, ApiError> {
    let AnalyzeCaseRequest {
        mut case,
        medications_text,
    } = request;

    if let Some(text) = medications_text {
        for name in state.name_extractor.extract_drugs_safely(&text) {
            if !case.medications.iter().any(|m| m.eq_ignore_ascii_case(&name)) {
                case.medications.push(name);
            }
        }
    }

    if !case.has_content() {
        return Err(bad_request_error(
            "Case must include a complaint, symptoms, history, vitals or labs",
        ));
    }

    if case.id.as_deref().is_none_or(|id| id.trim().is_empty()) {
        case.id = Some(Uuid::new_v4().to_string());
    }
    Ok(case)
}

async fn review_report(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Value> {
    let mut tracker = state.learning.lock().await;
    let recorded = tracker.record(&request.report, request.correct);
    if !recorded {
        return Err(bad_request_error("Failed reports cannot be reviewed"));
    }
    info!("Recorded review ({} total)", tracker.total());

    Ok(Json(json!({
        "recorded": true,
        "reviewed": tracker.total()
    })))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let tracker = state.learning.lock().await;
    Json(MetricsResponse {
        reviewed: tracker.total(),
        accuracy: tracker.accuracy(),
        ai_accuracy: tracker.accuracy_for(ReportSource::Backend),
        logic_accuracy: tracker.accuracy_for(ReportSource::Deterministic),
        calibration: tracker.calibration(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        create_app(&config)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_and_root() {
        let (status, body) = send(app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(app(), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"]["POST /clinical/analyze"].is_string());
    }

    #[tokio::test]
    async fn analyze_without_backends_uses_rule_engine() {
        let (status, body) = send(
            app(),
            "POST",
            "/clinical/analyze",
            Some(json!({ "case": { "vitals": { "bp": "185/125" } } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["source"], "logic");
        assert_eq!(body["confidence"], 36);
        assert!(!body["caseId"].as_str().unwrap().is_empty());
        assert_eq!(
            body["assessment"]["scoring"]["conditions"][0],
            "hypertensive_crisis"
        );
        assert_eq!(body["assessment"]["scoring"]["severity"], "critical");
        assert_eq!(body["attempts"], json!([]));
        assert!(body["patientFriendlyMessage"].as_str().unwrap().contains("emergency"));
    }

    #[tokio::test]
    async fn medication_text_feeds_interaction_alerts() {
        let (status, body) = send(
            app(),
            "POST",
            "/clinical/assess",
            Some(json!({
                "case": { "id": "case-7", "chiefComplaint": "knee pain after a fall" },
                "medicationsText": "Warfarin 5mg nightly"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["caseId"], "case-7");
        let interactions = body["assessment"]["interactions"].as_array().unwrap();
        assert!(interactions.iter().any(|i| i["drug1"] == "warfarin"));
        assert!(body["analysis"].as_str().unwrap().contains("DRUG INTERACTION ALERTS"));
    }

    #[tokio::test]
    async fn empty_case_is_rejected() {
        let (status, body) =
            send(app(), "POST", "/clinical/analyze", Some(json!({ "case": {} }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("complaint"));
    }

    #[tokio::test]
    async fn implausible_case_is_rescued() {
        let (status, body) = send(
            app(),
            "POST",
            "/clinical/analyze",
            Some(json!({ "case": { "age": 300, "chiefComplaint": "headache" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "logic");
        assert_eq!(body["confidence"], 50);
    }

    #[tokio::test]
    async fn reviews_feed_metrics() {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        let state = create_app_state(&config);
        let router = build_router(state.clone());

        let (_, report) = send(
            router.clone(),
            "POST",
            "/clinical/assess",
            Some(json!({ "case": { "chiefComplaint": "chest pain and shortness of breath" } })),
        )
        .await;

        let (status, body) = send(
            router.clone(),
            "POST",
            "/clinical/review",
            Some(json!({ "report": report, "correct": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reviewed"], 1);

        let (status, body) = send(router, "GET", "/clinical/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reviewed"], 1);
        assert_eq!(body["logicAccuracy"], 1.0);
        assert_eq!(body["aiAccuracy"], Value::Null);
        assert_eq!(state.learning.lock().await.total(), 1);
    }
}
