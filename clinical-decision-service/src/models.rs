use clinical_flow::{AnalysisReport, CalibrationBucket, PatientCase, ProviderAttempt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCaseRequest {
    pub case: PatientCase,
    /// Free-text medication list merged into `case.medications`.
    #[serde(default)]
    pub medications_text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCaseResponse {
    pub case_id: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub attempts: Vec<ProviderAttempt>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessCaseResponse {
    pub case_id: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub report: AnalysisReport,
    pub correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub reviewed: usize,
    pub accuracy: Option<f64>,
    pub ai_accuracy: Option<f64>,
    pub logic_accuracy: Option<f64>,
    pub calibration: Vec<CalibrationBucket>,
}
