use axum::extract::rejection::JsonRejection;
use axum::Json;
use tracing::info;

use crate::error::ApiError;
use crate::models::comparison::ReportRequest;
use crate::models::report::BatchReport;
use crate::services::difficulty_analyzer::analyze_difficulty;

/// Aggregate a batch of per-image comparisons into a difficulty report
pub async fn generate_report(
    request: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<BatchReport>, ApiError> {
    let Json(request) = request
        .map_err(|rejection| ApiError::bad_request(format!("Invalid report request: {}", rejection.body_text())))?;

    let report = analyze_difficulty(&request.results, &request.user_answers)
        .ok_or_else(|| ApiError::bad_request("No results provided"))?;

    info!(
        "Report for {} CAPTCHAs: {:?} (method 1 {}%, method 2 {}%)",
        report.total_captchas, report.difficulty, report.method1_accuracy, report.method2_accuracy
    );

    Ok(Json(report))
}
