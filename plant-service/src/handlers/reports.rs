use crate::dtos::{CreateReportRequest, ReportResponse};
use crate::middleware::{AuthUser, IdPath, ValidatedJson};
use crate::models::NewDiseaseReport;
use crate::startup::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use plant_core::error::AppError;

pub async fn create_report(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let report = state
        .storage
        .create_report(NewDiseaseReport {
            reported_by: Some(auth.user_id),
            location: req.location.trim().to_string(),
            description: req.description.trim().to_string(),
            latitude: req.latitude,
            longitude: req.longitude,
        })
        .await?;

    tracing::info!(report_id = report.id, user_id = auth.user_id, "Disease report created");

    Ok((StatusCode::CREATED, Json(ReportResponse::from(report))))
}

pub async fn list_reports(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let reports: Vec<ReportResponse> = state
        .storage
        .list_reports()
        .await?
        .into_iter()
        .map(ReportResponse::from)
        .collect();

    Ok(Json(reports))
}

pub async fn get_report(
    State(state): State<AppState>,
    _auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let report = state
        .storage
        .get_report(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Report not found")))?;

    Ok(Json(ReportResponse::from(report)))
}
