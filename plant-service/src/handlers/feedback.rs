use super::analyses::owned_analysis;
use crate::dtos::{CreateFeedbackRequest, FeedbackResponse};
use crate::middleware::{AuthUser, IdPath, ValidatedJson};
use crate::models::NewUserFeedback;
use crate::startup::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use plant_core::error::AppError;

pub async fn create_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    let analysis = owned_analysis(&state, auth, req.analysis_id).await?;

    let feedback = state
        .storage
        .create_feedback(NewUserFeedback {
            analysis_id: analysis.id,
            user_id: auth.user_id,
            comment: req.comment.trim().to_string(),
        })
        .await?;

    tracing::info!(
        feedback_id = feedback.id,
        analysis_id = analysis.id,
        "Feedback recorded"
    );

    Ok((StatusCode::CREATED, Json(FeedbackResponse::from(feedback))))
}

pub async fn list_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(analysis_id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    owned_analysis(&state, auth, analysis_id).await?;

    let feedback: Vec<FeedbackResponse> = state
        .storage
        .list_feedback_by_analysis(analysis_id)
        .await?
        .into_iter()
        .map(FeedbackResponse::from)
        .collect();

    Ok(Json(feedback))
}
