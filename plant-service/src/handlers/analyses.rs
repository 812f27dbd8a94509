use crate::dtos::AnalysisResponse;
use crate::middleware::{AuthUser, IdPath};
use crate::models::{NewPlantAnalysis, PlantAnalysis};
use crate::services::record_analysis;
use crate::services::vision::ImageInput;
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use plant_core::error::AppError;
use std::time::Instant;

/// Multipart field carrying the photo.
pub const IMAGE_FIELD: &str = "image";

/// Fetch an analysis the caller owns. Someone else's analysis is reported
/// as missing rather than forbidden.
pub(crate) async fn owned_analysis(
    state: &AppState,
    auth: AuthUser,
    id: i64,
) -> Result<PlantAnalysis, AppError> {
    state
        .storage
        .get_analysis(id)
        .await?
        .filter(|a| a.user_id == auth.user_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Analysis not found")))
}

/// Body-limit rejections surface as multipart errors; keep them a 413.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(anyhow::anyhow!("Upload exceeds the size limit"))
    } else {
        AppError::BadRequest(anyhow::anyhow!("{}: {}", context, err))
    }
}

struct Upload {
    mime_type: String,
    data: Vec<u8>,
}

async fn read_image(multipart: &mut Multipart, max_bytes: usize) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart field", e))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !mime_type.starts_with("image/") {
            return Err(AppError::UnsupportedMediaType(anyhow::anyhow!(
                "Expected an image upload, got {}",
                mime_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read image bytes", e))?
            .to_vec();

        if data.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("Uploaded image is empty")));
        }
        if data.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(anyhow::anyhow!(
                "Image too large (max {} bytes)",
                max_bytes
            )));
        }

        return Ok(Upload { mime_type, data });
    }

    Err(AppError::BadRequest(anyhow::anyhow!(
        "No image uploaded (expected multipart field '{}')",
        IMAGE_FIELD
    )))
}

async fn remove_orphan(state: &AppState, image_path: &str) {
    if let Err(e) = state.images.delete(image_path).await {
        tracing::warn!(path = %image_path, "Failed to remove orphaned image: {}", e);
    }
}

pub async fn analyze_plant(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = read_image(&mut multipart, state.config.uploads.max_bytes).await?;

    tracing::info!(
        user_id = auth.user_id,
        mime_type = %upload.mime_type,
        size = upload.data.len(),
        "Plant analysis started"
    );

    let image_path = state.images.save(&upload.data, &upload.mime_type).await?;

    let model = state.vision.model().to_string();
    let started = Instant::now();
    let diagnosis = match state
        .vision
        .diagnose(ImageInput {
            bytes: &upload.data,
            mime_type: &upload.mime_type,
        })
        .await
    {
        Ok(diagnosis) => diagnosis,
        Err(e) => {
            record_analysis(&model, e.kind(), started.elapsed());
            tracing::warn!(user_id = auth.user_id, error = %e, "Vision provider failed");
            remove_orphan(&state, &image_path).await;
            return Err(e.into());
        }
    };

    let outcome = if diagnosis.is_healthy {
        "healthy"
    } else {
        "diseased"
    };
    record_analysis(&model, outcome, started.elapsed());

    let analysis = match state
        .storage
        .create_analysis(NewPlantAnalysis {
            user_id: auth.user_id,
            image_path: image_path.clone(),
            diagnosis: diagnosis.diagnosis,
            confidence: diagnosis.confidence,
            severity: diagnosis.severity,
            is_healthy: diagnosis.is_healthy,
            description: diagnosis.description,
            treatment: diagnosis.treatment,
        })
        .await
    {
        Ok(analysis) => analysis,
        Err(e) => {
            remove_orphan(&state, &image_path).await;
            return Err(e);
        }
    };

    tracing::info!(
        analysis_id = analysis.id,
        user_id = auth.user_id,
        diagnosis = %analysis.diagnosis,
        confidence = analysis.confidence,
        "Plant analysis completed"
    );

    Ok((StatusCode::CREATED, Json(AnalysisResponse::from(analysis))))
}

pub async fn list_analyses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let analyses: Vec<AnalysisResponse> = state
        .storage
        .list_analyses_by_user(auth.user_id)
        .await?
        .into_iter()
        .map(AnalysisResponse::from)
        .collect();

    Ok(Json(analyses))
}

pub async fn get_analysis(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let analysis = owned_analysis(&state, auth, id).await?;
    Ok(Json(AnalysisResponse::from(analysis)))
}

pub async fn delete_analysis(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let analysis = owned_analysis(&state, auth, id).await?;

    if !state.storage.delete_analysis(analysis.id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Analysis not found")));
    }

    if let Err(e) = state.images.delete(&analysis.image_path).await {
        tracing::warn!(path = %analysis.image_path, "Failed to remove image: {}", e);
    }

    tracing::info!(analysis_id = id, user_id = auth.user_id, "Analysis deleted");
    Ok(StatusCode::NO_CONTENT)
}
