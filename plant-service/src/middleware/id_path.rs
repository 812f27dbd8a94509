use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use plant_core::error::AppError;

/// Numeric `:id` path segment. A non-numeric id is a JSON 400 like every
/// other client error.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid id: {}", e.body_text())))?;

        Ok(IdPath(id))
    }
}
