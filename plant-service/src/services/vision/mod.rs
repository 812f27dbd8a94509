//! Vision-model abstractions for plant diagnosis.
//!
//! A provider receives the raw image bytes, asks a hosted multimodal model
//! for a structured verdict, and returns a [`PlantDiagnosis`] with defaults
//! filled in for anything the model left out.

pub mod diagnosis;
pub mod gemini;
pub mod mock;

pub use diagnosis::{parse_diagnosis, PlantDiagnosis, DIAGNOSIS_PROMPT};
pub use gemini::{GeminiConfig, GeminiVisionProvider};
pub use mock::MockVisionProvider;

use async_trait::async_trait;
use plant_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited => AppError::TooManyRequests(
                "The analysis service is busy, please retry shortly".to_string(),
                Some(30),
            ),
            ProviderError::ContentFiltered => AppError::BadRequest(anyhow::anyhow!(
                "The image was rejected by the analysis service"
            )),
            ProviderError::InvalidRequest(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            ProviderError::NotConfigured(_) => AppError::ServiceUnavailable,
            ProviderError::ApiError(msg) | ProviderError::NetworkError(msg) => {
                AppError::BadGateway(msg)
            }
        }
    }
}

/// An uploaded image handed to a provider.
#[derive(Debug, Clone, Copy)]
pub struct ImageInput<'a> {
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
}

#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Classify the plant in the image.
    async fn diagnose(&self, image: ImageInput<'_>) -> Result<PlantDiagnosis, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Model identifier, for logs and metrics.
    fn model(&self) -> &str;
}
