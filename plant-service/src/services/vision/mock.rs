//! Mock vision provider for tests and offline development.

use super::{ImageInput, PlantDiagnosis, ProviderError, VisionProvider};
use crate::models::Severity;
use async_trait::async_trait;

/// Returns a fixed diagnosis without calling out.
pub struct MockVisionProvider {
    enabled: bool,
    diagnosis: PlantDiagnosis,
}

impl MockVisionProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            diagnosis: PlantDiagnosis {
                diagnosis: "Early blight".to_string(),
                confidence: 0.92,
                severity: Severity::Moderate,
                is_healthy: false,
                description: "Dark concentric spots on older leaves with yellow halos."
                    .to_string(),
                treatment: "Remove affected leaves, avoid overhead watering, and apply a copper-based fungicide."
                    .to_string(),
            },
        }
    }

    /// Use a specific diagnosis instead of the default one.
    pub fn with_diagnosis(diagnosis: PlantDiagnosis) -> Self {
        Self {
            enabled: true,
            diagnosis,
        }
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn diagnose(&self, image: ImageInput<'_>) -> Result<PlantDiagnosis, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock vision provider not enabled".to_string(),
            ));
        }
        if image.bytes.is_empty() {
            return Err(ProviderError::InvalidRequest("Image is empty".to_string()));
        }

        Ok(self.diagnosis.clone())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock vision provider not enabled".to_string(),
            ))
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
