use crate::models::{PlantAnalysis, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub id: i64,
    pub user_id: i64,
    pub image_path: String,
    pub diagnosis: String,
    pub confidence: f64,
    pub severity: Severity,
    pub is_healthy: bool,
    pub description: String,
    pub treatment: String,
    pub created_at: String,
}

impl From<PlantAnalysis> for AnalysisResponse {
    fn from(analysis: PlantAnalysis) -> Self {
        Self {
            id: analysis.id,
            user_id: analysis.user_id,
            image_path: analysis.image_path,
            diagnosis: analysis.diagnosis,
            confidence: analysis.confidence,
            severity: analysis.severity,
            is_healthy: analysis.is_healthy,
            description: analysis.description,
            treatment: analysis.treatment,
            created_at: analysis.created_at.to_rfc3339(),
        }
    }
}
