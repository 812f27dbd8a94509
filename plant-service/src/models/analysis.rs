use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How badly the plant is affected, as judged by the vision model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    #[serde(alias = "medium")]
    Moderate,
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Lenient parse used on model output: case-insensitive, unknown words
    /// become [`Severity::Unknown`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "none" | "healthy" => Severity::None,
            "low" | "mild" => Severity::Low,
            "moderate" | "medium" => Severity::Moderate,
            "high" | "severe" | "critical" => Severity::High,
            _ => Severity::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantAnalysis {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user_id: i64,
    pub image_path: String,
    pub diagnosis: String,
    pub confidence: f64,
    pub severity: Severity,
    pub is_healthy: bool,
    pub description: String,
    pub treatment: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPlantAnalysis {
    pub user_id: i64,
    pub image_path: String,
    pub diagnosis: String,
    pub confidence: f64,
    pub severity: Severity,
    pub is_healthy: bool,
    pub description: String,
    pub treatment: String,
}

impl NewPlantAnalysis {
    pub fn into_analysis(self, id: i64) -> PlantAnalysis {
        PlantAnalysis {
            id,
            user_id: self.user_id,
            image_path: self.image_path,
            diagnosis: self.diagnosis,
            confidence: self.confidence,
            severity: self.severity,
            is_healthy: self.is_healthy,
            description: self.description,
            treatment: self.treatment,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_label_is_lenient() {
        assert_eq!(Severity::from_label("High"), Severity::High);
        assert_eq!(Severity::from_label(" medium "), Severity::Moderate);
        assert_eq!(Severity::from_label("mild"), Severity::Low);
        assert_eq!(Severity::from_label("catastrophic?"), Severity::Unknown);
    }

    #[test]
    fn severity_deserializes_unrecognised_values_as_unknown() {
        let s: Severity = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(s, Severity::Moderate);

        let s: Severity = serde_json::from_str("\"extreme\"").unwrap();
        assert_eq!(s, Severity::Unknown);

        assert_eq!(serde_json::to_string(&Severity::Moderate).unwrap(), "\"moderate\"");
    }
}
