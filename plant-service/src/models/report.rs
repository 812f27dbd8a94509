use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-submitted sighting of plant disease at a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseReport {
    #[serde(rename = "_id")]
    pub id: i64,
    pub reported_by: Option<i64>,
    pub location: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDiseaseReport {
    pub reported_by: Option<i64>,
    pub location: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl NewDiseaseReport {
    pub fn into_report(self, id: i64) -> DiseaseReport {
        DiseaseReport {
            id,
            reported_by: self.reported_by,
            location: self.location,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            created_at: Utc::now(),
        }
    }
}
