use super::non_blank;
use crate::models::DiseaseReport;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "coordinates_paired", skip_on_field_errors = false))]
pub struct CreateReportRequest {
    #[validate(
        length(min = 1, max = 200, message = "Location must be 1-200 characters"),
        custom(function = "non_blank")
    )]
    pub location: String,

    #[validate(
        length(min = 1, max = 2000, message = "Description must be 1-2000 characters"),
        custom(function = "non_blank")
    )]
    pub description: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
}

/// A point needs both halves.
fn coordinates_paired(req: &CreateReportRequest) -> Result<(), ValidationError> {
    if req.latitude.is_some() != req.longitude.is_some() {
        let mut err = ValidationError::new("coordinates");
        err.message = Some("Latitude and longitude must be given together".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: i64,
    pub reported_by: Option<i64>,
    pub location: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: String,
}

impl From<DiseaseReport> for ReportResponse {
    fn from(report: DiseaseReport) -> Self {
        Self {
            id: report.id,
            reported_by: report.reported_by,
            location: report.location,
            description: report.description,
            latitude: report.latitude,
            longitude: report.longitude,
            created_at: report.created_at.to_rfc3339(),
        }
    }
}
