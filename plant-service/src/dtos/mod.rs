pub mod analyses;
pub mod auth;
pub mod feedback;
pub mod reports;

pub use analyses::AnalysisResponse;
pub use auth::{LoginRequest, MessageResponse, RegisterRequest};
pub use feedback::{CreateFeedbackRequest, FeedbackResponse};
pub use reports::{CreateReportRequest, ReportResponse};

use validator::ValidationError;

/// Rejects strings that are only whitespace.
pub(crate) fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
