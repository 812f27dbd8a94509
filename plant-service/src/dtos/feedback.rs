use super::non_blank;
use crate::models::UserFeedback;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    #[validate(range(min = 1, message = "analysis_id must be a positive id"))]
    pub analysis_id: i64,

    #[validate(
        length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"),
        custom(function = "non_blank")
    )]
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: i64,
    pub analysis_id: i64,
    pub user_id: i64,
    pub comment: String,
    pub created_at: String,
}

impl From<UserFeedback> for FeedbackResponse {
    fn from(feedback: UserFeedback) -> Self {
        Self {
            id: feedback.id,
            analysis_id: feedback.analysis_id,
            user_id: feedback.user_id,
            comment: feedback.comment,
            created_at: feedback.created_at.to_rfc3339(),
        }
    }
}
