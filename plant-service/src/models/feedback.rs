use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFeedback {
    #[serde(rename = "_id")]
    pub id: i64,
    pub analysis_id: i64,
    pub user_id: i64,
    pub comment: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUserFeedback {
    pub analysis_id: i64,
    pub user_id: i64,
    pub comment: String,
}

impl NewUserFeedback {
    pub fn into_feedback(self, id: i64) -> UserFeedback {
        UserFeedback {
            id,
            analysis_id: self.analysis_id,
            user_id: self.user_id,
            comment: self.comment,
            created_at: Utc::now(),
        }
    }
}
