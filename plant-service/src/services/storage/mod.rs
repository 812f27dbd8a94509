//! Persistence for users, analyses, disease reports, and feedback.
//!
//! Every entity gets a surrogate integer id from a per-entity counter that
//! starts at 1. There is no cascade between entities: deleting an analysis
//! leaves its feedback in place.

pub mod memory;
pub mod mongo;

pub use memory::MemStorage;
pub use mongo::MongoStorage;

use crate::models::{
    DiseaseReport, NewDiseaseReport, NewPlantAnalysis, NewUser, NewUserFeedback, PlantAnalysis,
    User, UserFeedback,
};
use async_trait::async_trait;
use plant_core::error::AppError;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Fails with [`AppError::Conflict`] when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn create_analysis(&self, analysis: NewPlantAnalysis) -> Result<PlantAnalysis, AppError>;
    async fn get_analysis(&self, id: i64) -> Result<Option<PlantAnalysis>, AppError>;
    /// Newest first.
    async fn list_analyses_by_user(&self, user_id: i64) -> Result<Vec<PlantAnalysis>, AppError>;
    /// Returns whether a row was removed.
    async fn delete_analysis(&self, id: i64) -> Result<bool, AppError>;

    async fn create_report(&self, report: NewDiseaseReport) -> Result<DiseaseReport, AppError>;
    async fn get_report(&self, id: i64) -> Result<Option<DiseaseReport>, AppError>;
    /// Newest first.
    async fn list_reports(&self) -> Result<Vec<DiseaseReport>, AppError>;

    async fn create_feedback(&self, feedback: NewUserFeedback) -> Result<UserFeedback, AppError>;
    /// Oldest first.
    async fn list_feedback_by_analysis(
        &self,
        analysis_id: i64,
    ) -> Result<Vec<UserFeedback>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

pub(crate) fn username_taken(username: &str) -> AppError {
    AppError::Conflict(anyhow::anyhow!("Username '{}' is already taken", username))
}
