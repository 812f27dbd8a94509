use super::{username_taken, Storage};
use crate::models::{
    DiseaseReport, NewDiseaseReport, NewPlantAnalysis, NewUser, NewUserFeedback, PlantAnalysis,
    User, UserFeedback,
};
use async_trait::async_trait;
use plant_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A table keyed by id with its own auto-increment counter.
#[derive(Debug)]
struct Table<T> {
    rows: HashMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    analyses: Table<PlantAnalysis>,
    reports: Table<DiseaseReport>,
    feedback: Table<UserFeedback>,
}

/// In-process storage. Lookups by anything other than id scan the table.
#[derive(Debug, Default)]
pub struct MemStorage {
    tables: RwLock<Tables>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .rows
            .values()
            .any(|u| u.username == user.username)
        {
            return Err(username_taken(&user.username));
        }
        Ok(tables.users.insert_with(|id| user.into_user(id)))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_analysis(&self, analysis: NewPlantAnalysis) -> Result<PlantAnalysis, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.analyses.insert_with(|id| analysis.into_analysis(id)))
    }

    async fn get_analysis(&self, id: i64) -> Result<Option<PlantAnalysis>, AppError> {
        Ok(self.tables.read().await.analyses.rows.get(&id).cloned())
    }

    async fn list_analyses_by_user(&self, user_id: i64) -> Result<Vec<PlantAnalysis>, AppError> {
        let tables = self.tables.read().await;
        let mut analyses: Vec<PlantAnalysis> = tables
            .analyses
            .rows
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        // ids are monotonic, so they break ties between equal timestamps
        analyses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(analyses)
    }

    async fn delete_analysis(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.analyses.rows.remove(&id).is_some())
    }

    async fn create_report(&self, report: NewDiseaseReport) -> Result<DiseaseReport, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.reports.insert_with(|id| report.into_report(id)))
    }

    async fn get_report(&self, id: i64) -> Result<Option<DiseaseReport>, AppError> {
        Ok(self.tables.read().await.reports.rows.get(&id).cloned())
    }

    async fn list_reports(&self) -> Result<Vec<DiseaseReport>, AppError> {
        let tables = self.tables.read().await;
        let mut reports: Vec<DiseaseReport> = tables.reports.rows.values().cloned().collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reports)
    }

    async fn create_feedback(&self, feedback: NewUserFeedback) -> Result<UserFeedback, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.feedback.insert_with(|id| feedback.into_feedback(id)))
    }

    async fn list_feedback_by_analysis(
        &self,
        analysis_id: i64,
    ) -> Result<Vec<UserFeedback>, AppError> {
        let tables = self.tables.read().await;
        let mut feedback: Vec<UserFeedback> = tables
            .feedback
            .rows
            .values()
            .filter(|f| f.analysis_id == analysis_id)
            .cloned()
            .collect();
        feedback.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(feedback)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
