//! MongoDB pass-through storage.
//!
//! Integer ids come from a `counters` collection, one document per entity,
//! bumped atomically with `$inc`.

use super::{username_taken, Storage};
use crate::models::{
    DiseaseReport, NewDiseaseReport, NewPlantAnalysis, NewUser, NewUserFeedback, PlantAnalysis,
    User, UserFeedback,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use plant_core::error::AppError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Serialize, Deserialize)]
struct Counter {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

#[derive(Clone)]
pub struct MongoStorage {
    client: MongoClient,
    db: Database,
}

impl MongoStorage {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for plant-service");

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .name("username_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.users()
            .create_index(username_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create username index: {}", e);
                AppError::from(e)
            })?;

        let user_analyses_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_analyses_lookup".to_string())
                    .build(),
            )
            .build();
        self.analyses()
            .create_index(user_analyses_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create user_id index on analyses: {}", e);
                AppError::from(e)
            })?;

        let analysis_feedback_index = IndexModel::builder()
            .keys(doc! { "analysis_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("analysis_feedback_lookup".to_string())
                    .build(),
            )
            .build();
        self.feedback()
            .create_index(analysis_feedback_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create analysis_id index on feedback: {}", e);
                AppError::from(e)
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    fn analyses(&self) -> Collection<PlantAnalysis> {
        self.db.collection("analyses")
    }

    fn reports(&self) -> Collection<DiseaseReport> {
        self.db.collection("reports")
    }

    fn feedback(&self) -> Collection<UserFeedback> {
        self.db.collection("feedback")
    }

    fn counters(&self) -> Collection<Counter> {
        self.db.collection("counters")
    }

    async fn next_id(&self, entity: &str) -> Result<i64, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = self
            .counters()
            .find_one_and_update(doc! { "_id": entity }, doc! { "$inc": { "seq": 1_i64 } }, options)
            .await
            .map_err(|e| {
                tracing::error!(entity = %entity, "Failed to allocate id: {}", e);
                AppError::from(e)
            })?
            .ok_or_else(|| {
                AppError::DatabaseError(anyhow::anyhow!("Counter for {} was not created", entity))
            })?;

        Ok(counter.seq)
    }

    async fn find_sorted<T>(
        collection: Collection<T>,
        filter: Document,
        sort: Document,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let options = FindOptions::builder().sort(sort).build();
        let cursor = collection.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl Storage for MongoStorage {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let username = user.username.clone();
        let user = user.into_user(self.next_id("users").await?);

        self.users().insert_one(&user, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                username_taken(&username)
            } else {
                tracing::error!("Failed to insert user: {}", e);
                AppError::from(e)
            }
        })?;

        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users()
            .find_one(doc! { "username": username }, None)
            .await?)
    }

    async fn create_analysis(&self, analysis: NewPlantAnalysis) -> Result<PlantAnalysis, AppError> {
        let analysis = analysis.into_analysis(self.next_id("analyses").await?);
        self.analyses()
            .insert_one(&analysis, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert analysis: {}", e);
                AppError::from(e)
            })?;
        Ok(analysis)
    }

    async fn get_analysis(&self, id: i64) -> Result<Option<PlantAnalysis>, AppError> {
        Ok(self.analyses().find_one(doc! { "_id": id }, None).await?)
    }

    async fn list_analyses_by_user(&self, user_id: i64) -> Result<Vec<PlantAnalysis>, AppError> {
        Self::find_sorted(
            self.analyses(),
            doc! { "user_id": user_id },
            doc! { "created_at": -1, "_id": -1 },
        )
        .await
    }

    async fn delete_analysis(&self, id: i64) -> Result<bool, AppError> {
        let result = self.analyses().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn create_report(&self, report: NewDiseaseReport) -> Result<DiseaseReport, AppError> {
        let report = report.into_report(self.next_id("reports").await?);
        self.reports().insert_one(&report, None).await.map_err(|e| {
            tracing::error!("Failed to insert report: {}", e);
            AppError::from(e)
        })?;
        Ok(report)
    }

    async fn get_report(&self, id: i64) -> Result<Option<DiseaseReport>, AppError> {
        Ok(self.reports().find_one(doc! { "_id": id }, None).await?)
    }

    async fn list_reports(&self) -> Result<Vec<DiseaseReport>, AppError> {
        Self::find_sorted(self.reports(), doc! {}, doc! { "created_at": -1, "_id": -1 }).await
    }

    async fn create_feedback(&self, feedback: NewUserFeedback) -> Result<UserFeedback, AppError> {
        let feedback = feedback.into_feedback(self.next_id("feedback").await?);
        self.feedback()
            .insert_one(&feedback, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert feedback: {}", e);
                AppError::from(e)
            })?;
        Ok(feedback)
    }

    async fn list_feedback_by_analysis(
        &self,
        analysis_id: i64,
    ) -> Result<Vec<UserFeedback>, AppError> {
        Self::find_sorted(
            self.feedback(),
            doc! { "analysis_id": analysis_id },
            doc! { "created_at": 1, "_id": 1 },
        )
        .await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
