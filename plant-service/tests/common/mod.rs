#![allow(dead_code)]

use plant_core::config::Config as CoreConfig;
use plant_service::config::{
    PlantConfig, SessionConfig, StorageBackend, StorageConfig, UploadConfig, VisionBackend,
    VisionConfig,
};
use plant_service::services::{Storage, VisionProvider};
use plant_service::startup::{AppState, Application};
use reqwest::multipart;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "leafy-green-42";

/// Smallest thing that looks like a PNG; the mock provider never decodes it.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

pub fn test_config(upload_dir: &str) -> PlantConfig {
    PlantConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "info".to_string(),
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            mongodb: None,
        },
        uploads: UploadConfig {
            dir: upload_dir.to_string(),
            max_bytes: 1024 * 1024,
        },
        vision: VisionConfig {
            provider: VisionBackend::Mock,
            api_key: String::new(),
            model: "mock".to_string(),
            api_base: String::new(),
        },
        session: SessionConfig {
            cookie_name: "plant_sid".to_string(),
            ttl_seconds: 3600,
            cookie_secure: false,
        },
        otlp_endpoint: None,
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub upload_dir: String,
    /// Client with a cookie store, so sessions stick across requests.
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let upload_dir = format!("target/test-uploads-{}", Uuid::new_v4());
        Self::spawn_with(test_config(&upload_dir)).await
    }

    pub async fn spawn_with(config: PlantConfig) -> Self {
        let state = AppState::from_config(config)
            .await
            .expect("Failed to build application state");
        Self::spawn_state(state).await
    }

    /// Swap in a specific vision provider.
    pub async fn spawn_with_vision(vision: Arc<dyn VisionProvider>) -> Self {
        Self::spawn_customized(|state| state.vision = vision).await
    }

    /// Swap in a specific storage backend.
    pub async fn spawn_with_storage(storage: Arc<dyn Storage>) -> Self {
        Self::spawn_customized(|state| state.storage = storage).await
    }

    async fn spawn_customized(customize: impl FnOnce(&mut AppState)) -> Self {
        let upload_dir = format!("target/test-uploads-{}", Uuid::new_v4());
        let mut state = AppState::from_config(test_config(&upload_dir))
            .await
            .expect("Failed to build application state");
        customize(&mut state);
        Self::spawn_state(state).await
    }

    async fn spawn_state(state: AppState) -> Self {
        let upload_dir = state.config.uploads.dir.clone();

        let app = Application::with_state(state)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let probe = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if probe.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            upload_dir,
            client: new_client(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Register `username` on this app's client, leaving it logged in.
    pub async fn register(&self, username: &str) -> Value {
        register_with(&self.client, self, username).await
    }

    pub async fn upload_image(&self, bytes: &[u8], mime: &str) -> reqwest::Response {
        let form = multipart::Form::new().part(
            "image",
            multipart::Part::bytes(bytes.to_vec())
                .file_name("leaf.png")
                .mime_str(mime)
                .unwrap(),
        );

        self.client
            .post(self.url("/api/analyze"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Upload a PNG and return the created analysis.
    pub async fn create_analysis(&self) -> Value {
        let response = self.upload_image(PNG_BYTES, "image/png").await;
        assert_eq!(response.status(), 201);
        response.json().await.expect("Failed to parse JSON")
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.upload_dir).await;
    }
}

pub fn new_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build HTTP client")
}

/// Value of the session cookie in a `Set-Cookie` header, if any.
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("plant_sid="))
        .and_then(|v| v.split(';').next())
        .map(|pair| pair.to_string())
}

pub async fn register_with(client: &reqwest::Client, app: &TestApp, username: &str) -> Value {
    let response = client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "username": username,
            "password": TEST_PASSWORD,
            "email": format!("{}@example.com", username),
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse JSON")
}
