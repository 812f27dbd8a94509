//! Application startup and lifecycle management.

use crate::config::{PlantConfig, StorageBackend, VisionBackend};
use crate::handlers;
use crate::services::vision::GeminiConfig;
use crate::services::{
    GeminiVisionProvider, ImageStore, MemStorage, MockVisionProvider, MongoStorage, Storage,
    VisionProvider,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use plant_core::error::AppError;
use plant_core::middleware::{
    metrics::metrics_middleware,
    security_headers::{security_headers_middleware, UPLOADS_PREFIX},
    tracing::request_id_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PlantConfig,
    pub storage: Arc<dyn Storage>,
    pub vision: Arc<dyn VisionProvider>,
    pub images: ImageStore,
}

impl AppState {
    /// Wire up storage, the vision provider, and the upload directory from config.
    pub async fn from_config(config: PlantConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                Arc::new(MemStorage::new())
            }
            StorageBackend::MongoDb => {
                let mongo = config.storage.mongodb.as_ref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "MongoDB settings are required for the mongodb storage backend"
                    ))
                })?;
                let db = MongoStorage::connect(&mongo.uri, &mongo.database).await?;
                db.initialize_indexes().await.map_err(|e| {
                    tracing::error!("Failed to initialize database indexes: {}", e);
                    e
                })?;
                Arc::new(db)
            }
        };

        let vision: Arc<dyn VisionProvider> = match config.vision.provider {
            VisionBackend::Gemini => Arc::new(
                GeminiVisionProvider::new(GeminiConfig {
                    api_key: config.vision.api_key.clone(),
                    model: config.vision.model.clone(),
                    api_base: config.vision.api_base.clone(),
                })
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?,
            ),
            VisionBackend::Mock => Arc::new(MockVisionProvider::new(true)),
        };
        tracing::info!(model = %vision.model(), "Initialized vision provider");

        let images = ImageStore::new(&config.uploads.dir).await.map_err(|e| {
            tracing::error!(
                "Failed to initialize upload directory at {}: {}",
                config.uploads.dir,
                e
            );
            e
        })?;

        Ok(Self {
            config,
            storage,
            vision,
            images,
        })
    }
}

/// Build the HTTP router for the given state.
pub fn build_router(state: AppState) -> Router {
    let session = &state.config.session;
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(session.cookie_name.clone())
        .with_secure(session.cookie_secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_path("/")
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            session.ttl_seconds.max(1),
        )));

    let api = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/user", get(handlers::current_user))
        .route("/analyze", post(handlers::analyze_plant))
        .route("/analyses", get(handlers::list_analyses))
        .route(
            "/analyses/:id",
            get(handlers::get_analysis).delete(handlers::delete_analysis),
        )
        .route("/analyses/:id/feedback", get(handlers::list_feedback))
        .route("/feedback", post(handlers::create_feedback))
        .route(
            "/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route("/reports/:id", get(handlers::get_report))
        .layer(DefaultBodyLimit::max(
            state.config.uploads.max_bytes + MULTIPART_OVERHEAD_BYTES,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .nest("/api", api)
        .nest_service(UPLOADS_PREFIX, ServeDir::new(state.images.base_path()))
        .route_layer(from_fn(metrics_middleware))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: PlantConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(config).await?;
        Self::with_state(state).await
    }

    /// Bind a listener for already-constructed state (port 0 = random port for testing).
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Plant service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
