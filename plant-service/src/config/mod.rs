use serde::Deserialize;
use plant_core::config as core_config;
use plant_core::error::AppError;
use std::env;

/// Default upload limit (10MB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default session lifetime (7 days).
const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct PlantConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
    pub vision: VisionConfig,
    pub session: SessionConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub mongodb: Option<MongoConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    MongoDb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded images are written to and served from.
    pub dir: String,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub provider: VisionBackend,
    pub api_key: String,
    /// Multimodal model used for diagnosis (e.g., gemini-2.0-flash)
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisionBackend {
    Gemini,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: i64,
    /// Adds the `Secure` attribute; enable behind TLS.
    pub cookie_secure: bool,
}

impl PlantConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: StorageBackend = get_env("STORAGE_BACKEND", Some("memory"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let mongodb = match backend {
            StorageBackend::MongoDb => Some(MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("plant_db"), is_prod)?,
            }),
            StorageBackend::Memory => None,
        };

        let provider: VisionBackend = get_env("VISION_PROVIDER", Some("gemini"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // The mock provider never calls out, so it doesn't need a key
        let api_key = match provider {
            VisionBackend::Gemini => get_env("GOOGLE_API_KEY", None, is_prod)?,
            VisionBackend::Mock => env::var("GOOGLE_API_KEY").unwrap_or_default(),
        };

        Ok(PlantConfig {
            common: common_config,
            storage: StorageConfig { backend, mongodb },
            uploads: UploadConfig {
                dir: get_env("UPLOAD_DIR", Some("uploads"), is_prod)?,
                max_bytes: get_env(
                    "MAX_UPLOAD_BYTES",
                    Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
            vision: VisionConfig {
                provider,
                api_key,
                model: get_env("GEMINI_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                api_base: get_env(
                    "GEMINI_API_BASE",
                    Some("https://generativelanguage.googleapis.com/v1beta"),
                    is_prod,
                )?,
            },
            session: SessionConfig {
                cookie_name: get_env("SESSION_COOKIE_NAME", Some("plant_sid"), is_prod)?,
                ttl_seconds: get_env(
                    "SESSION_TTL_SECONDS",
                    Some(&DEFAULT_SESSION_TTL_SECONDS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
                cookie_secure: get_env("SESSION_COOKIE_SECURE", Some("false"), is_prod)?
                    .parse()
                    .unwrap_or(false),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "mongodb" | "mongo" => Ok(StorageBackend::MongoDb),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

impl std::str::FromStr for VisionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(VisionBackend::Gemini),
            "mock" => Ok(VisionBackend::Mock),
            _ => Err(format!("Invalid vision provider: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
