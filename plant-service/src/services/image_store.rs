use plant_core::error::AppError;
use plant_core::middleware::security_headers::UPLOADS_PREFIX;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Writes uploaded images to a local directory served under `/uploads`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    base_path: PathBuf,
}

impl ImageStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Store the bytes under a fresh name and return the public path.
    pub async fn save(&self, data: &[u8], mime_type: &str) -> Result<String, AppError> {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension_for(mime_type));
        fs::write(self.base_path.join(&file_name), data)
            .await
            .map_err(|e| {
                tracing::error!(file = %file_name, "Failed to write upload: {}", e);
                AppError::from(e)
            })?;
        Ok(format!("{}/{}", UPLOADS_PREFIX, file_name))
    }

    /// Remove a previously saved image by its public path. Unknown paths are ignored.
    pub async fn delete(&self, public_path: &str) -> Result<(), AppError> {
        let Some(file_name) = public_path
            .strip_prefix(UPLOADS_PREFIX)
            .map(|p| p.trim_start_matches('/'))
            .filter(|p| !p.is_empty() && !p.contains('/') && !p.contains(".."))
        else {
            return Ok(());
        };

        let path = self.base_path.join(file_name);
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "image/bmp" => "bmp",
        _ => "img",
    }
}
