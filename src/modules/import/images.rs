//! Primary-image download for imported recipes
//!
//! Failures are contained: an import that cannot fetch its image proceeds
//! without one.
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use crate::shared::errors::{AppError, AppResult};
use crate::log_warn;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);
const KNOWN_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Sniff a file extension from an image URL, stripping any query string.
/// Unrecognized extensions default to `jpg`.
pub fn extension_from_url(url: &str) -> &'static str {
    let ext: String = url
        .rsplit('.')
        .next()
        .unwrap_or("")
        .split('?')
        .next()
        .unwrap_or("")
        .chars()
        .take(4)
        .collect();

    KNOWN_EXTENSIONS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(&ext))
        .copied()
        .unwrap_or("jpg")
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Download the image at `url` into the upload folder and return the
    /// stored filename, or None when the download fails for any reason.
    async fn fetch_image(&self, url: &str) -> Option<String>;
}

pub struct DiskImageStore {
    client: Client,
    upload_folder: PathBuf,
}

impl DiskImageStore {
    pub fn new(upload_folder: PathBuf) -> AppResult<Self> {
        std::fs::create_dir_all(&upload_folder)?;
        let client = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            upload_folder,
        })
    }

    async fn download(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Image host returned HTTP {}",
                response.status()
            )));
        }
        let bytes = response.bytes().await?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension_from_url(url));
        tokio::fs::write(self.upload_folder.join(&filename), &bytes).await?;
        Ok(filename)
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn fetch_image(&self, url: &str) -> Option<String> {
        match self.download(url).await {
            Ok(filename) => Some(filename),
            Err(e) => {
                log_warn!("Image download failed for {}: {}", url, e);
                None
            }
        }
    }
}
