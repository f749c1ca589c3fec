//! Optional local copies of generated media.
//!
//! When enabled, generated images are downloaded to
//! `generated_image_<millis>.png` and synthesized speech is written to
//! `generated_speech_<millis>.mp3` under the configured directory. Saving
//! never fails the request that produced the media; problems are logged.

use std::path::{Path, PathBuf};

use chatgate_config::ArtifactsConfig;
use chatgate_core::error::{ProviderError, Result};
use tracing::{info, warn};

pub struct ArtifactStore {
    enabled: bool,
    dir: PathBuf,
    client: reqwest::Client,
}

impl ArtifactStore {
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            enabled: config.enabled,
            dir: config.dir.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// A store that never writes anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("."),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Download the image at `url`. Returns the written path, if any.
    pub async fn save_image(&self, url: &str) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for("generated_image", "png");
        let result = match self.download(url).await {
            Ok(bytes) => self.write(&path, &bytes).await,
            Err(e) => Err(e.into()),
        };
        self.report("image", path, result)
    }

    /// Write synthesized speech. Returns the written path, if any.
    pub async fn save_speech(&self, audio: &[u8]) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for("generated_speech", "mp3");
        let result = self.write(&path, audio).await;
        self.report("speech", path, result)
    }

    fn path_for(&self, prefix: &str, extension: &str) -> PathBuf {
        let millis = chrono::Utc::now().timestamp_millis();
        self.dir.join(format!("{prefix}_{millis}.{extension}"))
    }

    async fn download(&self, url: &str) -> std::result::Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::StreamInterrupted(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    fn report(&self, kind: &str, path: PathBuf, result: Result<()>) -> Option<PathBuf> {
        match result {
            Ok(()) => {
                info!(kind, path = %path.display(), "Saved generated artifact");
                Some(path)
            }
            Err(error) => {
                warn!(kind, path = %path.display(), %error, "Failed to save generated artifact");
                None
            }
        }
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::disabled()
    }
}
