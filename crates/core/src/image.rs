//! Image Provider trait: text-to-image generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;

/// A request to generate one or more images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The full prompt sent to the model
    pub prompt: String,

    /// Model name (e.g., "dall-e-3")
    pub model: String,

    /// Quality hint ("standard" or "hd")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    /// Output size, e.g. "1024x1024"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Number of images
    pub n: u32,
}

/// One generated image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Where the provider hosts the image
    pub url: String,

    /// The prompt after provider-side rewriting, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// The Image Provider collaborator.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Generate images and return their URLs, in provider order.
    async fn generate(&self, request: ImageRequest) -> Result<Vec<GeneratedImage>, ProviderError>;
}
