//! OpenAI image generation (`/images/generations`).

use async_trait::async_trait;
use chatgate_core::error::ProviderError;
use chatgate_core::image::{GeneratedImage, ImageProvider, ImageRequest};
use serde::Deserialize;
use tracing::debug;

use crate::http::{check_status, network_error, require_api_key};

pub struct OpenAiImageProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiImageProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn request_body(request: &ImageRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "prompt": request.prompt,
            "n": request.n,
            "response_format": "url",
        });
        if let Some(quality) = &request.quality {
            body["quality"] = serde_json::json!(quality);
        }
        if let Some(size) = &request.size {
            body["size"] = serde_json::json!(size);
        }
        body
    }

    fn parse_images(response: ImagesResponse) -> Result<Vec<GeneratedImage>, ProviderError> {
        let images: Vec<GeneratedImage> = response
            .data
            .into_iter()
            .filter_map(|d| {
                d.url.map(|url| GeneratedImage {
                    url,
                    revised_prompt: d.revised_prompt,
                })
            })
            .collect();

        if images.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "Image response contained no URLs".into(),
            ));
        }
        Ok(images)
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    fn name(&self) -> &str {
        "openai-images"
    }

    async fn generate(&self, request: ImageRequest) -> Result<Vec<GeneratedImage>, ProviderError> {
        require_api_key(self.name(), &self.api_key)?;
        let url = format!("{}/images/generations", self.base_url);
        debug!(model = %request.model, n = request.n, "Sending image generation request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&Self::request_body(&request))
            .send()
            .await
            .map_err(network_error)?;
        let response = check_status(response, self.name()).await?;

        let parsed: ImagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        Self::parse_images(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}
