//! Provider implementations for chatgate.
//!
//! Every collaborator talks to an OpenAI-compatible HTTP API:
//! - [`OpenAiCompatProvider`]: `/chat/completions` (plain, streaming, tools)
//! - [`OpenAiImageProvider`]: `/images/generations`
//! - [`OpenAiAudioProvider`]: `/audio/transcriptions` and `/audio/speech`

pub mod audio;
mod http;
pub mod images;
pub mod openai_compat;

use std::sync::Arc;

use chatgate_core::{AudioProvider, ImageProvider, Provider};
use tracing::warn;

pub use audio::OpenAiAudioProvider;
pub use images::OpenAiImageProvider;
pub use openai_compat::OpenAiCompatProvider;

/// The three external collaborators, built once and shared.
#[derive(Clone)]
pub struct ProviderSet {
    pub chat: Arc<dyn Provider>,
    pub images: Arc<dyn ImageProvider>,
    pub audio: Arc<dyn AudioProvider>,
}

/// Build all providers from configuration.
///
/// A missing API key is not fatal here: every call fails with
/// [`ProviderError::NotConfigured`](chatgate_core::error::ProviderError)
/// before touching the network, which the gateway reports per request.
pub fn build_from_config(config: &chatgate_config::AppConfig) -> ProviderSet {
    let api_key = config.api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        warn!("No API key configured; provider calls will fail until one is set");
    }

    let client = http::build_client();
    ProviderSet {
        chat: Arc::new(OpenAiCompatProvider::with_client(
            "openai",
            &config.base_url,
            &api_key,
            client.clone(),
        )),
        images: Arc::new(OpenAiImageProvider::new(
            &config.base_url,
            &api_key,
            client.clone(),
        )),
        audio: Arc::new(OpenAiAudioProvider::new(&config.base_url, &api_key, client)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_all_providers_from_defaults() {
        let set = build_from_config(&chatgate_config::AppConfig::default());
        assert_eq!(set.chat.name(), "openai");
        assert_eq!(set.images.name(), "openai-images");
        assert_eq!(set.audio.name(), "openai-audio");
    }

    #[tokio::test]
    async fn missing_api_key_fails_every_call_as_not_configured() {
        use chatgate_core::error::ProviderError;
        use chatgate_core::message::Message;
        use chatgate_core::{ImageRequest, ProviderRequest, SpeechRequest, TranscriptionRequest};

        let mut config = chatgate_config::AppConfig::default();
        // Unroutable; reaching the network would surface as Network instead.
        config.base_url = "http://127.0.0.1:9".into();
        let set = build_from_config(&config);

        let not_configured = |e: ProviderError| matches!(e, ProviderError::NotConfigured(_));

        let chat = ProviderRequest::new("gpt-4o-mini", vec![Message::user("hi")]);
        assert!(not_configured(set.chat.complete(chat.clone()).await.unwrap_err()));
        assert!(not_configured(set.chat.stream(chat).await.unwrap_err()));
        assert!(not_configured(set.chat.health_check().await.unwrap_err()));

        let image = ImageRequest {
            prompt: "a cat".into(),
            model: "dall-e-3".into(),
            quality: None,
            size: None,
            n: 1,
        };
        assert!(not_configured(set.images.generate(image).await.unwrap_err()));

        let transcription = TranscriptionRequest {
            audio: vec![1, 2, 3],
            file_name: "a.mp3".into(),
            model: "whisper-1".into(),
            language: None,
            response_format: "text".into(),
        };
        assert!(not_configured(set.audio.transcribe(transcription).await.unwrap_err()));

        let speech = SpeechRequest {
            input: "hello".into(),
            model: "tts-1".into(),
            voice: "alloy".into(),
            response_format: "mp3".into(),
            speed: 1.0,
        };
        assert!(not_configured(set.audio.synthesize(speech).await.unwrap_err()));
    }
}
