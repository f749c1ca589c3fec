//! OpenAI audio endpoints: Whisper transcription and text-to-speech.

use async_trait::async_trait;
use chatgate_core::audio::{AudioProvider, SpeechRequest, TranscriptionRequest};
use chatgate_core::error::ProviderError;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::http::{check_status, network_error, require_api_key};

pub struct OpenAiAudioProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiAudioProvider {
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

    fn transcription_form(request: TranscriptionRequest) -> Form {
        let file_name = if request.file_name.trim().is_empty() {
            "audio.mp3".to_string()
        } else {
            request.file_name
        };

        let mut form = Form::new()
            .part("file", Part::bytes(request.audio).file_name(file_name))
            .text("model", request.model)
            .text("response_format", request.response_format);
        if let Some(language) = request.language {
            form = form.text("language", language);
        }
        form
    }

    /// JSON formats wrap the transcript in `{"text": ...}`; the others are the body itself.
    fn transcript_from_body(format: &str, body: String) -> Result<String, ProviderError> {
        if format != "json" && format != "verbose_json" {
            return Ok(body);
        }
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse transcript: {e}")))?;
        value["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::InvalidResponse("Transcript missing 'text'".into()))
    }

    fn speech_body(request: &SpeechRequest) -> serde_json::Value {
        serde_json::json!({
            "model": request.model,
            "input": request.input,
            "voice": request.voice,
            "response_format": request.response_format,
            "speed": request.speed,
        })
    }
}

#[async_trait]
impl AudioProvider for OpenAiAudioProvider {
    fn name(&self) -> &str {
        "openai-audio"
    }

    async fn transcribe(&self, request: TranscriptionRequest) -> Result<String, ProviderError> {
        require_api_key(self.name(), &self.api_key)?;
        let url = format!("{}/audio/transcriptions", self.base_url);
        let format = request.response_format.clone();
        debug!(
            model = %request.model,
            bytes = request.audio.len(),
            format = %format,
            "Sending transcription request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(Self::transcription_form(request))
            .send()
            .await
            .map_err(network_error)?;
        let response = check_status(response, self.name()).await?;

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Self::transcript_from_body(&format, body)
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        require_api_key(self.name(), &self.api_key)?;
        let url = format!("{}/audio/speech", self.base_url);
        debug!(
            model = %request.model,
            voice = %request.voice,
            chars = request.input.chars().count(),
            "Sending speech request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&Self::speech_body(&request))
            .send()
            .await
            .map_err(network_error)?;
        let response = check_status(response, self.name()).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::StreamInterrupted(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ProviderError::InvalidResponse("Empty audio response".into()));
        }
        Ok(bytes.to_vec())
    }
}
