//! Audio Provider trait: speech-to-text and text-to-speech.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;

/// A speech-to-text request.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// Raw audio bytes
    pub audio: Vec<u8>,

    /// Original file name; providers use the extension to detect the format
    pub file_name: String,

    /// Model name (e.g., "whisper-1")
    pub model: String,

    /// ISO-639-1 language hint
    pub language: Option<String>,

    /// Output format: "json", "text", "srt", "verbose_json" or "vtt"
    pub response_format: String,
}

/// A text-to-speech request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Text to speak
    pub input: String,

    /// Model name (e.g., "tts-1")
    pub model: String,

    /// Voice preset (alloy, echo, fable, onyx, nova, shimmer)
    pub voice: String,

    /// Audio container: "mp3", "opus", "aac", "flac", "wav"
    pub response_format: String,

    /// Playback speed, 0.25 to 4.0
    pub speed: f32,
}

/// The Audio Provider collaborator.
#[async_trait]
pub trait AudioProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Transcribe audio; returns the body in the requested format.
    async fn transcribe(&self, request: TranscriptionRequest) -> Result<String, ProviderError>;

    /// Synthesize speech; returns encoded audio bytes.
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError>;
}
