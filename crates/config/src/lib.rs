//! Configuration loading, validation, and management for chatgate.
//!
//! Loads configuration from `~/.chatgate/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.chatgate/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the OpenAI-compatible backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for plain questions and memory chats
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Temperature for plain questions
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per plain completion (unset = provider default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Conversation memory
    #[serde(default)]
    pub memory: MemoryConfig,

    /// HTTP server
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Persona, vision and tool-chat settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Image generation
    #[serde(default)]
    pub image: ImageConfig,

    /// Transcription and speech synthesis
    #[serde(default)]
    pub audio: AudioConfig,

    /// Local copies of generated images and speech
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("memory", &self.memory)
            .field("gateway", &self.gateway)
            .field("assistant", &self.assistant)
            .field("image", &self.image)
            .field("audio", &self.audio)
            .field("artifacts", &self.artifacts)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Turns retained per conversation
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_window_size() -> usize {
    10
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Largest accepted request body (uploads included)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Origins allowed by CORS; empty = `http://localhost:<port>` only
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_origins: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Name the persona endpoint introduces itself with
    #[serde(default = "default_persona_name")]
    pub persona_name: String,

    /// Model for persona and image-description requests
    #[serde(default = "default_persona_model")]
    pub persona_model: String,

    #[serde(default = "default_persona_temperature")]
    pub persona_temperature: f32,

    /// Temperature for the tool-enabled memory chat
    #[serde(default = "default_tool_temperature")]
    pub tool_temperature: f32,

    /// Max tokens for the tool-enabled memory chat
    #[serde(default = "default_tool_max_tokens")]
    pub tool_max_tokens: u32,

    /// Tool-call rounds before the loop gives up
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,
}

fn default_persona_name() -> String {
    "LEXBOT".into()
}
fn default_persona_model() -> String {
    "gpt-4.1-mini".into()
}
fn default_persona_temperature() -> f32 {
    0.3
}
fn default_tool_temperature() -> f32 {
    0.2
}
fn default_tool_max_tokens() -> u32 {
    1000
}
fn default_max_tool_iterations() -> u32 {
    10
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            persona_name: default_persona_name(),
            persona_model: default_persona_model(),
            persona_temperature: default_persona_temperature(),
            tool_temperature: default_tool_temperature(),
            tool_max_tokens: default_tool_max_tokens(),
            max_tool_iterations: default_max_tool_iterations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_model")]
    pub model: String,

    #[serde(default = "default_image_quality")]
    pub quality: String,

    #[serde(default = "default_image_size")]
    pub size: String,
}

fn default_image_model() -> String {
    "dall-e-3".into()
}
fn default_image_quality() -> String {
    "hd".into()
}
fn default_image_size() -> String {
    "1024x1024".into()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            quality: default_image_quality(),
            size: default_image_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    /// Language hint for transcription
    #[serde(default = "default_language")]
    pub language: String,

    /// Transcript format returned to callers
    #[serde(default = "default_transcript_format")]
    pub transcript_format: String,

    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    #[serde(default = "default_voice")]
    pub voice: String,

    #[serde(default = "default_speech_format")]
    pub speech_format: String,

    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_transcription_model() -> String {
    "whisper-1".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_transcript_format() -> String {
    "vtt".into()
}
fn default_speech_model() -> String {
    "tts-1".into()
}
fn default_voice() -> String {
    "alloy".into()
}
fn default_speech_format() -> String {
    "mp3".into()
}
fn default_speed() -> f32 {
    1.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            transcription_model: default_transcription_model(),
            language: default_language(),
            transcript_format: default_transcript_format(),
            speech_model: default_speech_model(),
            voice: default_voice(),
            speech_format: default_speech_format(),
            speed: default_speed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Save generated images and speech to `dir`
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_artifacts_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.chatgate/config.toml).
    ///
    /// Environment overrides:
    /// - `CHATGATE_API_KEY`, then `OPENAI_API_KEY` (only if no key in the file)
    /// - `CHATGATE_BASE_URL`
    /// - `CHATGATE_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("CHATGATE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .filter(|k| !k.trim().is_empty());
        }

        if let Ok(base_url) = std::env::var("CHATGATE_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(model) = std::env::var("CHATGATE_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chatgate")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, t) in [
            ("default_temperature", self.default_temperature),
            ("assistant.persona_temperature", self.assistant.persona_temperature),
            ("assistant.tool_temperature", self.assistant.tool_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        if self.memory.window_size == 0 {
            return Err(ConfigError::ValidationError(
                "memory.window_size must be at least 1".into(),
            ));
        }

        if !(0.25..=4.0).contains(&self.audio.speed) {
            return Err(ConfigError::ValidationError(
                "audio.speed must be between 0.25 and 4.0".into(),
            ));
        }

        if self.gateway.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.max_upload_bytes must be > 0".into(),
            ));
        }

        if self.assistant.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.max_tool_iterations must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: None,
            memory: MemoryConfig::default(),
            gateway: GatewayConfig::default(),
            assistant: AssistantConfig::default(),
            image: ImageConfig::default(),
            audio: AudioConfig::default(),
            artifacts: ArtifactsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
