//! The assistant service behind every HTTP endpoint.
//!
//! Each operation validates its input, assembles a prompt, calls one
//! collaborator, and returns plain text or bytes. The memory-backed chats
//! record the user question and the final answer in the shared
//! [`ChatMemory`] only after the provider has answered, so a failed call
//! leaves the conversation untouched.

use std::sync::Arc;

use base64::Engine;
use chatgate_config::AppConfig;
use chatgate_core::audio::{AudioProvider, SpeechRequest, TranscriptionRequest};
use chatgate_core::error::{Error, ProviderError, Result, ValidationError};
use chatgate_core::image::{ImageProvider, ImageRequest};
use chatgate_core::memory::ChatMemory;
use chatgate_core::message::{ConversationId, Media, Message, Role};
use chatgate_core::provider::{Provider, ProviderRequest};
use chatgate_core::tool::ToolRegistry;
use chatgate_providers::ProviderSet;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::artifacts::ArtifactStore;
use crate::loop_runner::ToolLoop;
use crate::prompts::{self, or_fallback};
use crate::stream_event::AssistantStreamEvent;

/// Longest accepted chat question, in characters.
pub const MAX_QUESTION_CHARS: usize = 200;

/// Longest accepted image-generation query, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

pub struct Assistant {
    config: AppConfig,
    chat: Arc<dyn Provider>,
    images: Arc<dyn ImageProvider>,
    audio: Arc<dyn AudioProvider>,
    memory: Arc<dyn ChatMemory>,
    tools: Arc<ToolRegistry>,
    artifacts: ArtifactStore,
}

impl Assistant {
    pub fn new(
        config: AppConfig,
        providers: ProviderSet,
        memory: Arc<dyn ChatMemory>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let artifacts = ArtifactStore::new(&config.artifacts);
        if artifacts.is_enabled() {
            info!(dir = %artifacts.dir().display(), "Saving generated artifacts");
        }
        Self {
            config,
            chat: providers.chat,
            images: providers.images,
            audio: providers.audio,
            memory,
            tools,
            artifacts,
        }
    }

    /// Replace the artifact store (tests point it at a temp dir).
    pub fn with_artifacts(mut self, artifacts: ArtifactStore) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.chat.name()
    }

    /// Whether the chat provider answers its health check.
    pub async fn provider_healthy(&self) -> bool {
        match self.chat.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                debug!(provider = self.chat.name(), error = %e, "Provider health check failed");
                false
            }
        }
    }

    fn default_request(&self, messages: Vec<Message>) -> ProviderRequest {
        let mut request = ProviderRequest::new(self.config.default_model.clone(), messages);
        request.temperature = self.config.default_temperature;
        request.max_tokens = self.config.default_max_tokens;
        request
    }

    fn persona_request(&self, messages: Vec<Message>) -> ProviderRequest {
        let mut request =
            ProviderRequest::new(self.config.assistant.persona_model.clone(), messages);
        request.temperature = self.config.assistant.persona_temperature;
        request
    }

    // --- Stateless chat ---

    /// Answer a single question with the default model.
    pub async fn ask(&self, question: &str) -> Result<String> {
        ValidationError::check_text("Question", question, Some(MAX_QUESTION_CHARS))?;
        debug!(chars = question.chars().count(), "Simple chat query");

        let response = self
            .chat
            .complete(self.default_request(vec![Message::user(question)]))
            .await?;
        Ok(or_fallback(
            response.message.content,
            prompts::NO_RESPONSE_GENERATED,
        ))
    }

    /// Stream the answer to a single question.
    ///
    /// Emits `Chunk` events for each non-empty delta, then exactly one
    /// terminal `Done` or `Error`.
    pub async fn ask_stream(&self, question: &str) -> Result<mpsc::Receiver<AssistantStreamEvent>> {
        ValidationError::check_text("Question", question, Some(MAX_QUESTION_CHARS))?;
        debug!(chars = question.chars().count(), "Streaming chat query");

        let mut chunks = self
            .chat
            .stream(self.default_request(vec![Message::user(question)]))
            .await?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            while let Some(next) = chunks.recv().await {
                let mut events = Vec::with_capacity(2);
                match next {
                    Ok(chunk) => {
                        if let Some(content) = chunk.content.filter(|c| !c.is_empty()) {
                            events.push(AssistantStreamEvent::Chunk { content });
                        }
                        if chunk.done {
                            events.push(AssistantStreamEvent::Done { usage: chunk.usage });
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Chat stream failed");
                        events.push(AssistantStreamEvent::Error {
                            message: e.to_string(),
                        });
                    }
                }

                for event in events {
                    let terminal = event.is_terminal();
                    if tx.send(event).await.is_err() || terminal {
                        return;
                    }
                }
            }
            // Provider closed without a terminal chunk.
            let _ = tx.send(AssistantStreamEvent::Done { usage: None }).await;
        });

        Ok(rx)
    }

    /// Answer as the configured persona.
    pub async fn ask_with_persona(&self, question: &str) -> Result<String> {
        ValidationError::check_text("Question", question, Some(MAX_QUESTION_CHARS))?;

        let messages = vec![
            Message::system(prompts::persona_system(&self.config.assistant.persona_name)),
            Message::user(question),
        ];
        let response = self.chat.complete(self.persona_request(messages)).await?;
        Ok(or_fallback(
            response.message.content,
            prompts::NO_RESPONSE_GENERATED,
        ))
    }

    // --- Images ---

    /// Describe an uploaded image.
    pub async fn describe_image(&self, image: &[u8], mime_type: &str) -> Result<String> {
        if image.is_empty() {
            return Err(ValidationError::EmptyField { field: "File" }.into());
        }
        if !mime_type.starts_with("image/") {
            return Err(ValidationError::InvalidMedia(
                "Invalid file type. File must be an image".into(),
            )
            .into());
        }
        debug!(bytes = image.len(), mime_type, "Describing image");

        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let messages = vec![
            Message::system(prompts::DESCRIBE_IMAGE_SYSTEM),
            Message::user(prompts::DESCRIBE_IMAGE_USER)
                .with_media(Media::base64(mime_type, encoded)),
        ];
        let response = self.chat.complete(self.persona_request(messages)).await?;
        Ok(or_fallback(
            response.message.content,
            prompts::NO_DESCRIPTION_GENERATED,
        ))
    }

    /// Generate an image for `query` and return the first image URL.
    pub async fn generate_image(&self, query: &str) -> Result<String> {
        ValidationError::check_text("Query", query, Some(MAX_QUERY_CHARS))?;

        let image_config = &self.config.image;
        let request = ImageRequest {
            prompt: prompts::image_prompt(query),
            model: image_config.model.clone(),
            quality: Some(image_config.quality.clone()),
            size: Some(image_config.size.clone()),
            n: 1,
        };
        let url = self
            .images
            .generate(request)
            .await?
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| ProviderError::InvalidResponse("No image returned".into()))?;

        info!(provider = self.images.name(), "Image generated");
        self.artifacts.save_image(&url).await;
        Ok(url)
    }

    // --- Audio ---

    /// Transcribe uploaded audio in the configured transcript format.
    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
        if audio.is_empty() {
            return Err(ValidationError::EmptyField { field: "File" }.into());
        }

        let audio_config = &self.config.audio;
        let language = Some(audio_config.language.clone()).filter(|l| !l.trim().is_empty());
        let request = TranscriptionRequest {
            audio,
            file_name: file_name.to_string(),
            model: audio_config.transcription_model.clone(),
            language,
            response_format: audio_config.transcript_format.clone(),
        };
        Ok(self.audio.transcribe(request).await?)
    }

    /// Synthesize speech for `text`.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        ValidationError::check_text("Text", text, None)?;

        let audio_config = &self.config.audio;
        let request = SpeechRequest {
            input: text.to_string(),
            model: audio_config.speech_model.clone(),
            voice: audio_config.voice.clone(),
            response_format: audio_config.speech_format.clone(),
            speed: audio_config.speed,
        };
        let audio = self.audio.synthesize(request).await?;
        self.artifacts.save_speech(&audio).await;
        Ok(audio)
    }

    // --- Conversations ---

    /// Chat with the conversation's window as context. No tools.
    pub async fn chat_with_memory(&self, id: &ConversationId, question: &str) -> Result<String> {
        ValidationError::check_text("Question", question, Some(MAX_QUESTION_CHARS))?;

        let mut messages = self.history(id);
        debug!(conversation_id = %id, history = messages.len(), "Chat with memory");
        messages.push(Message::user(question));

        let response = self.chat.complete(self.default_request(messages)).await?;
        let answer = or_fallback(response.message.content, prompts::NO_RESPONSE_RECEIVED);

        self.record_exchange(id, question, &answer)?;
        Ok(answer)
    }

    /// Chat with the name tools available and the conversation's window as
    /// context. Only the question and final answer are remembered.
    pub async fn chat_with_tools(&self, id: &ConversationId, question: &str) -> Result<String> {
        ValidationError::check_text("Question", question, Some(MAX_QUESTION_CHARS))?;

        let history = self.history(id);
        debug!(conversation_id = %id, history = history.len(), "Chat with tools");

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(prompts::NAME_ASSISTANT_SYSTEM));
        messages.extend(history);
        messages.push(Message::user(question));

        let assistant_config = &self.config.assistant;
        let runner = ToolLoop::new(
            self.chat.clone(),
            self.config.default_model.clone(),
            assistant_config.tool_temperature,
            self.tools.clone(),
        )
        .with_max_tokens(Some(assistant_config.tool_max_tokens))
        .with_max_iterations(assistant_config.max_tool_iterations);

        let outcome = runner.run(messages).await?;
        info!(
            conversation_id = %id,
            iterations = outcome.iterations,
            tool_calls = outcome.tool_calls_made,
            "Tool chat completed"
        );

        let answer = or_fallback(outcome.text, prompts::NO_RESPONSE_RECEIVED);
        self.record_exchange(id, question, &answer)?;
        Ok(answer)
    }

    /// The window for `id`, shaped to be sent back to the model.
    fn history(&self, id: &ConversationId) -> Vec<Message> {
        self.memory.read(id).into_iter().map(as_context).collect()
    }

    fn record_exchange(&self, id: &ConversationId, question: &str, answer: &str) -> Result<()> {
        self.memory.append(id, Message::user(question))?;
        self.memory.append(id, Message::assistant(answer))?;
        Ok(())
    }

    /// Forget everything remembered for `id`.
    pub fn reset(&self, id: &ConversationId) {
        info!(conversation_id = %id, "Resetting conversation");
        self.memory.reset(id);
    }

    /// The remembered turns for `id`, oldest first.
    pub fn window(&self, id: &ConversationId) -> Vec<Message> {
        self.memory.read(id)
    }

    /// Record a turn directly, without calling the model.
    pub fn append_turn(&self, id: &ConversationId, role: Role, text: &str) -> Result<()> {
        self.memory
            .append(id, Message::new(role, text))
            .map_err(Error::from)
    }
}

/// Stored `tool` turns carry no call id and follow no `tool_calls`
/// request, so providers reject them as-is. They are replayed as plain
/// user-side context instead.
fn as_context(turn: Message) -> Message {
    if turn.role != Role::Tool {
        return turn;
    }
    Message {
        role: Role::User,
        content: format!("Tool output: {}", turn.content),
        tool_call_id: None,
        ..turn
    }
}
