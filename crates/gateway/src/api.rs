//! HTTP API under `/api/chat`.
//!
//! Endpoints:
//!
//! - `GET    /api/chat`                             : Welcome text
//! - `GET    /api/chat/messages?question=`          : One-shot answer
//! - `GET    /api/chat/messages/stream?question=`   : SSE stream of the answer
//! - `GET    /api/chat/messages/lexbot?question=`   : Answer as the persona
//! - `POST   /api/chat/images/describe`             : Describe an uploaded image
//! - `GET    /api/chat/images/generate/url?query=`  : Generate an image, return its URL
//! - `POST   /api/chat/speech-to-text`              : Transcribe uploaded audio
//! - `GET    /api/chat/text-to-speech?text=`        : MP3 speech
//! - `GET    /api/chat/messages/chat-memory`        : Chat with conversation memory
//! - `GET    /api/chat/messages/new-chat-memory`    : Chat with memory and name tools
//! - `GET    /api/chat/reset-chat?conversationId=`  : Forget a conversation
//! - `GET    /api/chat/conversations/{id}`          : Remembered turns
//! - `POST   /api/chat/conversations/{id}/turns`    : Record a turn
//! - `DELETE /api/chat/conversations/{id}`          : Forget a conversation

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Multipart, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chatgate_agent::Assistant;
use chatgate_core::error::ValidationError;
use chatgate_core::message::{ConversationId, Message, Role};
use serde::Deserialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::error::ApiError;

pub const WELCOME: &str = "Welcome to the OpenAI Chat API!";

// ── State ─────────────────────────────────────────────────────────────────

pub struct ApiState {
    pub assistant: Arc<Assistant>,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl ApiState {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            start_time: chrono::Utc::now(),
        }
    }
}

pub type SharedApiState = Arc<ApiState>;

// ── Router ────────────────────────────────────────────────────────────────

pub fn chat_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/api/chat", get(welcome_handler))
        .route("/api/chat/messages", get(ask_handler))
        .route("/api/chat/messages/stream", get(ask_stream_handler))
        .route("/api/chat/messages/lexbot", get(persona_handler))
        .route(
            "/api/chat/images/describe",
            axum::routing::post(describe_image_handler),
        )
        .route("/api/chat/images/generate/url", get(generate_image_handler))
        .route(
            "/api/chat/speech-to-text",
            axum::routing::post(speech_to_text_handler),
        )
        .route("/api/chat/text-to-speech", get(text_to_speech_handler))
        .route("/api/chat/messages/chat-memory", get(chat_memory_handler))
        .route(
            "/api/chat/messages/new-chat-memory",
            get(tool_chat_memory_handler),
        )
        .route("/api/chat/reset-chat", get(reset_chat_handler))
        .route(
            "/api/chat/conversations/{id}",
            get(get_window_handler).delete(delete_conversation_handler),
        )
        .route(
            "/api/chat/conversations/{id}/turns",
            axum::routing::post(append_turn_handler),
        )
        .with_state(state)
}

// ── Request types ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QuestionParams {
    #[serde(default)]
    question: String,
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct TextParams {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct MemoryChatParams {
    #[serde(default, rename = "conversationId")]
    conversation_id: String,
    #[serde(default)]
    question: String,
}

#[derive(Debug, Deserialize)]
struct ConversationParams {
    #[serde(default, rename = "conversationId")]
    conversation_id: String,
}

#[derive(Debug, Deserialize)]
struct TurnRequest {
    role: Role,
    content: String,
}

/// A file pulled out of a multipart form.
struct Upload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Read the `file` field of a multipart form.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        return Ok(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ValidationError::EmptyField { field: "File" }.into())
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn welcome_handler() -> &'static str {
    WELCOME
}

async fn ask_handler(
    State(state): State<SharedApiState>,
    query: Result<Query<QuestionParams>, QueryRejection>,
) -> Result<String, ApiError> {
    let Query(params) = query?;
    Ok(state.assistant.ask(&params.question).await?)
}

/// `GET /api/chat/messages/stream`: `chunk` events, then `done` (or `error`).
async fn ask_stream_handler(
    State(state): State<SharedApiState>,
    query: Result<Query<QuestionParams>, QueryRejection>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let Query(params) = query?;
    let rx = state.assistant.ask_stream(&params.question).await?;

    let stream = ReceiverStream::new(rx).map(|event| {
        let event_type = event.event_type();
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().event(event_type).data(data))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn persona_handler(
    State(state): State<SharedApiState>,
    query: Result<Query<QuestionParams>, QueryRejection>,
) -> Result<String, ApiError> {
    let Query(params) = query?;
    Ok(state.assistant.ask_with_persona(&params.question).await?)
}

async fn describe_image_handler(
    State(state): State<SharedApiState>,
    multipart: Multipart,
) -> Result<String, ApiError> {
    let upload = read_upload(multipart).await?;
    info!(file = %upload.file_name, content_type = %upload.content_type, bytes = upload.bytes.len(), "Image upload");
    Ok(state
        .assistant
        .describe_image(&upload.bytes, &upload.content_type)
        .await?)
}

async fn generate_image_handler(
    State(state): State<SharedApiState>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<String, ApiError> {
    let Query(params) = query?;
    Ok(state.assistant.generate_image(&params.query).await?)
}

async fn speech_to_text_handler(
    State(state): State<SharedApiState>,
    multipart: Multipart,
) -> Result<String, ApiError> {
    let upload = read_upload(multipart).await?;
    info!(file = %upload.file_name, bytes = upload.bytes.len(), "Audio upload");
    Ok(state
        .assistant
        .transcribe(upload.bytes, &upload.file_name)
        .await?)
}

async fn text_to_speech_handler(
    State(state): State<SharedApiState>,
    query: Result<Query<TextParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let audio = state.assistant.synthesize(&params.text).await?;
    let disposition = format!(
        "attachment; filename=speech_{}.mp3",
        chrono::Utc::now().timestamp_millis()
    );
    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        audio,
    )
        .into_response())
}

async fn chat_memory_handler(
    State(state): State<SharedApiState>,
    query: Result<Query<MemoryChatParams>, QueryRejection>,
) -> Result<String, ApiError> {
    let Query(params) = query?;
    let id = ConversationId::parse(params.conversation_id)?;
    debug!(conversation_id = %id, "chat-memory request");
    Ok(state.assistant.chat_with_memory(&id, &params.question).await?)
}

async fn tool_chat_memory_handler(
    State(state): State<SharedApiState>,
    query: Result<Query<MemoryChatParams>, QueryRejection>,
) -> Result<String, ApiError> {
    let Query(params) = query?;
    let id = ConversationId::parse(params.conversation_id)?;
    debug!(conversation_id = %id, "new-chat-memory request");
    Ok(state.assistant.chat_with_tools(&id, &params.question).await?)
}

async fn reset_chat_handler(
    State(state): State<SharedApiState>,
    query: Result<Query<ConversationParams>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let Query(params) = query?;
    let id = ConversationId::parse(params.conversation_id)?;
    state.assistant.reset(&id);
    Ok(StatusCode::OK)
}

/// Unknown and malformed ids both read as an empty conversation.
async fn get_window_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Json<Vec<Message>> {
    match ConversationId::parse(id) {
        Ok(id) => Json(state.assistant.window(&id)),
        Err(_) => Json(Vec::new()),
    }
}

async fn append_turn_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    payload: Result<Json<TurnRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = ConversationId::parse(id)?;
    let Json(turn) = payload?;
    state.assistant.append_turn(&id, turn.role, &turn.content)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_conversation_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = ConversationId::parse(id)?;
    state.assistant.reset(&id);
    Ok(StatusCode::NO_CONTENT)
}
