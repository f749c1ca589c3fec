//! Assistant-level streaming events.
//!
//! `AssistantStreamEvent` wraps provider-level stream chunks into the
//! events the gateway forwards to clients over SSE:
//! - `chunk`: partial text from the model
//! - `done` : stream is complete
//! - `error`: the provider failed mid-stream

use chatgate_core::provider::Usage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantStreamEvent {
    /// Partial text token from the LLM.
    Chunk { content: String },

    /// The stream is complete.
    Done { usage: Option<Usage> },

    /// An error occurred mid-stream.
    Error { message: String },
}

impl AssistantStreamEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Chunk { .. })
    }
}
