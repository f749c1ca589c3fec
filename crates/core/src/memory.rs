//! ChatMemory trait: per-conversation history used as model context.
//!
//! Operations are synchronous: implementations keep everything in process
//! memory and never block on I/O.

use crate::error::ValidationError;
use crate::message::{ConversationId, Message};

/// Conversation-scoped turn history.
///
/// Implementations must serialize mutations to the same conversation and
/// keep different conversations independent.
pub trait ChatMemory: Send + Sync {
    /// Append a turn to the conversation, creating it if needed.
    ///
    /// Fails with [`ValidationError`] if the turn has blank content; the
    /// stored history is left untouched in that case.
    fn append(&self, id: &ConversationId, turn: Message) -> Result<(), ValidationError>;

    /// Current history for the conversation, oldest first.
    ///
    /// Unknown conversations yield an empty vector.
    fn read(&self, id: &ConversationId) -> Vec<Message>;

    /// Forget the conversation's history. Unknown ids are a no-op.
    fn reset(&self, id: &ConversationId);
}
