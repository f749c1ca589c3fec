//! The assistant behind the chatgate HTTP API.
//!
//! [`Assistant`] owns the prompt text, the model settings per operation,
//! the conversation memory bookkeeping and the optional artifact saving.
//! The tool-enabled chat follows a **call → act → observe** cycle in
//! [`ToolLoop`]:
//!
//! 1. **Send** system prompt, history and question to the model
//! 2. **If tool calls**: execute them, append the results, call again
//! 3. **If text**: that is the answer
//!
//! The loop stops at the configured iteration cap.

pub mod artifacts;
pub mod assistant;
pub mod loop_runner;
pub mod prompts;
pub mod stream_event;

#[cfg(test)]
mod test_helpers;

pub use artifacts::ArtifactStore;
pub use assistant::{Assistant, MAX_QUERY_CHARS, MAX_QUESTION_CHARS};
pub use loop_runner::{LoopOutcome, ToolLoop};
pub use stream_event::AssistantStreamEvent;
