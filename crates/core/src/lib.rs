//! # chatgate core
//!
//! Domain types, traits, and error definitions shared by every chatgate crate.
//! Nothing here talks to the network or the filesystem.
//!
//! ## Layout
//!
//! Each collaborator is a trait defined here and implemented elsewhere:
//! - [`Provider`], [`ImageProvider`], [`AudioProvider`] in `chatgate-providers`
//! - [`Tool`] in `chatgate-tools`
//! - [`ChatMemory`] in `chatgate-memory`

pub mod audio;
pub mod error;
pub mod image;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use audio::{AudioProvider, SpeechRequest, TranscriptionRequest};
pub use error::{Error, Result, ValidationError};
pub use image::{GeneratedImage, ImageProvider, ImageRequest};
pub use memory::ChatMemory;
pub use message::{ConversationId, Media, MediaSource, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
