//! Conversation memory for chatgate.
//!
//! [`WindowMemory`] keeps the last `W` turns of every conversation in
//! process memory. Nothing is persisted.

pub mod window;

pub use window::{DEFAULT_WINDOW_SIZE, WindowMemory};
