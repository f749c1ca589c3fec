//! Error types for the chatgate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own error enum; [`Error`] unifies them.

use thiserror::Error;

/// The top-level error type for all chatgate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Input validation ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Local file output ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed or missing caller input.
///
/// Always deterministic and caller-correctable; nothing retries on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Conversation ID cannot be null or empty")]
    EmptyConversationId,

    #[error("Conversation ID cannot exceed {max} characters (got {len})")]
    ConversationIdTooLong { len: usize, max: usize },

    #[error("{field} cannot be null or empty")]
    EmptyField { field: &'static str },

    #[error("{field} cannot exceed {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Invalid media: {0}")]
    InvalidMedia(String),
}

impl ValidationError {
    /// Check that `value` is non-blank and at most `max` characters.
    pub fn check_text(
        field: &'static str,
        value: &str,
        max: Option<usize>,
    ) -> std::result::Result<(), Self> {
        if value.trim().is_empty() {
            return Err(Self::EmptyField { field });
        }
        if let Some(max) = max {
            if value.chars().count() > max {
                return Err(Self::FieldTooLong { field, max });
            }
        }
        Ok(())
    }
}

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn validation_error_converts_into_error() {
        let err: Error = ValidationError::EmptyField { field: "Question" }.into();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation error: Question cannot be null or empty"
        );
    }

    #[test]
    fn check_text_rejects_blank_and_long_values() {
        assert_eq!(
            ValidationError::check_text("Question", "   ", Some(200)),
            Err(ValidationError::EmptyField { field: "Question" })
        );
        let long = "x".repeat(201);
        assert_eq!(
            ValidationError::check_text("Question", &long, Some(200)),
            Err(ValidationError::FieldTooLong {
                field: "Question",
                max: 200
            })
        );
        assert!(ValidationError::check_text("Question", "hello", Some(200)).is_ok());
        assert!(ValidationError::check_text("Text", &long, None).is_ok());
    }

    #[test]
    fn check_text_counts_characters_not_bytes() {
        // 200 multi-byte characters are still within a 200-char limit.
        let value = "é".repeat(200);
        assert!(ValidationError::check_text("Question", &value, Some(200)).is_ok());
    }
}
