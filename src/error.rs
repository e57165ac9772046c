//! Error types for photo enhancement and mixing.

use crate::locale::Locale;
use serde::{Deserialize, Serialize};

/// Why a submit could not proceed for lack of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInput {
    /// No source image has been uploaded.
    NoImage,
    /// Fewer source images than the workflow needs.
    TooFewImages {
        /// Minimum number of images.
        required: usize,
        /// Number of images currently held.
        provided: usize,
    },
    /// The prompt is empty.
    EmptyPrompt,
}

impl std::fmt::Display for MissingInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoImage => write!(f, "no source image"),
            Self::TooFewImages { required, provided } => {
                write!(f, "need at least {required} images, got {provided}")
            }
            Self::EmptyPrompt => write!(f, "prompt is empty"),
        }
    }
}

/// Errors that can occur while preparing or running a generation.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Selected file is not an image.
    #[error("invalid file type: {mime_type}")]
    InvalidFileType { mime_type: String },

    /// Selected file exceeds the size ceiling.
    #[error("file too large: {size_bytes} bytes (max {max_bytes})")]
    FileTooLarge { size_bytes: u64, max_bytes: u64 },

    /// Batch would push the image count over the limit.
    #[error("too many files: {existing} held + {incoming} incoming exceeds {max}")]
    TooManyFiles {
        existing: usize,
        incoming: usize,
        max: usize,
    },

    /// Submit attempted without the required inputs.
    #[error("missing input: {0}")]
    MissingInput(MissingInput),

    /// Local file could not be read for encoding.
    #[error("failed to read local file: {0}")]
    LocalRead(#[source] std::io::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Generation was blocked by the content-safety policy.
    #[error("content blocked by safety filter: {reason}")]
    SafetyRejected { reason: String },

    /// Generation returned text instead of an image.
    #[error("model replied with text instead of an image: {text}")]
    UnexpectedTextResponse { text: String },

    /// Generation returned neither image nor text.
    #[error("empty response from generation service")]
    EmptyResponse,

    /// Operation was cancelled before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// A generation is already in flight for this workflow.
    #[error("a generation is already in progress")]
    Busy,

    /// Gateway could not be configured.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fieldless discriminant of [`EditorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Selected file is not an image.
    InvalidFileType,
    /// Selected file exceeds the size ceiling.
    FileTooLarge,
    /// Batch would exceed the image limit.
    TooManyFiles,
    /// Submit attempted without the required inputs.
    MissingInput,
    /// Local file could not be read.
    LocalRead,
    /// API returned a non-success status.
    Api,
    /// Blocked by the safety filter.
    SafetyRejected,
    /// Model replied with text only.
    UnexpectedTextResponse,
    /// Model replied with neither image nor text.
    EmptyResponse,
    /// Cancelled before completion.
    Cancelled,
    /// A generation was already in flight.
    Busy,
    /// Gateway misconfigured.
    Config,
    /// Transport failure.
    Network,
    /// Base64 payload could not be decoded.
    Decode,
    /// Local I/O failure.
    Io,
}

impl EditorError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFileType { .. } => ErrorKind::InvalidFileType,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::TooManyFiles { .. } => ErrorKind::TooManyFiles,
            Self::MissingInput(_) => ErrorKind::MissingInput,
            Self::LocalRead(_) => ErrorKind::LocalRead,
            Self::Api { .. } => ErrorKind::Api,
            Self::SafetyRejected { .. } => ErrorKind::SafetyRejected,
            Self::UnexpectedTextResponse { .. } => ErrorKind::UnexpectedTextResponse,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Busy => ErrorKind::Busy,
            Self::Config(_) => ErrorKind::Config,
            Self::Network(_) => ErrorKind::Network,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns the short message shown to the user.
    pub fn user_message(&self, locale: Locale) -> String {
        locale.error_message(self)
    }
}

/// Truncates `text` to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(EditorError::EmptyResponse.kind(), ErrorKind::EmptyResponse);
        assert_eq!(EditorError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            EditorError::MissingInput(MissingInput::EmptyPrompt).kind(),
            ErrorKind::MissingInput
        );
        assert_eq!(
            EditorError::LocalRead(std::io::Error::other("gone")).kind(),
            ErrorKind::LocalRead
        );
    }

    #[test]
    fn test_error_display() {
        let err = EditorError::Api {
            status: 429,
            message: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "API error: 429 - quota exceeded");

        let err = EditorError::MissingInput(MissingInput::TooFewImages {
            required: 2,
            provided: 1,
        });
        assert_eq!(err.to_string(), "missing input: need at least 2 images, got 1");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("", 5), "");

        let long = "x".repeat(500);
        assert_eq!(truncate_chars(&long, 200).len(), 200);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UnexpectedTextResponse).unwrap();
        assert_eq!(json, "\"unexpected_text_response\"");
    }
}
