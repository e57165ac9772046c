//! Workflow state machine types.

use crate::error::{EditorError, ErrorKind};
use crate::image::GeneratedImage;
use crate::locale::Locale;
use serde::Serialize;

/// A failed generation as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Classified kind of the failure.
    pub kind: ErrorKind,
    /// Localized message.
    pub message: String,
}

impl Failure {
    /// Renders `err` in `locale`.
    pub fn from_error(err: &EditorError, locale: Locale) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(locale),
        }
    }
}

/// Where a workflow is in its submit cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkflowState {
    /// Waiting for input or a submit.
    #[default]
    Idle,
    /// Submit received; input checks running.
    Validating,
    /// One generation call outstanding.
    InFlight,
    /// Last generation produced an image.
    Completed(GeneratedImage),
    /// Last generation failed or was cancelled.
    Failed(Failure),
}

impl WorkflowState {
    /// Short name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::InFlight => "in_flight",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }

    /// True while a generation call is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// True if the trigger should be enabled.
    pub fn can_submit(&self) -> bool {
        !matches!(self, Self::Validating | Self::InFlight)
    }

    /// The generated image, when completed.
    pub fn result(&self) -> Option<&GeneratedImage> {
        match self {
            Self::Completed(image) => Some(image),
            _ => None,
        }
    }

    /// The failure, when failed.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GenerationMetadata;

    #[test]
    fn test_can_submit() {
        assert!(WorkflowState::Idle.can_submit());
        assert!(!WorkflowState::Validating.can_submit());
        assert!(!WorkflowState::InFlight.can_submit());
        let failed = WorkflowState::Failed(Failure::from_error(
            &EditorError::EmptyResponse,
            Locale::English,
        ));
        assert!(failed.can_submit());
    }

    #[test]
    fn test_accessors() {
        let image = GeneratedImage::new("image/png", "AAAA", GenerationMetadata::default());
        let done = WorkflowState::Completed(image.clone());
        assert_eq!(done.result(), Some(&image));
        assert!(done.failure().is_none());
        assert_eq!(done.to_string(), "completed");

        let failed = WorkflowState::Failed(Failure::from_error(
            &EditorError::Cancelled,
            Locale::Indonesian,
        ));
        let failure = failed.failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::Cancelled);
        assert_eq!(failure.message, "Permintaan dibatalkan.");
    }
}
