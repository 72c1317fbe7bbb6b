//! Terminal outcomes of a generation cycle.
//!
//! Every variant ends the current cycle. The cycle runner recovers all of
//! them at the top level and shows the [`Display`](std::fmt::Display) text
//! to the user; none propagate further.

use std::fmt;

/// Fallback text when the model client fails without a message.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// Why a generation cycle ended without displaying flashcards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationError {
    /// The topic was blank after trimming. The model was not called.
    EmptyInput,
    /// The model call failed. Carries the service or transport message.
    ApiFailure(String),
    /// The call succeeded but returned no text.
    EmptyResponse,
    /// Text came back but no line parsed as `Term: Definition`.
    NoValidFlashcards,
    /// Another cycle already holds the trigger.
    Busy,
}

impl GenerationError {
    /// Build an [`ApiFailure`](Self::ApiFailure), substituting
    /// [`UNKNOWN_ERROR`] for a blank message.
    pub fn api_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::ApiFailure(UNKNOWN_ERROR.to_string())
        } else {
            Self::ApiFailure(message)
        }
    }

    /// Stable machine-readable identifier, used in JSON snapshots.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::ApiFailure(_) => "api_failure",
            Self::EmptyResponse => "empty_response",
            Self::NoValidFlashcards => "no_valid_flashcards",
            Self::Busy => "busy",
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "Please enter a topic or some terms and definitions."),
            Self::ApiFailure(message) => write!(f, "An error occurred: {message}"),
            Self::EmptyResponse => write!(
                f,
                "Failed to generate flashcards or received an empty response. Please try again."
            ),
            Self::NoValidFlashcards => write!(
                f,
                "No valid flashcards could be generated from the response. Please check the format."
            ),
            Self::Busy => write!(f, "Flashcards are already being generated."),
        }
    }
}

impl std::error::Error for GenerationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_message_is_fixed() {
        assert_eq!(
            GenerationError::EmptyInput.to_string(),
            "Please enter a topic or some terms and definitions."
        );
    }

    #[test]
    fn api_failure_wraps_message() {
        let err = GenerationError::api_failure("API key not valid");
        assert_eq!(err.to_string(), "An error occurred: API key not valid");
    }

    #[test]
    fn blank_api_failure_falls_back() {
        let err = GenerationError::api_failure("  ");
        assert_eq!(
            err,
            GenerationError::ApiFailure(UNKNOWN_ERROR.to_string())
        );
        assert_eq!(err.to_string(), "An error occurred: An unknown error occurred");
    }

    #[test]
    fn empty_response_and_no_cards_are_distinct() {
        assert_ne!(
            GenerationError::EmptyResponse.to_string(),
            GenerationError::NoValidFlashcards.to_string()
        );
        assert_ne!(
            GenerationError::EmptyResponse.kind(),
            GenerationError::NoValidFlashcards.kind()
        );
    }

    #[test]
    fn kinds_are_snake_case() {
        assert_eq!(GenerationError::EmptyInput.kind(), "empty_input");
        assert_eq!(GenerationError::api_failure("x").kind(), "api_failure");
        assert_eq!(GenerationError::Busy.kind(), "busy");
    }
}
