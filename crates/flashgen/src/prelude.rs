//! Convenience re-exports for common flashgen types.
//!
//! ```ignore
//! use flashgen::prelude::*;
//! ```

pub use crate::card::{Flashcard, parse_line, parse_response};
pub use crate::config::GeneratorConfig;
pub use crate::cycle::{ContentGenerator, GenerateFuture, Renderer, Status, run_cycle};
pub use crate::error::GenerationError;
pub use crate::prompt::{flashcard_prompt, validate_topic};
pub use crate::ui::{DeckState, StateRenderer, lock_state};
pub use crate::{GeminiClient, GeneratedText};
