//! Flashcard records and the `Term: Definition` response parser.
//!
//! The model is asked for one `Term: Definition` pair per line. Parsing is
//! deliberately forgiving: malformed lines are dropped, everything else is
//! kept in the order the model wrote it. Only the first colon separates the
//! term from the definition, so definitions such as `10:30` or `3:2` survive.

use serde::Serialize;

use crate::error::GenerationError;

/// A term/definition pair parsed from one response line.
///
/// Both sides are trimmed and non-empty. Fields are private so a card can
/// only come from [`Flashcard::new`] and never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Flashcard {
    term: String,
    definition: String,
}

impl Flashcard {
    /// Build a card from untrimmed parts.
    ///
    /// Returns `None` if either side is empty after trimming.
    pub fn new(term: &str, definition: &str) -> Option<Self> {
        let term = term.trim();
        let definition = definition.trim();
        if term.is_empty() || definition.is_empty() {
            return None;
        }
        Some(Self {
            term: term.to_string(),
            definition: definition.to_string(),
        })
    }

    /// Front of the card.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Back of the card.
    pub fn definition(&self) -> &str {
        &self.definition
    }
}

/// Parse a single response line.
///
/// Lines without a colon, or with nothing before the first colon, or with
/// nothing after it, yield `None`.
pub fn parse_line(line: &str) -> Option<Flashcard> {
    let (term, definition) = line.split_once(':')?;
    Flashcard::new(term, definition)
}

/// Parse a full model response into flashcards.
///
/// An empty response is reported as [`GenerationError::EmptyResponse`];
/// a non-empty response with no usable line as
/// [`GenerationError::NoValidFlashcards`].
pub fn parse_response(text: &str) -> Result<Vec<Flashcard>, GenerationError> {
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let cards: Vec<Flashcard> = text.split('\n').filter_map(parse_line).collect();

    if cards.is_empty() {
        return Err(GenerationError::NoValidFlashcards);
    }
    Ok(cards)
}
