//! Serializable projection of [`DeckState`] for WebSocket and REST transport.
//!
//! [`Status`](flashgen::Status) carries a typed error; the snapshot flattens
//! it into the user-facing message plus a machine-readable `error` kind so
//! the page can render it without knowing the error taxonomy.

use flashgen::Flashcard;
use flashgen::ui::DeckState;
use serde::Serialize;

/// Serializable view of [`DeckState`].
#[derive(Clone, Debug, Serialize)]
pub struct DeckSnapshot {
    /// Status line to show above the deck. Empty when idle.
    pub status: String,
    /// Error kind of the last cycle, or `null`.
    pub error: Option<&'static str>,
    /// `true` while the generate button must stay disabled.
    pub generating: bool,
    pub cards: Vec<Flashcard>,
    pub cycle: u32,
    pub model: String,
}

impl DeckSnapshot {
    /// Build a snapshot. Should be called while holding the state lock.
    pub fn from_deck_state(state: &DeckState) -> Self {
        Self {
            status: state.status.message(),
            error: state.status.error_kind(),
            generating: state.generating,
            cards: state.cards.clone(),
            cycle: state.cycle,
            model: state.model.clone(),
        }
    }
}
