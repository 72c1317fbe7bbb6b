//! Shared deck state and the renderer that writes into it.
//!
//! ```text
//! run_cycle ──render()──▶ StateRenderer ──writes──▶ Arc<Mutex<DeckState>> ◀──reads── frontend
//! ```
//!
//! The state holds the only mutable values of the tool: the current cards,
//! the current status, and whether the trigger is disabled. A frontend
//! (web, terminal, tests) reads it to draw.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::card::Flashcard;
use crate::cycle::{Renderer, Status};

/// Core state shared between the generation cycle and a frontend.
#[derive(Debug, Default)]
pub struct DeckState {
    /// Cards currently on display, in response order.
    pub cards: Vec<Flashcard>,
    /// Current status line.
    pub status: Status,
    /// `true` while a cycle holds the trigger.
    pub generating: bool,
    /// Number of cycles that claimed the trigger so far.
    pub cycle: u32,
    /// Model used for generation, for display.
    pub model: String,
}

impl DeckState {
    /// Create a state labelled with the model in use.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

// ── Convenience Updaters ──────────────────────────────────────────────

/// Lock the shared state, recovering from a poisoned mutex.
pub fn lock_state(state: &Arc<Mutex<DeckState>>) -> MutexGuard<'_, DeckState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Lock the shared state mutex and run a block on the guard.
macro_rules! with_state {
    ($state:expr, |$s:ident| $body:block) => {{
        let mut $s = lock_state($state);
        $body
    }};
}

/// Atomically claim the trigger. Returns `false` if already claimed.
pub fn claim_trigger(state: &Arc<Mutex<DeckState>>) -> bool {
    with_state!(state, |s| {
        if s.generating {
            return false;
        }
        s.generating = true;
        s.cycle += 1;
        true
    })
}

/// Release the trigger.
pub fn release_trigger(state: &Arc<Mutex<DeckState>>) {
    with_state!(state, |s| { s.generating = false });
}

/// Replace the displayed cards and status in one step.
pub fn show(state: &Arc<Mutex<DeckState>>, cards: &[Flashcard], status: &Status) {
    with_state!(state, |s| {
        s.cards = cards.to_vec();
        s.status = status.clone();
    });
}

// ── Renderer ──────────────────────────────────────────────────────────

/// [`Renderer`] that writes every frame into a shared [`DeckState`].
#[derive(Clone)]
pub struct StateRenderer {
    state: Arc<Mutex<DeckState>>,
}

impl StateRenderer {
    pub fn new(state: Arc<Mutex<DeckState>>) -> Self {
        Self { state }
    }

    /// The state this renderer writes to.
    pub fn state(&self) -> &Arc<Mutex<DeckState>> {
        &self.state
    }
}

impl Renderer for StateRenderer {
    fn try_disable_trigger(&self) -> bool {
        claim_trigger(&self.state)
    }

    fn enable_trigger(&self) {
        release_trigger(&self.state);
    }

    fn render(&self, cards: &[Flashcard], status: &Status) {
        show(&self.state, cards, status);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
