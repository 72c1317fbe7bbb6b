//! [`Renderer`] that also pushes every frame to WebSocket clients.
//!
//! [`WebRenderer`] writes through to the shared [`DeckState`] like
//! [`StateRenderer`] and then broadcasts the result as a [`WsMessage`] via a
//! `tokio::sync::broadcast` channel.

use std::sync::{Arc, Mutex};

use flashgen::ui::{DeckState, StateRenderer, lock_state};
use flashgen::{Flashcard, Renderer, Status};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::snapshot::DeckSnapshot;

/// A message sent from the server to WebSocket clients.
///
/// Discriminated on the `type` field when serialized to JSON.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Full deck snapshot (sent on connect and after every render).
    Snapshot { data: DeckSnapshot },
    /// The generate button was disabled or re-enabled.
    Trigger { generating: bool },
}

/// Renderer used by every web-triggered cycle.
pub struct WebRenderer {
    inner: StateRenderer,
    sender: broadcast::Sender<WsMessage>,
    /// State as of the moment this renderer released the trigger.
    released: Mutex<Option<DeckSnapshot>>,
}

impl WebRenderer {
    pub fn new(state: Arc<Mutex<DeckState>>, sender: broadcast::Sender<WsMessage>) -> Self {
        Self {
            inner: StateRenderer::new(state),
            sender,
            released: Mutex::new(None),
        }
    }

    /// Broadcast a message to all connected clients.
    ///
    /// Silently ignores send errors (no subscribers is fine).
    fn broadcast(&self, msg: WsMessage) {
        let _ = self.sender.send(msg);
    }

    /// Current snapshot of the underlying state.
    pub fn snapshot(&self) -> DeckSnapshot {
        let state = lock_state(self.inner.state());
        DeckSnapshot::from_deck_state(&state)
    }

    /// The deck as this renderer's cycle left it.
    ///
    /// Captured under the same lock that releases the trigger, so a cycle
    /// started afterwards cannot leak into it. `None` until the trigger has
    /// been released, and for a cycle that never claimed it.
    pub fn final_frame(&self) -> Option<DeckSnapshot> {
        self.released
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Renderer for WebRenderer {
    fn try_disable_trigger(&self) -> bool {
        let claimed = self.inner.try_disable_trigger();
        if claimed {
            self.broadcast(WsMessage::Trigger { generating: true });
        }
        claimed
    }

    fn enable_trigger(&self) {
        let frame = {
            let mut state = lock_state(self.inner.state());
            state.generating = false;
            DeckSnapshot::from_deck_state(&state)
        };
        *self.released.lock().unwrap_or_else(|e| e.into_inner()) = Some(frame);
        self.broadcast(WsMessage::Trigger { generating: false });
    }

    fn render(&self, cards: &[Flashcard], status: &Status) {
        self.inner.render(cards, status);
        self.broadcast(WsMessage::Snapshot {
            data: self.snapshot(),
        });
    }
}
