//! REST API endpoint handlers.
//!
//! `POST /api/generate` runs a full cycle and answers with the resulting
//! snapshot, so a client without a WebSocket still gets the outcome. The
//! cycle runs on its own task: a client that hangs up mid-request does not
//! cut it short.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use flashgen::ui::{DeckState, lock_state};
use flashgen::{ContentGenerator, GenerationError, run_cycle};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, error};

use crate::broadcast::{WebRenderer, WsMessage};
use crate::snapshot::DeckSnapshot;

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub deck_state: Arc<Mutex<DeckState>>,
    pub generator: Arc<dyn ContentGenerator>,
    pub broadcast_tx: broadcast::Sender<WsMessage>,
}

impl AppState {
    /// A renderer bound to this app's state and broadcast channel.
    pub fn renderer(&self) -> WebRenderer {
        WebRenderer::new(self.deck_state.clone(), self.broadcast_tx.clone())
    }

    /// Snapshot of the deck as it is right now.
    pub fn snapshot(&self) -> DeckSnapshot {
        let state = lock_state(&self.deck_state);
        DeckSnapshot::from_deck_state(&state)
    }
}

/// GET /api/state: Full deck snapshot.
pub async fn get_state(State(app): State<AppState>) -> Json<DeckSnapshot> {
    Json(app.snapshot())
}

/// Request body for POST /api/generate.
#[derive(Deserialize)]
pub struct GenerateRequest {
    /// Raw user input. A missing field is treated as blank.
    #[serde(default)]
    pub topic: String,
}

/// POST /api/generate: Run one generation cycle.
///
/// Returns 200 with the deck as the cycle left it, whether it displayed
/// cards or an error. Returns 409 with the current deck if a cycle is
/// already in flight.
pub async fn post_generate(
    State(app): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> (StatusCode, Json<DeckSnapshot>) {
    let cycle_app = app.clone();
    let cycle = tokio::spawn(async move {
        let renderer = cycle_app.renderer();
        let outcome = run_cycle(cycle_app.generator.as_ref(), &renderer, &body.topic).await;
        (outcome, renderer.final_frame())
    });

    let (outcome, frame) = match cycle.await {
        Ok(done) => done,
        Err(e) => {
            error!("Generation task failed: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(app.snapshot()));
        }
    };

    let code = match outcome {
        Err(GenerationError::Busy) => StatusCode::CONFLICT,
        Ok(cards) => {
            debug!("POST /api/generate displayed {} card(s)", cards.len());
            StatusCode::OK
        }
        Err(_) => StatusCode::OK,
    };
    let snapshot = frame.unwrap_or_else(|| app.snapshot());
    (code, Json(snapshot))
}
