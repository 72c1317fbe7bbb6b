//! Browser-based flashcard generator powered by flashgen.
//!
//! `flashgen-web` provides an axum web server that owns the generation
//! cycle and pushes the resulting deck to a single bundled page. The page
//! renders each card as a two-sided flippable unit.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::{Arc, Mutex};
//! use flashgen::prelude::*;
//! use flashgen_web::{WebConfig, spawn_web};
//!
//! let client = GeminiClient::from_env(GeneratorConfig::default())?;
//! let deck_state = Arc::new(Mutex::new(DeckState::with_model(client.model())));
//!
//! let addr = spawn_web(deck_state, Arc::new(client), WebConfig::default()).await?;
//! println!("Flashcards: http://{addr}");
//! ```
//!
//! # Architecture
//!
//! ```text
//! browser ──POST /api/generate, ws "generate"──▶ run_cycle ──▶ ContentGenerator
//!    ▲                                              │
//!    └──── WsMessage ◀── WebRenderer ◀──render()────┘
//!                           │
//!                           └──▶ Arc<Mutex<DeckState>> ◀── GET /api/state
//! ```

mod api;
pub mod broadcast;
mod server;
pub mod snapshot;
mod ws;

pub use broadcast::{WebRenderer, WsMessage};
pub use snapshot::DeckSnapshot;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use flashgen::ContentGenerator;
use flashgen::ui::DeckState;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Directory to serve instead of the bundled page.
    ///
    /// If `None`, the bundled `index.html` is served at `/`.
    pub static_dir: Option<PathBuf>,
    /// WebSocket broadcast channel capacity. Default: 64.
    ///
    /// Clients that fall behind by this many messages receive a fresh
    /// snapshot to resynchronize.
    pub broadcast_capacity: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            static_dir: None,
            broadcast_capacity: 64,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
///
/// # Arguments
///
/// * `deck_state`: Shared deck state; also readable by the caller.
/// * `generator`: Model client used by every cycle.
/// * `config`: Server configuration.
pub async fn spawn_web(
    deck_state: Arc<Mutex<DeckState>>,
    generator: Arc<dyn ContentGenerator>,
    config: WebConfig,
) -> std::io::Result<SocketAddr> {
    let (broadcast_tx, _) = tokio::sync::broadcast::channel(config.broadcast_capacity.max(1));
    let app_state = api::AppState {
        deck_state,
        generator,
        broadcast_tx,
    };
    let router = server::build_router(app_state, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
