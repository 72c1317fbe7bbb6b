//! Flashcard generator web server.
//!
//! Serves a single page where the user enters a topic (or a list of
//! `Term: Definition` pairs), asks Gemini for flashcards, and flips through
//! the result.
//!
//! # Usage
//!
//! ```bash
//! API_KEY=... cargo run -p flashgen-web
//! API_KEY=... cargo run -p flashgen-web -- --model gemini-2.5-flash --port 8080
//! RUST_LOG=flashgen=debug API_KEY=... cargo run -p flashgen-web
//! ```
//!
//! Then open the printed URL in a browser.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use flashgen::prelude::*;
use flashgen::{API_KEY_ENV, DEFAULT_MODEL};
use flashgen_web::{WebConfig, spawn_web};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Flashcard generator with a browser-based UI.
#[derive(Parser)]
#[command(about = "Generate flippable flashcards for any topic with Gemini")]
struct Args {
    /// Gemini model to use.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Port for the web UI server.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Sampling temperature.
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tokens in the model response.
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// Seconds before a model request is abandoned.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Serve this directory instead of the bundled page.
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. Model client. A missing key surfaces as an error on each request.
    let mut config = GeneratorConfig::default()
        .with_model(&args.model)
        .with_request_timeout(Duration::from_secs(args.timeout_secs));
    if let Some(t) = args.temperature {
        config = config.with_temperature(t);
    }
    if let Some(max) = args.max_output_tokens {
        config = config.with_max_output_tokens(max);
    }
    let client = GeminiClient::from_env(config)?;
    if !client.has_api_key() {
        warn!("{API_KEY_ENV} is not set; generation requests will fail until it is");
    }

    // 2. Shared deck state.
    let deck_state = Arc::new(Mutex::new(DeckState::with_model(client.model())));

    // 3. Web server.
    let web_config = WebConfig {
        bind_addr: ([127, 0, 0, 1], args.port).into(),
        static_dir: args.static_dir,
        ..Default::default()
    };
    let addr = spawn_web(deck_state, Arc::new(client), web_config)
        .await
        .map_err(|e| format!("failed to start web server: {e}"))?;
    info!("Serving on http://{addr} (model {})", args.model);
    println!("Flashcard generator: http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {e}"))?;
    info!("Shutting down");
    Ok(())
}
