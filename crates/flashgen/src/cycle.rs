//! One generation cycle: validate, request, parse, display.
//!
//! ```text
//! Idle ─▶ Validating ─┬─ blank topic ───────────────▶ Idle + error
//!                     └▶ Requesting ─┬─ API failure ─▶ Idle + error
//!                                    └▶ Parsing ─┬─ no cards ─▶ Idle + error
//!                                                └▶ Displaying ─▶ Idle
//! ```
//!
//! [`run_cycle`] talks to the outside world through two seams: a
//! [`ContentGenerator`] for the model call and a [`Renderer`] for the
//! presentation layer. The renderer also owns the trigger (the "generate"
//! button); the cycle claims it up front and a guard hands it back on every
//! exit path.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::GeneratedText;
use crate::card::{Flashcard, parse_response};
use crate::error::GenerationError;
use crate::prompt::{flashcard_prompt, validate_topic};

/// Boxed future returned by [`ContentGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeneratedText, String>> + Send + 'a>>;

/// A hosted model that turns a prompt into text.
///
/// Errors are plain strings carrying the service or transport message;
/// the cycle wraps them in [`GenerationError::ApiFailure`].
pub trait ContentGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a>;
}

/// Status line shown next to the deck.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Status {
    /// Nothing to report.
    #[default]
    Idle,
    /// A request to the model is in flight.
    Generating,
    /// The last cycle ended with an error.
    Failed(GenerationError),
}

impl Status {
    /// User-facing text for this status. Empty when idle.
    pub fn message(&self) -> String {
        match self {
            Status::Idle => String::new(),
            Status::Generating => "Generating flashcards...".to_string(),
            Status::Failed(e) => e.to_string(),
        }
    }

    /// The error kind, if this status is a failure.
    pub fn error_kind(&self) -> Option<&'static str> {
        match self {
            Status::Failed(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// The presentation layer as seen by the cycle.
///
/// `render` always receives the full card set to show; an empty slice
/// means "clear the deck".
pub trait Renderer: Send + Sync {
    /// Disable the trigger. Returns `false` if it was already disabled,
    /// i.e. another cycle is in flight.
    fn try_disable_trigger(&self) -> bool;

    /// Re-enable the trigger.
    fn enable_trigger(&self);

    /// Replace the displayed cards and status.
    fn render(&self, cards: &[Flashcard], status: &Status);
}

/// Re-enables the trigger when dropped.
struct TriggerGuard<'a> {
    renderer: &'a dyn Renderer,
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.renderer.enable_trigger();
    }
}

/// Generate a unique id for log correlation across one cycle.
pub fn generate_cycle_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("cy-{ts:x}-{count:04x}")
}

/// Run one generation cycle for the raw user `input`.
///
/// Returns the displayed cards on success. On failure the error has
/// already been rendered (except [`GenerationError::Busy`], which leaves the
/// in-flight cycle's display untouched) and the trigger is re-enabled.
pub async fn run_cycle(
    generator: &dyn ContentGenerator,
    renderer: &dyn Renderer,
    input: &str,
) -> Result<Vec<Flashcard>, GenerationError> {
    if !renderer.try_disable_trigger() {
        debug!("Generation requested while another cycle is in flight");
        return Err(GenerationError::Busy);
    }
    let _trigger = TriggerGuard { renderer };

    let cycle_id = generate_cycle_id();
    let result = generate_cards(generator, renderer, input, &cycle_id).await;

    match &result {
        Ok(cards) => {
            info!("[{cycle_id}] Displaying {} flashcard(s)", cards.len());
            renderer.render(cards, &Status::Idle);
        }
        Err(e) => {
            warn!("[{cycle_id}] Cycle failed ({}): {e}", e.kind());
            renderer.render(&[], &Status::Failed(e.clone()));
        }
    }
    result
}

async fn generate_cards(
    generator: &dyn ContentGenerator,
    renderer: &dyn Renderer,
    input: &str,
    cycle_id: &str,
) -> Result<Vec<Flashcard>, GenerationError> {
    let topic = validate_topic(input)?;

    renderer.render(&[], &Status::Generating);
    info!("[{cycle_id}] Requesting flashcards for topic ({} chars)", topic.len());

    let prompt = flashcard_prompt(topic);
    let generated = generator
        .generate(&prompt)
        .await
        .map_err(GenerationError::api_failure)?;

    debug!(
        "[{cycle_id}] Model returned {} chars (finish_reason={})",
        generated.text.len(),
        generated.finish_reason.as_deref().unwrap_or("none")
    );

    parse_response(&generated.text)
}
