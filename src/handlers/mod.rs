//! Screen handlers
//!
//! Each screen reads through the services, renders plain text and hands
//! side effects to a [`crate::state::Host`]:
//! - Event screens: list, detail, create, edit, delete
//! - Participant screens: list, create, edit, delete
//! - The console host used by the binary

pub mod console;
pub mod events;
pub mod participants;

pub use console::ConsoleHost;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::state::schema::ValidationErrors;
use crate::state::{QueryResult, Route};

/// The view state of one mounted screen
///
/// Async work started by a screen may finish after the screen is gone;
/// once unmounted, [`ScreenSlot::apply`] drops whatever arrives.
pub struct ScreenSlot<V> {
    mounted: Arc<AtomicBool>,
    current: Arc<Mutex<Option<V>>>,
}

impl<V> Clone for ScreenSlot<V> {
    fn clone(&self) -> Self {
        Self {
            mounted: Arc::clone(&self.mounted),
            current: Arc::clone(&self.current),
        }
    }
}

impl<V> Default for ScreenSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ScreenSlot<V> {
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Replace the view; returns false and discards `view` after unmount
    pub fn apply(&self, view: V) -> bool {
        if !self.is_mounted() {
            debug!("Screen unmounted, discarding result");
            return false;
        }
        *self.current.lock() = Some(view);
        true
    }

    pub fn take(&self) -> Option<V> {
        self.current.lock().take()
    }
}

impl<V: Clone> ScreenSlot<V> {
    pub fn current(&self) -> Option<V> {
        self.current.lock().clone()
    }
}

/// Await `load` and apply its view to `slot` if the screen is still mounted
pub async fn render_into<V, Fut>(slot: &ScreenSlot<V>, load: Fut) -> bool
where
    Fut: Future<Output = V>,
{
    let view = load.await;
    slot.apply(view)
}

/// Render a tri-state read
///
/// `Loading` and generic errors keep the user on the screen; a missing
/// entity becomes a terminal view that points back to `back`.
pub fn render_query<T>(result: &QueryResult<T>, back: Route, render: impl FnOnce(&T) -> String) -> String {
    if result.is_not_found() {
        if let Some(error) = result.error() {
            return format!("{}.\nBack to {}", capitalize(&error.reason()), back);
        }
    }

    match (result.data(), result.error()) {
        (Some(data), None) => render(data),
        (Some(data), Some(error)) => format!("{}\n(showing cached data: {})", render(data), error),
        (None, Some(error)) => format!("Error: {}", error),
        (None, None) => "Loading...".to_string(),
    }
}

/// Per-field messages, one per line
pub fn render_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {}: {}", field, message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
