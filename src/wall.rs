//! Fetch and submission cycles.
//!
//! [`FeedbackWall`] owns the [`WallState`] and the [`FeedbackClient`], runs
//! both cycles against the backend, and announces each state transition as a
//! [`WallEvent`] for anything that wants to react (the terminal front end uses
//! them for its notices). Cycles never wait on subscribers.
//!
//! State is only locked for short, synchronous sections; no lock is held across
//! a network call.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::client::{ClientError, FeedbackClient};
use crate::models::FeedbackEntry;
use crate::state::{FetchTicket, SuccessTicket, WallState};

pub use crate::state::SubmitError;

/// How long the "Sent!" indicator stays up after a successful post.
pub const SUCCESS_WINDOW: Duration = Duration::from_secs(2);

/// Shown to the user when a post fails for any reason other than validation.
pub const SUBMIT_FAILURE_NOTICE: &str = "Failed to submit feedback. Please try again.";

const EVENT_CAPACITY: usize = 64;

/// State transitions published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WallEvent {
    FetchStarted,
    Loaded { count: usize },
    FetchFailed { message: String },
    SubmitStarted,
    EntryInserted { entry: FeedbackEntry },
    SubmitFailed { message: String },
    SuccessCleared,
}

/// Text stored in the wall's `error` when a fetch fails.
pub fn fetch_error_message(err: &ClientError) -> String {
    match err {
        ClientError::Unreachable(_) | ClientError::Application(_) => err.to_string(),
        _ => format!("Failed to fetch feedback: {}", err),
    }
}

type SharedState = Arc<Mutex<WallState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, WallState> {
    state.lock().expect("wall state lock poisoned")
}

/// Clears `loading` if the fetch future is dropped before it resolves.
struct FetchGuard {
    state: SharedState,
    ticket: FetchTicket,
    armed: bool,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("fetch abandoned before completion");
            lock(&self.state).abandon_fetch(self.ticket);
        }
    }
}

/// Clears `submitting` if the submit future is dropped before it resolves.
struct SubmitGuard {
    state: SharedState,
    armed: bool,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("submission abandoned before completion");
            lock(&self.state).fail_submit();
        }
    }
}

/// The client side of one feedback wall.
#[derive(Clone)]
pub struct FeedbackWall {
    client: FeedbackClient,
    state: SharedState,
    events: broadcast::Sender<WallEvent>,
    success_window: Duration,
}

impl FeedbackWall {
    pub fn new(client: FeedbackClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            state: Arc::new(Mutex::new(WallState::new())),
            events,
            success_window: SUCCESS_WINDOW,
        }
    }

    /// Override how long the success indicator stays up.
    pub fn with_success_window(mut self, window: Duration) -> Self {
        self.success_window = window;
        self
    }

    pub fn client(&self) -> &FeedbackClient {
        &self.client
    }

    /// A copy of the current state, for rendering.
    pub fn snapshot(&self) -> WallState {
        lock(&self.state).clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WallEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: WallEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn set_name(&self, name: impl Into<String>) {
        lock(&self.state).set_name(name);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        lock(&self.state).set_message(message);
    }

    // ============================================================
    // Fetch cycle
    // ============================================================

    /// Load the whole wall, replacing the store on success.
    ///
    /// The outcome is recorded in the state either way; the returned error is
    /// for callers that want to act on it directly. A result that lands after a
    /// newer fetch was issued leaves the state untouched.
    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = lock(&self.state).begin_fetch();
        let mut guard = FetchGuard {
            state: self.state.clone(),
            ticket,
            armed: true,
        };
        self.emit(WallEvent::FetchStarted);

        let result = self.client.list_feedback().await;
        guard.armed = false;

        match result {
            Ok(entries) => {
                let count = entries.len();
                let applied = lock(&self.state).complete_fetch(ticket, entries);
                if applied {
                    tracing::info!(count, "feedback loaded");
                    self.emit(WallEvent::Loaded { count });
                } else {
                    tracing::debug!("discarding superseded fetch result");
                }
                Ok(())
            }
            Err(err) => {
                let message = fetch_error_message(&err);
                let applied = lock(&self.state).fail_fetch(ticket, message.clone());
                if applied {
                    tracing::warn!(error = %err, "failed to load feedback");
                    self.emit(WallEvent::FetchFailed { message });
                }
                Err(err)
            }
        }
    }

    /// User-triggered reload. Same as [`load`](Self::load).
    pub async fn retry(&self) -> Result<(), ClientError> {
        self.load().await
    }

    // ============================================================
    // Submission cycle
    // ============================================================

    /// Validate the draft, post it, and prepend the confirmed entry.
    ///
    /// On failure the store and the draft are left untouched.
    pub async fn submit(&self) -> Result<FeedbackEntry, SubmitError> {
        let input = lock(&self.state).begin_submit()?;
        let mut guard = SubmitGuard {
            state: self.state.clone(),
            armed: true,
        };
        self.emit(WallEvent::SubmitStarted);

        let result = self.client.create_feedback(&input).await;
        guard.armed = false;

        match result {
            Ok(entry) => {
                let ticket = lock(&self.state).complete_submit(entry.clone());
                tracing::info!(id = entry.id, "feedback submitted");
                self.emit(WallEvent::EntryInserted {
                    entry: entry.clone(),
                });
                spawn_success_reset(
                    self.state.clone(),
                    self.events.clone(),
                    ticket,
                    self.success_window,
                );
                Ok(entry)
            }
            Err(err) => {
                lock(&self.state).fail_submit();
                tracing::warn!(error = %err, "failed to submit feedback");
                self.emit(WallEvent::SubmitFailed {
                    message: err.to_string(),
                });
                Err(SubmitError::Client(err))
            }
        }
    }
}

/// Close the success window once `window` has elapsed.
fn spawn_success_reset(
    state: SharedState,
    events: broadcast::Sender<WallEvent>,
    ticket: SuccessTicket,
    window: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(window).await;
        let cleared = lock(&state).clear_success(ticket);
        if cleared {
            let _ = events.send(WallEvent::SuccessCleared);
        }
    })
}
