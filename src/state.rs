//! The wall's state container.
//!
//! [`WallState`] holds everything the presentation layer reads: the ordered
//! feedback store, the `loading`/`error` pair owned by the fetch cycle, and the
//! `submitting`/`success` pair plus the draft owned by the submission cycle.
//! All changes go through the methods below; the store itself is only ever
//! replaced wholesale or extended at the front.
//!
//! # Overlapping cycles
//!
//! Every fetch takes a [`FetchTicket`]. Only the most recently issued fetch may
//! apply its result or clear `loading`; older ones are discarded when they
//! land. Entries confirmed by a submission while a fetch is outstanding are
//! remembered and merged back (by `id`) into whatever that fetch returns.

use thiserror::Error;

use crate::client::ClientError;
use crate::models::{CreateFeedbackInput, FeedbackEntry};
use crate::validation::{validate, FeedbackDraft, FieldErrors};

/// Which view the presentation layer should show, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Loading,
    Error,
    Empty,
    Populated,
}

impl Presentation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Error => "error",
            Self::Empty => "empty",
            Self::Populated => "populated",
        }
    }
}

/// Why a submission did not produce an entry.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(FieldErrors),

    #[error("A submission is already in progress")]
    InFlight,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Identifies one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Identifies one opening of the success window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallState {
    entries: Vec<FeedbackEntry>,
    loading: bool,
    error: Option<String>,
    submitting: bool,
    success: bool,
    draft: FeedbackDraft,
    field_errors: FieldErrors,
    fetch_generation: u64,
    success_generation: u64,
    confirmed_during_fetch: Vec<FeedbackEntry>,
}

impl Default for WallState {
    fn default() -> Self {
        Self::new()
    }
}

impl WallState {
    /// A fresh wall: empty store, waiting on its first fetch.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            loading: true,
            error: None,
            submitting: false,
            success: false,
            draft: FeedbackDraft::default(),
            field_errors: FieldErrors::default(),
            fetch_generation: 0,
            success_generation: 0,
            confirmed_during_fetch: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn draft(&self) -> &FeedbackDraft {
        &self.draft
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Derived purely from `(loading, error, entries.len())`.
    pub fn presentation(&self) -> Presentation {
        if self.loading {
            Presentation::Loading
        } else if self.error.is_some() {
            Presentation::Error
        } else if self.entries.is_empty() {
            Presentation::Empty
        } else {
            Presentation::Populated
        }
    }

    // ============================================================
    // Fetch cycle
    // ============================================================

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_generation += 1;
        self.loading = true;
        self.error = None;
        FetchTicket(self.fetch_generation)
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.fetch_generation
    }

    /// Replace the store with a fetched list. Returns `false` if the ticket was superseded.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, fetched: Vec<FeedbackEntry>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        let mut entries = fetched;
        for confirmed in std::mem::take(&mut self.confirmed_during_fetch) {
            if !entries.iter().any(|e| e.id == confirmed.id) {
                entries.insert(0, confirmed);
            }
        }

        self.entries = entries;
        self.loading = false;
        true
    }

    /// Record a failed fetch. The store is left as it was.
    pub fn fail_fetch(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.confirmed_during_fetch.clear();
        self.error = Some(message.into());
        self.loading = false;
        true
    }

    /// The fetch was dropped before it finished.
    pub fn abandon_fetch(&mut self, ticket: FetchTicket) {
        if self.is_current(ticket) {
            self.confirmed_during_fetch.clear();
            self.loading = false;
        }
    }

    // ============================================================
    // Submission cycle
    // ============================================================

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.draft.message = message.into();
    }

    /// Validate the draft and mark a submission as in flight.
    ///
    /// Fails without side effects other than recording field errors.
    pub fn begin_submit(&mut self) -> Result<CreateFeedbackInput, SubmitError> {
        if self.submitting {
            return Err(SubmitError::InFlight);
        }

        match validate(&self.draft) {
            Ok(input) => {
                self.field_errors = FieldErrors::default();
                self.submitting = true;
                self.success = false;
                Ok(input)
            }
            Err(errors) => {
                self.field_errors = errors.clone();
                Err(SubmitError::Validation(errors))
            }
        }
    }

    /// Fold the backend's canonical entry into the store and open the success window.
    ///
    /// An `id` already in the store is not inserted a second time.
    pub fn complete_submit(&mut self, entry: FeedbackEntry) -> SuccessTicket {
        if self.loading {
            self.confirmed_during_fetch.push(entry.clone());
        }
        if !self.entries.iter().any(|e| e.id == entry.id) {
            self.entries.insert(0, entry);
        }

        self.draft = FeedbackDraft::default();
        self.field_errors = FieldErrors::default();
        self.submitting = false;
        self.success = true;
        self.success_generation += 1;
        SuccessTicket(self.success_generation)
    }

    /// The post failed; the draft is kept for another attempt.
    pub fn fail_submit(&mut self) {
        self.submitting = false;
    }

    /// Close the success window, unless a later success reopened it.
    pub fn clear_success(&mut self, ticket: SuccessTicket) -> bool {
        if ticket.0 != self.success_generation || !self.success {
            return false;
        }
        self.success = false;
        true
    }
}
