//! Form checks run before a submission touches the network.

use std::fmt;

use crate::models::CreateFeedbackInput;

pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// What the user has typed into the form so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub name: String,
    pub message: String,
}

impl FeedbackDraft {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.message.is_empty()
    }
}

/// Per-field validation messages. A `None` field passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub message: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.message.is_none()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [self.name.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Lengths are counted in characters, not bytes.
fn check_field(value: &str, label: &str, max: usize) -> Option<String> {
    let len = value.chars().count();
    if len == 0 {
        Some(format!("{} is required", label))
    } else if len > max {
        Some(format!("{} must be less than {} characters", label, max))
    } else {
        None
    }
}

/// Validate a draft, producing the request body if every field passes.
pub fn validate(draft: &FeedbackDraft) -> Result<CreateFeedbackInput, FieldErrors> {
    let errors = FieldErrors {
        name: check_field(&draft.name, "Name", NAME_MAX_CHARS),
        message: check_field(&draft.message, "Message", MESSAGE_MAX_CHARS),
    };

    if errors.is_empty() {
        Ok(CreateFeedbackInput {
            name: draft.name.clone(),
            message: draft.message.clone(),
        })
    } else {
        Err(errors)
    }
}
