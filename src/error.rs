use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when the backend rejects a booking because the slot is taken.
pub const CONFLICT_MESSAGE: &str = "This slot is already booked. Please choose a different time.";

/// Fallback shown for transport failures and empty backend error bodies.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(ValidationReport),

    #[error("Payload validation error: {0}")]
    Payload(#[from] validator::ValidationErrors),

    #[error("{}", CONFLICT_MESSAGE)]
    SlotConflict { server_message: String },

    #[error("Scheduling API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Text a host UI can show to the interviewee without leaking internals.
    /// Transport failures collapse to a generic message; validation errors
    /// keep the full list so every missing field can be surfaced at once.
    pub fn display_message(&self) -> String {
        match self {
            Error::Validation(report) => report.messages().join("\n"),
            Error::Payload(errs) => flatten_validator_errors(errs).join("\n"),
            Error::SlotConflict { .. } => CONFLICT_MESSAGE.to_string(),
            Error::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            Error::Api { .. } => GENERIC_SERVER_ERROR.to_string(),
            Error::Reqwest(_) => GENERIC_SERVER_ERROR.to_string(),
            Error::BadRequest(msg) | Error::Config(msg) | Error::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Accumulates every problem found in a booking draft so the host can show
/// the complete list in one pass instead of stopping at the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    messages: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages.join("; "))
    }
}

impl From<validator::ValidationErrors> for ValidationReport {
    fn from(errs: validator::ValidationErrors) -> Self {
        Self {
            messages: flatten_validator_errors(&errs),
        }
    }
}

fn flatten_validator_errors(errs: &validator::ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, errors) in errs.field_errors() {
        for err in errors {
            match &err.message {
                Some(msg) => messages.push(msg.to_string()),
                None => messages.push(format!("{} is invalid", field)),
            }
        }
    }
    messages.sort();
    messages
}
