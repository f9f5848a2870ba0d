//! Error types for the automaton.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The rule table has no entry for a neighborhood that occurred during evolution.
    #[error("Rule incomplete: no entry for neighborhood {key:?}")]
    RuleIncomplete { key: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl Error {
    pub fn rule_incomplete(key: impl Into<String>) -> Self {
        Error::RuleIncomplete { key: key.into() }
    }

    /// Whether the error stems from caller input rather than an internal failure
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::RuleIncomplete { .. } | Error::InvalidParameter(_) | Error::Validation(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
