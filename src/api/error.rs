//! Error types for the library API.

use llm::error::LLMError;
use std::fmt;
use thiserror::Error;

/// Errors raised while building the agent configuration or loading settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No API key was supplied. Nothing can be sent without one.
    #[error("API key is not set")]
    MissingCredential,

    /// No model identifier was supplied.
    #[error("Model is not set")]
    MissingModel,

    /// The settings file could not be read or contains invalid values.
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Errors raised while collecting user input, before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The requested number of answer options is below the minimum.
    #[error("Number of answers must be at least {minimum} (got {requested})")]
    CountBelowMinimum { requested: u32, minimum: u32 },

    /// The number of answer options is not a number.
    #[error("Invalid number of answers: '{0}'")]
    InvalidCount(String),

    /// The question is empty.
    #[error("Question cannot be empty")]
    EmptyQuestion,
}

/// Broad classification of a completion service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The service could not be reached.
    Network,
    /// The credential was refused.
    Auth,
    /// The service rejected the call because of a quota or rate limit.
    RateLimited,
    /// The service rejected the request itself.
    Rejected,
    /// The response could not be parsed.
    Malformed,
    /// The response contained no text.
    Empty,
    /// Any other provider-side failure.
    Provider,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceErrorKind::Network => "network error",
            ServiceErrorKind::Auth => "authentication error",
            ServiceErrorKind::RateLimited => "rate limited",
            ServiceErrorKind::Rejected => "request rejected",
            ServiceErrorKind::Malformed => "malformed response",
            ServiceErrorKind::Empty => "empty response",
            ServiceErrorKind::Provider => "provider error",
        };
        f.write_str(s)
    }
}

/// A failed call to the completion service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Completion service {kind}: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The service answered but the answer had no text body.
    pub fn empty() -> Self {
        Self::new(ServiceErrorKind::Empty, "response contained no text")
    }
}

impl From<LLMError> for ServiceError {
    fn from(err: LLMError) -> Self {
        let message = err.to_string();
        let kind = match &err {
            LLMError::HttpError(_) => ServiceErrorKind::Network,
            LLMError::AuthError(_) => ServiceErrorKind::Auth,
            LLMError::InvalidRequest(_) => ServiceErrorKind::Rejected,
            LLMError::JsonError(_) => ServiceErrorKind::Malformed,
            LLMError::ProviderError(msg) if is_rate_limit(msg) => ServiceErrorKind::RateLimited,
            _ => ServiceErrorKind::Provider,
        };
        Self { kind, message }
    }
}

fn is_rate_limit(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("429") || lower.contains("rate limit") || lower.contains("quota")
}

/// A comprehensive error type for all operations in the library API.
#[derive(Error, Debug)]
pub enum RunError {
    /// The agent could not be configured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The user input was rejected.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The completion service failed during a stage.
    #[error(transparent)]
    Service(#[from] ServiceError),
}
