//! Text-generation capability used by the classifier.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Prompt in, free-form text out. One call per prompt, no conversation state.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Failures while talking to a generation provider.
#[derive(Debug)]
pub enum GenerationError {
    /// Transport-level failure (DNS, TLS, connection reset, body decode).
    Network(reqwest::Error),
    /// Provider answered with a non-success status.
    Api { status: u16, message: String },
    /// Provider answered 2xx but without usable text.
    InvalidResponse(String),
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(err) => write!(f, "network error: {err}"),
            Self::Api { status, message } => write!(f, "API error {status}: {message}"),
            Self::InvalidResponse(message) => write!(f, "invalid response: {message}"),
        }
    }
}

impl Error for GenerationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network(err) => Some(err),
            Self::Api { .. } | Self::InvalidResponse(_) => None,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value)
    }
}
