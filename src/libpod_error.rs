//! Error type for libpod pod operations.
//!
//! Three families share one enum:
//! - transport failures (`Transport`, `Cancelled`): no status code was obtained,
//! - domain failures (`Api`, `Decode`): the server answered with a status code,
//! - configuration failures (`MissingEnv`, `InvalidEnv`): raised while loading config.

use thiserror::Error;

/// Boxed error produced by a [`crate::Transport`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for libpod client operations.
#[derive(Debug, Error)]
pub enum LibpodError {
    /// Missing required environment variable.
    #[error("missing required env var: {0}")]
    MissingEnv(&'static str),

    /// Invalid environment variable value.
    #[error("invalid env var {key}={value:?}: {reason}")]
    InvalidEnv {
        /// The environment variable key.
        key: &'static str,
        /// The environment variable value.
        value: String,
        /// The reason for invalidity.
        reason: &'static str,
    },

    /// The request failed before any response status was received.
    #[error("transport error: {source}")]
    Transport {
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// The call's cancellation token fired before the outcome was delivered.
    #[error("request cancelled")]
    Cancelled,

    /// The server answered with a status the operation does not treat as success.
    #[error("(HTTP code {status}) {reason}{}", message_suffix(.message))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the operation's status table.
        reason: &'static str,
        /// Message reported by the server in the response body, if any.
        message: Option<String>,
    },

    /// The response body could not be decoded.
    #[error("(HTTP code {status}) invalid response body: {source}")]
    Decode {
        /// HTTP status code of the response.
        status: u16,
        /// JSON parsing error.
        #[source]
        source: serde_json::Error,
    },
}

impl LibpodError {
    /// Wrap any transport-level failure.
    #[must_use]
    pub fn transport(source: impl Into<BoxError>) -> Self {
        Self::Transport {
            source: source.into(),
        }
    }

    /// True for failures that happened before a status code was classified.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Cancelled)
    }

    /// True if the call was cancelled through its cancellation token.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True for failures classified from a server response.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Decode { .. })
    }

    /// HTTP status code attached to a domain error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LibpodError {
    fn from(value: reqwest::Error) -> Self {
        Self::transport(value)
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" - {m}"))
        .unwrap_or_default()
}
