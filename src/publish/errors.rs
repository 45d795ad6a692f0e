//! Publish error types and diagnostics.

use thiserror::Error;
use url::Url;

use crate::util::diagnostic::{suggestions, Diagnostic, ErrorKind};

/// A publish call failed. Nothing was stored unless stated otherwise.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("repository refused credentials for {url} (HTTP {status})")]
    Auth { url: Url, status: u16 },

    #[error("repository rejected the artifact at {url} (HTTP {status})")]
    Rejected {
        url: Url,
        status: u16,
        message: String,
    },

    #[error("publishing to {url} failed after {attempts} attempts: {cause}")]
    Transient {
        url: Url,
        attempts: u32,
        cause: String,
    },

    #[error("publish cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("invalid repository endpoint `{endpoint}`: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("failed to initialize HTTP client: {0}")]
    Client(String),
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublishError::Auth { .. } => ErrorKind::PublishAuth,
            PublishError::Rejected { .. } => ErrorKind::PublishRejected,
            PublishError::Transient { .. } => ErrorKind::PublishTransient,
            PublishError::Cancelled { .. } => ErrorKind::Cancelled,
            PublishError::InvalidEndpoint { .. } | PublishError::Client(_) => ErrorKind::Input,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_kind(self.kind());
        match self {
            PublishError::Auth { .. } => diag.with_suggestion(suggestions::CHECK_TOKEN),
            PublishError::Rejected { message, .. } if !message.is_empty() => {
                diag.with_context(format!("server said: {}", message))
            }
            PublishError::Transient { .. } => diag.with_suggestion(suggestions::RETRY_LATER),
            _ => diag,
        }
    }
}
