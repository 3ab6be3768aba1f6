//! Chat-layer error taxonomy with HTTP status mapping.
//!
//! ```rust
//! use pchat::{ChatError, ChatErrorKind};
//!
//! let error = ChatError::rate_limited("try again in a moment");
//! assert_eq!(error.kind, ChatErrorKind::RateLimited);
//! assert_eq!(error.http_status(), 429);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    Unauthenticated,
    Validation,
    NotFound,
    AccessDenied,
    BillingRequired,
    RateLimited,
    Unavailable,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Unauthenticated, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::NotFound, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::AccessDenied, message)
    }

    pub fn billing_required(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::BillingRequired, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::RateLimited, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Unavailable, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Persistence, message)
    }

    /// Status returned to HTTP callers for this outcome.
    pub fn http_status(&self) -> u16 {
        match self.kind {
            ChatErrorKind::Unauthenticated => 401,
            ChatErrorKind::Validation | ChatErrorKind::BillingRequired => 400,
            ChatErrorKind::NotFound => 404,
            ChatErrorKind::AccessDenied => 403,
            ChatErrorKind::RateLimited => 429,
            ChatErrorKind::Unavailable => 503,
            ChatErrorKind::Persistence => 500,
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}
