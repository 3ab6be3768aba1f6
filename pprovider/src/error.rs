//! Provider failure values carrying upstream status, type, and message.
//!
//! ```rust
//! use pprovider::{ErrorType, ProviderError};
//!
//! let missing = ProviderError::not_found("model does not exist");
//! assert_eq!(missing.status, Some(404));
//! assert_eq!(missing.error_type, Some(ErrorType::NotFound));
//!
//! let throttled = ProviderError::rate_limited("slow down");
//! assert_eq!(throttled.status, Some(429));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Structured error category reported by the provider's error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    NotFound,
    InvalidRequest,
    Authentication,
    RateLimit,
    Overloaded,
    Api,
}

impl ErrorType {
    /// Maps the wire-level `type` string to a known category.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "not_found_error" => Some(Self::NotFound),
            "invalid_request_error" => Some(Self::InvalidRequest),
            "authentication_error" => Some(Self::Authentication),
            "rate_limit_error" => Some(Self::RateLimit),
            "overloaded_error" => Some(Self::Overloaded),
            "api_error" => Some(Self::Api),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub status: Option<u16>,
    pub error_type: Option<ErrorType>,
    pub message: String,
}

impl ProviderError {
    pub fn new(
        status: Option<u16>,
        error_type: Option<ErrorType>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_type,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Some(404), Some(ErrorType::NotFound), message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(Some(400), Some(ErrorType::InvalidRequest), message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(Some(401), Some(ErrorType::Authentication), message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(Some(429), Some(ErrorType::RateLimit), message)
    }

    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::new(Some(529), Some(ErrorType::Overloaded), message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(Some(408), None, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, None, message)
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.error_type) {
            (Some(status), Some(error_type)) => {
                write!(f, "{status} {error_type:?}: {}", self.message)
            }
            (Some(status), None) => write!(f, "{status}: {}", self.message),
            (None, Some(error_type)) => write!(f, "{error_type:?}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl Error for ProviderError {}
