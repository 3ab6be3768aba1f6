//! Classification of exhausted provider failures into user-facing outcomes.
//!
//! Rules are an ordered table evaluated top-down; the first matching
//! predicate decides the outcome.
//!
//! ```rust
//! use pchat::{ChatErrorKind, classify};
//! use pprovider::ProviderError;
//!
//! let outcome = classify(&ProviderError::not_found("model: nope"));
//! assert_eq!(outcome.kind, ChatErrorKind::AccessDenied);
//! assert_eq!(outcome.http_status(), 403);
//! ```

use pprovider::{ErrorType, ProviderError};

use crate::ChatError;

pub const ACCESS_GUIDANCE: &str = "Your Anthropic API key doesn't have access to Claude models. \
    Check your API key at console.anthropic.com, verify billing is set up, make sure the key \
    starts with 'sk-ant-api03-', or generate a new key.";

pub const BILLING_GUIDANCE: &str = "Anthropic API credits needed. Please add credits at \
    console.anthropic.com under Plans & Billing.";

pub const RATE_LIMIT_GUIDANCE: &str =
    "AI service rate limit reached. Please try again in a moment.";

struct ClassificationRule {
    matches: fn(&ProviderError) -> bool,
    outcome: fn(&ProviderError) -> ChatError,
}

const RULES: [ClassificationRule; 3] = [
    ClassificationRule {
        matches: is_access_denied,
        outcome: access_denied_outcome,
    },
    ClassificationRule {
        matches: is_billing_required,
        outcome: billing_required_outcome,
    },
    ClassificationRule {
        matches: is_rate_limited,
        outcome: rate_limited_outcome,
    },
];

/// Maps the last provider failure of an exhausted delivery loop to the
/// outcome shown to the caller. Pure.
pub fn classify(error: &ProviderError) -> ChatError {
    for rule in &RULES {
        if (rule.matches)(error) {
            return (rule.outcome)(error);
        }
    }

    unavailable_outcome(error)
}

fn is_access_denied(error: &ProviderError) -> bool {
    error.status == Some(404) || error.error_type == Some(ErrorType::NotFound)
}

fn is_billing_required(error: &ProviderError) -> bool {
    let message = error.message.to_lowercase();
    message.contains("credit balance")
        || message.contains("billing")
        || error.error_type == Some(ErrorType::InvalidRequest)
}

fn is_rate_limited(error: &ProviderError) -> bool {
    error.status == Some(429) || error.message.to_lowercase().contains("rate limit")
}

fn access_denied_outcome(_error: &ProviderError) -> ChatError {
    ChatError::access_denied(ACCESS_GUIDANCE)
}

fn billing_required_outcome(_error: &ProviderError) -> ChatError {
    ChatError::billing_required(BILLING_GUIDANCE)
}

fn rate_limited_outcome(_error: &ProviderError) -> ChatError {
    ChatError::rate_limited(RATE_LIMIT_GUIDANCE)
}

fn unavailable_outcome(error: &ProviderError) -> ChatError {
    if error.message.trim().is_empty() {
        ChatError::unavailable(
            "AI service error: Please check your Anthropic API key and credits.",
        )
    } else {
        ChatError::unavailable(format!("AI service error: {}", error.message))
    }
}
