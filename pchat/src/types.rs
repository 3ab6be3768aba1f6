//! Turn, session, and request/result types for the send-message path.

use std::time::SystemTime;

use pcommon::{SessionId, TurnId, UserId};
use pprovider::{Role, TierCosts, TokenUsage};

/// One persisted conversation turn. Immutable once stored, except for the
/// compensating delete after delivery exhaustion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub id: TurnId,
    pub session_id: SessionId,
    pub role: Role,
    pub content: String,
    pub model_used: Option<String>,
    pub token_usage: Option<TokenUsage>,
    pub created_at: SystemTime,
}

/// A turn awaiting insertion; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTurn {
    pub session_id: SessionId,
    pub role: Role,
    pub content: String,
    pub model_used: Option<String>,
    pub token_usage: Option<TokenUsage>,
}

impl NewTurn {
    pub fn user(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            role: Role::User,
            content: content.into(),
            model_used: None,
            token_usage: None,
        }
    }

    pub fn assistant(
        session_id: SessionId,
        content: impl Into<String>,
        model_used: impl Into<String>,
        token_usage: TokenUsage,
    ) -> Self {
        Self {
            session_id,
            role: Role::Assistant,
            content: content.into(),
            model_used: Some(model_used.into()),
            token_usage: Some(token_usage),
        }
    }
}

/// Session row as seen by the core: existence plus the display title the
/// first-exchange side effect may replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: UserId,
    pub title: Option<String>,
}

impl SessionRecord {
    pub fn new(id: impl Into<SessionId>, user_id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: UserId,
}

impl UserIdentity {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub session_id: SessionId,
    pub content: String,
}

impl SendMessageRequest {
    pub fn new(session_id: impl Into<SessionId>, content: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageResult {
    pub user_turn: Turn,
    pub assistant_turn: Turn,
}

/// Read-only catalog view for client display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogListing {
    pub total: usize,
    pub models: Vec<String>,
    pub recommended: String,
    pub cost: TierCosts,
}
