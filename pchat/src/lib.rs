//! Send-message orchestration: authentication, bounded context, delivery
//! with model fallback, and compensating persistence.
//!
//! ```rust
//! use pchat::{ChatPolicy, classify};
//! use pprovider::ProviderError;
//!
//! assert_eq!(ChatPolicy::default().max_attempts, 3);
//!
//! let outcome = classify(&ProviderError::rate_limited("slow down"));
//! assert_eq!(outcome.http_status(), 429);
//! ```

mod auth;
mod classify;
mod context;
mod error;
mod service;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        Authenticator, CatalogListing, ChatError, ChatErrorKind, ChatPolicy, ChatService,
        ChatServiceBuilder, InMemoryTurnStore, NewTurn, SendMessageRequest, SendMessageResult,
        SessionRecord, StaticAuthenticator, Turn, TurnStore, UserIdentity, build_context,
        classify,
    };
}

pub use auth::{Authenticator, StaticAuthenticator};
pub use classify::{ACCESS_GUIDANCE, BILLING_GUIDANCE, RATE_LIMIT_GUIDANCE, classify};
pub use context::{CONTEXT_WINDOW_TURNS, build_context};
pub use error::{ChatError, ChatErrorKind};
pub use service::{
    ChatPolicy, ChatService, ChatServiceBuilder, DEFAULT_SYSTEM_PROMPT, FALLBACK_REPLY,
    USAGE_ACTION_CHAT_MESSAGE,
};
pub use store::{ChatFuture, InMemoryTurnStore, TurnStore, UsageLogEntry};
pub use types::{
    CatalogListing, NewTurn, SendMessageRequest, SendMessageResult, SessionRecord, Turn,
    UserIdentity,
};
