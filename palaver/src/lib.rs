//! Unified facade over the palaver workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the core palaver crates and provides convenience helpers for
//! wiring a relay out of a provider, a store, and an authenticator.

pub mod prelude;
pub mod providers;
pub mod runtime;
pub mod util;

pub use pchat;
pub use pcommon;
pub use pprovider;

pub use pchat::{
    Authenticator, CatalogListing, ChatError, ChatErrorKind, ChatPolicy, ChatService,
    ChatServiceBuilder, InMemoryTurnStore, NewTurn, SendMessageRequest, SendMessageResult,
    SessionRecord, StaticAuthenticator, Turn, TurnStore, UsageLogEntry, UserIdentity,
    build_context, classify,
};
pub use pcommon::{BoxFuture, SessionId, TurnId, UserId};
pub use pprovider::adapters::anthropic::{AnthropicHttpTransport, AnthropicProvider, AnthropicTransport};
pub use pprovider::{
    CatalogSnapshot, ChatProvider, CompletionRequest, CompletionResponse, FALLBACK_MODEL_IDS,
    Message, ModelCandidate, ModelCatalog, ModelInfo, ModelTier, OutputItem, ProviderError,
    ProviderFuture, Role, TIER_COSTS, TierCosts, TokenUsage,
};

pub use providers::{
    ProviderBuildConfig, build_provider_from_api_key, build_provider_with_config,
};
pub use runtime::{RelayBundle, build_relay, build_relay_with, chat_service, in_memory_store};
pub use util::{assistant_message, send, session, user_message};
