//! Common imports for most palaver applications.

pub use crate::{
    assistant_message, build_relay, build_relay_with, chat_service, in_memory_store, send,
    session, user_message,
};
pub use crate::{ProviderBuildConfig, build_provider_from_api_key, build_provider_with_config};
pub use crate::{
    Authenticator, CatalogListing, ChatError, ChatErrorKind, ChatPolicy, ChatProvider,
    ChatService, ChatServiceBuilder, CompletionRequest, CompletionResponse, InMemoryTurnStore,
    Message, ModelCandidate, ModelCatalog, ModelTier, NewTurn, OutputItem, ProviderError,
    RelayBundle, Role, SendMessageRequest, SendMessageResult, SessionId, SessionRecord,
    StaticAuthenticator, TokenUsage, Turn, TurnId, TurnStore, UserId, UserIdentity, classify,
};
