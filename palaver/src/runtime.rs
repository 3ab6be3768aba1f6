//! Runtime wiring helpers for relay usage.

use std::sync::Arc;

use crate::{
    Authenticator, ChatError, ChatPolicy, ChatProvider, ChatService, InMemoryTurnStore,
    StaticAuthenticator, TurnStore, UserIdentity,
};

/// Fully wired relay with the store kept accessible for seeding sessions
/// and inspecting usage.
#[derive(Clone)]
pub struct RelayBundle {
    pub store: Arc<InMemoryTurnStore>,
    pub chat: ChatService,
}

pub fn in_memory_store() -> Arc<InMemoryTurnStore> {
    Arc::new(InMemoryTurnStore::new())
}

pub fn chat_service(
    provider: Arc<dyn ChatProvider>,
    auth: Arc<dyn Authenticator>,
    store: Arc<dyn TurnStore>,
) -> Result<ChatService, ChatError> {
    ChatService::builder()
        .provider(provider)
        .authenticator(auth)
        .store(store)
        .build()
}

/// Relay over an in-memory store with a fixed caller identity.
pub fn build_relay(
    provider: Arc<dyn ChatProvider>,
    user: UserIdentity,
) -> Result<RelayBundle, ChatError> {
    build_relay_with(provider, user, ChatPolicy::default())
}

pub fn build_relay_with(
    provider: Arc<dyn ChatProvider>,
    user: UserIdentity,
    policy: ChatPolicy,
) -> Result<RelayBundle, ChatError> {
    let store = in_memory_store();
    let chat = ChatService::builder()
        .provider(provider)
        .authenticator(Arc::new(StaticAuthenticator::new(user)))
        .store(Arc::clone(&store) as Arc<dyn TurnStore>)
        .policy(policy)
        .build()?;

    Ok(RelayBundle { store, chat })
}
