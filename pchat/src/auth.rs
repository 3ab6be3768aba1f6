//! Authentication collaborator contract.

use crate::{ChatError, ChatFuture, UserIdentity};

pub trait Authenticator: Send + Sync {
    /// Resolves the caller's identity; `None` means unauthenticated.
    fn current_user<'a>(&'a self) -> ChatFuture<'a, Result<Option<UserIdentity>, ChatError>>;
}

/// Authenticator with a fixed answer, for wiring and tests.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    identity: Option<UserIdentity>,
}

impl StaticAuthenticator {
    pub fn new(identity: UserIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl Authenticator for StaticAuthenticator {
    fn current_user<'a>(&'a self) -> ChatFuture<'a, Result<Option<UserIdentity>, ChatError>> {
        Box::pin(async move { Ok(self.identity.clone()) })
    }
}
