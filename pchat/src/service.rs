//! Send-message orchestration over the auth, storage, and provider
//! collaborators.

use std::sync::Arc;
use std::time::Duration;

use futures_timer::Delay;
use futures_util::future::{Either, select};
use pprovider::{
    ChatProvider, CompletionRequest, CompletionResponse, FALLBACK_MODEL_IDS, Message,
    ModelCatalog, ProviderError, Role, TIER_COSTS,
};

use crate::{
    Authenticator, CatalogListing, ChatError, NewTurn, SendMessageRequest, SendMessageResult,
    Turn, TurnStore, UserIdentity, build_context, classify, context::CONTEXT_WINDOW_TURNS,
};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant behind a small chat relay. \
    Answer clearly and concisely, and say plainly when you do not know something.";

/// Shown when the provider returned a response without any text output.
pub const FALLBACK_REPLY: &str = "I apologize, but I couldn't generate a response.";

pub const USAGE_ACTION_CHAT_MESSAGE: &str = "chat_message";

/// Tunables for the delivery loop and side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPolicy {
    /// Delivery attempts per request, regardless of catalog size.
    pub max_attempts: usize,
    pub max_output_tokens: u32,
    pub context_window_turns: usize,
    pub title_max_chars: usize,
    /// Per-attempt deadline; `None` leaves attempts unbounded.
    pub attempt_timeout: Option<Duration>,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_output_tokens: 1024,
            context_window_turns: CONTEXT_WINDOW_TURNS,
            title_max_chars: 50,
            attempt_timeout: None,
        }
    }
}

enum DeliveryOutcome {
    Delivered {
        model: String,
        response: CompletionResponse,
    },
    Exhausted {
        attempts: usize,
        last_error: ProviderError,
    },
}

#[derive(Clone)]
pub struct ChatService {
    auth: Arc<dyn Authenticator>,
    store: Arc<dyn TurnStore>,
    provider: Arc<dyn ChatProvider>,
    catalog: Arc<ModelCatalog>,
    policy: ChatPolicy,
    system_prompt: String,
}

impl ChatService {
    pub fn builder() -> ChatServiceBuilder {
        ChatServiceBuilder::new()
    }

    /// Relays one user turn to the provider and persists the exchange.
    ///
    /// On delivery exhaustion the just-persisted user turn is deleted again
    /// (best effort) and the last provider failure is classified into the
    /// user-facing outcome. An assistant-turn persistence failure does NOT
    /// delete the user turn; that asymmetry is deliberate and covered by
    /// tests for both branches.
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageResult, ChatError> {
        let user = self
            .auth
            .current_user()
            .await?
            .ok_or_else(|| ChatError::unauthenticated("sign in to send messages"))?;

        if request.session_id.as_str().trim().is_empty() {
            return Err(ChatError::validation("session_id must not be empty"));
        }

        if request.content.trim().is_empty() {
            return Err(ChatError::validation("content must not be empty"));
        }

        self.store
            .find_session(&request.session_id, &user.id)
            .await?
            .ok_or_else(|| ChatError::not_found("session not found"))?;

        let user_turn = self
            .store
            .insert_turn(NewTurn::user(request.session_id.clone(), request.content.clone()))
            .await?;

        let history = match self
            .store
            .list_turns_ascending(&request.session_id, None)
            .await
        {
            Ok(history) => history,
            Err(error) => {
                tracing::warn!(
                    event = "history_unavailable",
                    session_id = %request.session_id,
                    error = %error
                );
                Vec::new()
            }
        };

        let mut context = build_context(&history, self.policy.context_window_turns);
        if context.is_empty() {
            // Degraded history still needs the current turn on the wire.
            context.push(Message::new(Role::User, request.content.clone()));
        }

        let is_first_exchange = context.len() <= 1;

        match self.attempt_delivery(&context).await {
            DeliveryOutcome::Delivered { model, response } => {
                let content = response
                    .text()
                    .unwrap_or_else(|| FALLBACK_REPLY.to_string());
                let assistant_turn = self
                    .store
                    .insert_turn(NewTurn::assistant(
                        request.session_id.clone(),
                        content,
                        model,
                        response.usage,
                    ))
                    .await?;

                self.run_side_effects(&user, &request, is_first_exchange)
                    .await;

                Ok(SendMessageResult {
                    user_turn,
                    assistant_turn,
                })
            }
            DeliveryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                self.rollback_user_turn(&user_turn).await;
                tracing::error!(
                    event = "delivery_exhausted",
                    session_id = %request.session_id,
                    attempts,
                    error = %last_error
                );
                Err(classify(&last_error))
            }
        }
    }

    /// Read-only catalog view for client display; reuses the cached
    /// listing and performs no orchestration.
    pub async fn models(&self) -> CatalogListing {
        let candidates = self.catalog.list().await;
        let recommended = candidates
            .first()
            .map(|candidate| candidate.id.clone())
            .unwrap_or_else(|| FALLBACK_MODEL_IDS[0].to_string());

        CatalogListing {
            total: candidates.len(),
            models: candidates.into_iter().map(|candidate| candidate.id).collect(),
            recommended,
            cost: TIER_COSTS,
        }
    }

    async fn attempt_delivery(&self, context: &[Message]) -> DeliveryOutcome {
        let candidates = self.catalog.list().await;
        let mut last_error = ProviderError::transport("no delivery attempt was made");
        let mut attempts = 0;

        for candidate in candidates.into_iter().take(self.policy.max_attempts) {
            attempts += 1;
            let request = CompletionRequest::new(
                candidate.id.clone(),
                context.to_vec(),
                self.policy.max_output_tokens,
            )
            .with_system(self.system_prompt.clone());

            match self.complete_with_deadline(request).await {
                Ok(response) => {
                    tracing::info!(
                        event = "delivery_succeeded",
                        model = %candidate.id,
                        attempt = attempts
                    );
                    return DeliveryOutcome::Delivered {
                        model: candidate.id,
                        response,
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        event = "delivery_attempt_failed",
                        model = %candidate.id,
                        attempt = attempts,
                        error = %error
                    );
                    last_error = error;
                }
            }
        }

        DeliveryOutcome::Exhausted {
            attempts,
            last_error,
        }
    }

    async fn complete_with_deadline(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let Some(timeout) = self.policy.attempt_timeout else {
            return self.provider.complete(request).await;
        };

        let completion = self.provider.complete(request);
        let deadline = Delay::new(timeout);

        match select(completion, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(ProviderError::timeout(format!(
                "delivery attempt exceeded {}ms",
                timeout.as_millis()
            ))),
        }
    }

    /// Compensating delete of the user turn after delivery exhaustion. Its
    /// own failure is logged and swallowed; the caller still gets the
    /// classified provider outcome.
    async fn rollback_user_turn(&self, turn: &Turn) {
        if let Err(error) = self.store.delete_turn(&turn.id).await {
            tracing::warn!(
                event = "rollback_failed",
                turn_id = %turn.id,
                error = %error
            );
        }
    }

    async fn run_side_effects(
        &self,
        user: &UserIdentity,
        request: &SendMessageRequest,
        is_first_exchange: bool,
    ) {
        if is_first_exchange {
            let title = truncate_title(&request.content, self.policy.title_max_chars);
            if let Err(error) = self
                .store
                .update_session_title(&request.session_id, &title)
                .await
            {
                tracing::warn!(
                    event = "title_update_failed",
                    session_id = %request.session_id,
                    error = %error
                );
            }
        }

        if let Err(error) = self.store.increment_usage_counter(&user.id).await {
            tracing::warn!(event = "usage_counter_failed", user_id = %user.id, error = %error);
        }

        if let Err(error) = self
            .store
            .append_usage_log(&user.id, USAGE_ACTION_CHAT_MESSAGE)
            .await
        {
            tracing::warn!(event = "usage_log_failed", user_id = %user.id, error = %error);
        }
    }
}

fn truncate_title(content: &str, max_chars: usize) -> String {
    let mut chars = content.chars();
    let title = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        format!("{title}...")
    } else {
        title
    }
}

pub struct ChatServiceBuilder {
    auth: Option<Arc<dyn Authenticator>>,
    store: Option<Arc<dyn TurnStore>>,
    provider: Option<Arc<dyn ChatProvider>>,
    catalog: Option<Arc<ModelCatalog>>,
    policy: ChatPolicy,
    system_prompt: String,
}

impl Default for ChatServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatServiceBuilder {
    pub fn new() -> Self {
        Self {
            auth: None,
            store: None,
            provider: None,
            catalog: None,
            policy: ChatPolicy::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn authenticator(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn store(mut self, store: Arc<dyn TurnStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn catalog(mut self, catalog: Arc<ModelCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn build(self) -> Result<ChatService, ChatError> {
        let auth = self
            .auth
            .ok_or_else(|| ChatError::validation("an authenticator is required"))?;
        let store = self
            .store
            .ok_or_else(|| ChatError::validation("a turn store is required"))?;
        let provider = self
            .provider
            .ok_or_else(|| ChatError::validation("a chat provider is required"))?;
        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(ModelCatalog::new(Arc::clone(&provider))));

        Ok(ChatService {
            auth,
            store,
            provider,
            catalog,
            policy: self.policy,
            system_prompt: self.system_prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pcommon::{SessionId, UserId};
    use pprovider::{
        ModelInfo, OutputItem, ProviderFuture, TokenUsage,
    };

    use super::*;
    use crate::{ChatErrorKind, InMemoryTurnStore, SessionRecord, StaticAuthenticator};

    struct FakeProvider {
        model_ids: Vec<&'static str>,
        completions: Mutex<Vec<Result<CompletionResponse, ProviderError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        hang: bool,
    }

    impl FakeProvider {
        fn new(
            model_ids: Vec<&'static str>,
            completions: Vec<Result<CompletionResponse, ProviderError>>,
        ) -> Self {
            Self {
                model_ids,
                completions: Mutex::new(completions),
                requests: Mutex::new(Vec::new()),
                hang: false,
            }
        }

        fn hanging(model_ids: Vec<&'static str>) -> Self {
            Self {
                model_ids,
                completions: Mutex::new(Vec::new()),
                requests: Mutex::new(Vec::new()),
                hang: true,
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().expect("requests lock").clone()
        }
    }

    impl ChatProvider for FakeProvider {
        fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelInfo>, ProviderError>> {
            Box::pin(async move {
                Ok(self
                    .model_ids
                    .iter()
                    .map(|id| ModelInfo::new(*id))
                    .collect())
            })
        }

        fn complete<'a>(
            &'a self,
            request: CompletionRequest,
        ) -> ProviderFuture<'a, Result<CompletionResponse, ProviderError>> {
            Box::pin(async move {
                self.requests.lock().expect("requests lock").push(request);
                if self.hang {
                    std::future::pending::<()>().await;
                }

                let mut completions = self.completions.lock().expect("completions lock");
                if completions.is_empty() {
                    Err(ProviderError::transport("completion script exhausted"))
                } else {
                    completions.remove(0)
                }
            })
        }
    }

    fn text_response(model: &str, text: &str) -> CompletionResponse {
        CompletionResponse {
            model: model.to_string(),
            output: vec![OutputItem::Text(text.to_string())],
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 4,
            },
        }
    }

    fn service_with(
        provider: Arc<FakeProvider>,
        store: Arc<InMemoryTurnStore>,
    ) -> ChatService {
        ChatService::builder()
            .authenticator(Arc::new(StaticAuthenticator::new(UserIdentity::new("alice"))))
            .store(store)
            .provider(provider)
            .build()
            .expect("service should build")
    }

    fn seeded_store() -> Arc<InMemoryTurnStore> {
        let store = Arc::new(InMemoryTurnStore::new());
        store.create_session(SessionRecord::new("s1", "alice"));
        store
    }

    #[tokio::test]
    async fn send_message_persists_both_turns_and_returns_the_reply() {
        let provider = Arc::new(FakeProvider::new(
            vec!["claude-3-5-haiku-20241022"],
            vec![Ok(text_response("claude-3-5-haiku-20241022", "hello there"))],
        ));
        let store = seeded_store();
        let service = service_with(Arc::clone(&provider), Arc::clone(&store));

        let result = service
            .send_message(SendMessageRequest::new("s1", "hi"))
            .await
            .expect("send should work");

        assert_eq!(result.user_turn.role, Role::User);
        assert_eq!(result.user_turn.content, "hi");
        assert_eq!(result.assistant_turn.role, Role::Assistant);
        assert_eq!(result.assistant_turn.content, "hello there");
        assert_eq!(
            result.assistant_turn.model_used.as_deref(),
            Some("claude-3-5-haiku-20241022")
        );
        assert_eq!(
            result.assistant_turn.token_usage.map(|usage| usage.input_tokens),
            Some(10)
        );

        let session_id = SessionId::new("s1");
        let turns = store
            .list_turns_ascending(&session_id, None)
            .await
            .expect("list works");
        assert_eq!(turns.len(), 2);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
        assert_eq!(requests[0].max_tokens, 1024);
        assert_eq!(requests[0].messages.last().map(|m| m.content.as_str()), Some("hi"));
    }

    #[tokio::test]
    async fn fallback_uses_the_model_that_actually_succeeded() {
        // Catalog order within the haiku tier is descending by raw id, so
        // claude-3-haiku-20240307 is attempted first here.
        let provider = Arc::new(FakeProvider::new(
            vec!["claude-3-5-haiku-20241022", "claude-3-haiku-20240307"],
            vec![
                Err(ProviderError::overloaded("first model busy")),
                Ok(text_response("claude-3-5-haiku-20241022", "second answered")),
            ],
        ));
        let store = seeded_store();
        let service = service_with(Arc::clone(&provider), store);

        let result = service
            .send_message(SendMessageRequest::new("s1", "hi"))
            .await
            .expect("send should work");

        assert_eq!(
            result.assistant_turn.model_used.as_deref(),
            Some("claude-3-5-haiku-20241022")
        );
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn attempts_are_capped_at_three_even_with_a_larger_catalog() {
        let provider = Arc::new(FakeProvider::new(
            vec![
                "claude-3-5-haiku-20241022",
                "claude-3-haiku-20240307",
                "claude-3-5-sonnet-20241022",
                "claude-sonnet-4-20250514",
                "claude-opus-4-20250514",
            ],
            vec![
                Err(ProviderError::overloaded("one")),
                Err(ProviderError::overloaded("two")),
                Err(ProviderError::new(Some(500), None, "three")),
            ],
        ));
        let store = seeded_store();
        let service = service_with(Arc::clone(&provider), store);

        let error = service
            .send_message(SendMessageRequest::new("s1", "hi"))
            .await
            .expect_err("send should fail");

        assert_eq!(provider.requests().len(), 3);
        // The last seen failure feeds classification.
        assert_eq!(error.kind, ChatErrorKind::Unavailable);
        assert_eq!(error.message, "AI service error: three");
    }

    #[tokio::test]
    async fn exhaustion_rolls_back_the_user_turn() {
        let provider = Arc::new(FakeProvider::new(
            vec!["claude-3-5-haiku-20241022"],
            vec![Err(ProviderError::overloaded("busy"))],
        ));
        let store = seeded_store();
        let service = service_with(provider, Arc::clone(&store));

        let error = service
            .send_message(SendMessageRequest::new("s1", "hi"))
            .await
            .expect_err("send should fail");
        assert_eq!(error.kind, ChatErrorKind::Unavailable);

        let session_id = SessionId::new("s1");
        let turns = store
            .list_turns_ascending(&session_id, None)
            .await
            .expect("list works");
        assert!(turns.is_empty());

        // No side effects ran on the failure path.
        assert_eq!(store.usage_count(&UserId::new("alice")), 0);
    }

    #[tokio::test]
    async fn anonymous_callers_are_rejected_before_any_persistence() {
        let provider = Arc::new(FakeProvider::new(vec!["claude-3-5-haiku-20241022"], Vec::new()));
        let store = seeded_store();
        let service = ChatService::builder()
            .authenticator(Arc::new(StaticAuthenticator::anonymous()))
            .store(store.clone())
            .provider(provider.clone())
            .build()
            .expect("service should build");

        let error = service
            .send_message(SendMessageRequest::new("s1", "hi"))
            .await
            .expect_err("send should fail");

        assert_eq!(error.kind, ChatErrorKind::Unauthenticated);
        assert_eq!(error.http_status(), 401);

        let session_id = SessionId::new("s1");
        let turns = store
            .list_turns_ascending(&session_id, None)
            .await
            .expect("list works");
        assert!(turns.is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn blank_content_fails_validation() {
        let provider = Arc::new(FakeProvider::new(vec!["claude-3-5-haiku-20241022"], Vec::new()));
        let service = service_with(provider, seeded_store());

        let error = service
            .send_message(SendMessageRequest::new("s1", "   "))
            .await
            .expect_err("send should fail");

        assert_eq!(error.kind, ChatErrorKind::Validation);
        assert_eq!(error.http_status(), 400);
    }

    #[tokio::test]
    async fn unknown_session_returns_not_found() {
        let provider = Arc::new(FakeProvider::new(vec!["claude-3-5-haiku-20241022"], Vec::new()));
        let service = service_with(provider, seeded_store());

        let error = service
            .send_message(SendMessageRequest::new("other-session", "hi"))
            .await
            .expect_err("send should fail");

        assert_eq!(error.kind, ChatErrorKind::NotFound);
        assert_eq!(error.http_status(), 404);
    }

    #[tokio::test]
    async fn sessions_of_other_users_look_like_missing_sessions() {
        let provider = Arc::new(FakeProvider::new(vec!["claude-3-5-haiku-20241022"], Vec::new()));
        let store = Arc::new(InMemoryTurnStore::new());
        store.create_session(SessionRecord::new("s1", "someone-else"));
        let service = service_with(provider, store);

        let error = service
            .send_message(SendMessageRequest::new("s1", "hi"))
            .await
            .expect_err("send should fail");
        assert_eq!(error.kind, ChatErrorKind::NotFound);
    }

    #[tokio::test]
    async fn non_text_output_falls_back_to_the_fixed_reply() {
        let provider = Arc::new(FakeProvider::new(
            vec!["claude-3-5-haiku-20241022"],
            vec![Ok(CompletionResponse {
                model: "claude-3-5-haiku-20241022".to_string(),
                output: vec![OutputItem::Unsupported("tool_use".to_string())],
                usage: TokenUsage::default(),
            })],
        ));
        let service = service_with(provider, seeded_store());

        let result = service
            .send_message(SendMessageRequest::new("s1", "hi"))
            .await
            .expect("send should work");

        assert_eq!(result.assistant_turn.content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn hung_attempts_are_cut_off_by_the_policy_deadline() {
        let provider = Arc::new(FakeProvider::hanging(vec!["claude-3-5-haiku-20241022"]));
        let store = seeded_store();
        let service = ChatService::builder()
            .authenticator(Arc::new(StaticAuthenticator::new(UserIdentity::new("alice"))))
            .store(store)
            .provider(provider)
            .policy(ChatPolicy {
                max_attempts: 1,
                attempt_timeout: Some(Duration::from_millis(20)),
                ..ChatPolicy::default()
            })
            .build()
            .expect("service should build");

        let error = service
            .send_message(SendMessageRequest::new("s1", "hi"))
            .await
            .expect_err("send should fail");

        assert_eq!(error.kind, ChatErrorKind::Unavailable);
        assert!(error.message.contains("exceeded 20ms"));
    }

    #[tokio::test]
    async fn models_lists_ids_with_recommendation_and_costs() {
        let provider = Arc::new(FakeProvider::new(
            vec!["claude-sonnet-4-20250514", "claude-3-5-haiku-20241022"],
            Vec::new(),
        ));
        let service = service_with(provider, seeded_store());

        let listing = service.models().await;
        assert_eq!(listing.total, 2);
        assert_eq!(listing.models[0], "claude-3-5-haiku-20241022");
        assert_eq!(listing.recommended, "claude-3-5-haiku-20241022");
        assert_eq!(listing.cost, TIER_COSTS);
    }

    #[tokio::test]
    async fn catalog_listing_is_stable_within_the_ttl_window() {
        let provider = Arc::new(FakeProvider::new(
            vec!["claude-3-5-haiku-20241022", "claude-sonnet-4-20250514"],
            Vec::new(),
        ));
        let service = service_with(provider, seeded_store());

        let first = service.models().await;
        let second = service.models().await;
        assert_eq!(first, second);
    }

    #[test]
    fn default_policy_matches_the_documented_bounds() {
        let policy = ChatPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.max_output_tokens, 1024);
        assert_eq!(policy.context_window_turns, 10);
        assert_eq!(policy.title_max_chars, 50);
        assert_eq!(policy.attempt_timeout, None);
    }

    #[test]
    fn title_truncation_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate_title("short", 50), "short");

        let long = "x".repeat(60);
        let title = truncate_title(&long, 50);
        assert_eq!(title.chars().count(), 53);
        assert!(title.ends_with("..."));

        // Multi-byte content must not split a character.
        let accented = "é".repeat(60);
        let title = truncate_title(&accented, 50);
        assert!(title.starts_with(&"é".repeat(50)));
        assert!(title.ends_with("..."));
    }

    #[test]
    fn builder_requires_its_collaborators() {
        let error = ChatService::builder().build().err().expect("build should fail");
        assert_eq!(error.kind, ChatErrorKind::Validation);
    }
}
