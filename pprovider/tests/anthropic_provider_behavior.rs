//! Behavior tests for the Anthropic provider over a fake transport.

use std::sync::{Arc, Mutex};

use pprovider::adapters::anthropic::{
    AnthropicProvider, AnthropicTransport, MessagesRequest, MessagesResponse, ModelsPage,
    WireUsage,
};
use pprovider::{
    ChatProvider, CompletionRequest, ErrorType, Message, OutputItem, ProviderError,
    ProviderFuture, Role,
};

#[derive(Debug, Default)]
struct FakeTransport {
    requests: Mutex<Vec<MessagesRequest>>,
    messages_result: Mutex<Option<Result<MessagesResponse, ProviderError>>>,
    models_result: Mutex<Option<Result<ModelsPage, ProviderError>>>,
}

impl FakeTransport {
    fn with_messages_result(self, result: Result<MessagesResponse, ProviderError>) -> Self {
        *self.messages_result.lock().expect("messages lock") = Some(result);
        self
    }

    fn with_models_result(self, result: Result<ModelsPage, ProviderError>) -> Self {
        *self.models_result.lock().expect("models lock") = Some(result);
        self
    }
}

impl AnthropicTransport for FakeTransport {
    fn get_models<'a>(
        &'a self,
        _api_key: &'a str,
    ) -> ProviderFuture<'a, Result<ModelsPage, ProviderError>> {
        Box::pin(async move {
            self.models_result
                .lock()
                .expect("models lock")
                .take()
                .unwrap_or_else(|| Err(ProviderError::transport("no scripted models result")))
        })
    }

    fn post_messages<'a>(
        &'a self,
        request: MessagesRequest,
        _api_key: &'a str,
    ) -> ProviderFuture<'a, Result<MessagesResponse, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            self.messages_result
                .lock()
                .expect("messages lock")
                .take()
                .unwrap_or_else(|| Err(ProviderError::transport("no scripted messages result")))
        })
    }
}

fn text_response(model: &str, text: &str) -> MessagesResponse {
    serde_json::from_value(serde_json::json!({
        "model": model,
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 7, "output_tokens": 3}
    }))
    .expect("build response")
}

#[test]
fn constructor_rejects_foreign_api_keys() {
    let transport = Arc::new(FakeTransport::default());
    let error = AnthropicProvider::new(transport, "sk-proj-123")
        .err()
        .expect("foreign key should fail");

    assert_eq!(error.error_type, Some(ErrorType::Authentication));
}

#[tokio::test]
async fn complete_maps_wire_response_and_sends_system_prompt() {
    let transport = Arc::new(
        FakeTransport::default()
            .with_messages_result(Ok(text_response("claude-3-5-haiku-20241022", "hello"))),
    );
    let provider = AnthropicProvider::new(Arc::clone(&transport) as _, "sk-ant-api03-test")
        .expect("provider should build");

    let request = CompletionRequest::new(
        "claude-3-5-haiku-20241022",
        vec![
            Message::new(Role::User, "earlier question"),
            Message::new(Role::Assistant, "earlier answer"),
            Message::new(Role::User, "new question"),
        ],
        1024,
    )
    .with_system("be helpful");

    let response = provider.complete(request).await.expect("completion works");
    assert_eq!(response.model, "claude-3-5-haiku-20241022");
    assert_eq!(response.output, vec![OutputItem::Text("hello".to_string())]);
    assert_eq!(response.usage.input_tokens, 7);
    assert_eq!(response.usage.output_tokens, 3);

    let sent = transport.requests.lock().expect("requests lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].system.as_deref(), Some("be helpful"));
    assert_eq!(sent[0].max_tokens, 1024);
    assert_eq!(sent[0].messages[0].role, "user");
    assert_eq!(sent[0].messages[1].role, "assistant");
}

#[tokio::test]
async fn complete_validates_before_touching_the_wire() {
    let transport = Arc::new(FakeTransport::default());
    let provider = AnthropicProvider::new(Arc::clone(&transport) as _, "sk-ant-api03-test")
        .expect("provider should build");

    let invalid = CompletionRequest::new("", vec![Message::new(Role::User, "hi")], 1024);
    let error = provider
        .complete(invalid)
        .await
        .err()
        .expect("validation should fail");

    assert_eq!(error.error_type, Some(ErrorType::InvalidRequest));
    assert!(transport.requests.lock().expect("requests lock").is_empty());
}

#[tokio::test]
async fn complete_propagates_transport_failures_unchanged() {
    let transport = Arc::new(
        FakeTransport::default()
            .with_messages_result(Err(ProviderError::not_found("model: nope"))),
    );
    let provider = AnthropicProvider::new(Arc::clone(&transport) as _, "sk-ant-api03-test")
        .expect("provider should build");

    let request = CompletionRequest::new(
        "claude-nope",
        vec![Message::new(Role::User, "hi")],
        1024,
    );
    let error = provider
        .complete(request)
        .await
        .err()
        .expect("failure should propagate");

    assert_eq!(error.status, Some(404));
    assert_eq!(error.error_type, Some(ErrorType::NotFound));
    assert_eq!(error.message, "model: nope");
}

#[tokio::test]
async fn list_models_maps_page_entries() {
    let page: ModelsPage = serde_json::from_value(serde_json::json!({
        "data": [
            {"id": "claude-3-5-haiku-20241022", "display_name": "Claude Haiku 3.5"},
            {"id": "claude-sonnet-4-20250514"}
        ],
        "has_more": false
    }))
    .expect("build page");

    let transport = Arc::new(FakeTransport::default().with_models_result(Ok(page)));
    let provider = AnthropicProvider::new(Arc::clone(&transport) as _, "sk-ant-api03-test")
        .expect("provider should build");

    let models = provider.list_models().await.expect("listing works");
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id, "claude-3-5-haiku-20241022");
    assert_eq!(models[0].display_name.as_deref(), Some("Claude Haiku 3.5"));
    assert_eq!(models[1].display_name, None);
}

#[test]
fn wire_usage_defaults_to_zero_counts() {
    let usage: WireUsage = serde_json::from_str("{}").expect("parse empty usage");
    assert_eq!(usage.input_tokens, 0);
    assert_eq!(usage.output_tokens, 0);
}
