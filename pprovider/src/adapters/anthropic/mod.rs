//! Anthropic provider over a wire-level transport seam.

mod wire;

use std::sync::Arc;

use reqwest::{Client, Response};

use crate::{
    ChatProvider, CompletionRequest, CompletionResponse, ModelInfo, ProviderError, ProviderFuture,
    Role,
};

pub use wire::{
    ContentBlock, MessagesRequest, MessagesResponse, ModelEntry, ModelsPage, WireMessage,
    WireUsage, extract_error,
};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Wire-level Anthropic calls, split out so provider behavior is testable
/// without a network.
pub trait AnthropicTransport: Send + Sync + std::fmt::Debug {
    fn get_models<'a>(
        &'a self,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<ModelsPage, ProviderError>>;

    fn post_messages<'a>(
        &'a self,
        request: MessagesRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<MessagesResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct AnthropicHttpTransport {
    client: Client,
    base_url: String,
}

impl AnthropicHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn apply_headers(&self, builder: reqwest::RequestBuilder, api_key: &str) -> reqwest::RequestBuilder {
        builder
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let (error_type, message) = extract_error(&body);
        let message =
            message.unwrap_or_else(|| format!("Anthropic request failed with status {status}"));

        ProviderError::new(Some(status), error_type, message)
    }

    fn map_send_error(error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout(error.to_string())
        } else {
            ProviderError::transport(error.to_string())
        }
    }
}

impl AnthropicTransport for AnthropicHttpTransport {
    fn get_models<'a>(
        &'a self,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<ModelsPage, ProviderError>> {
        Box::pin(async move {
            let url = self.endpoint("models");
            let builder = self.client.get(url);
            let response = self
                .apply_headers(builder, api_key)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            response
                .json::<ModelsPage>()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))
        })
    }

    fn post_messages<'a>(
        &'a self,
        request: MessagesRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<MessagesResponse, ProviderError>> {
        Box::pin(async move {
            let url = self.endpoint("messages");
            let builder = self.client.post(url).json(&request);
            let response = self
                .apply_headers(builder, api_key)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            response
                .json::<MessagesResponse>()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))
        })
    }
}

#[derive(Clone)]
pub struct AnthropicProvider {
    transport: Arc<dyn AnthropicTransport>,
    api_key: String,
}

impl AnthropicProvider {
    pub fn new(
        transport: Arc<dyn AnthropicTransport>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("sk-ant-") {
            return Err(ProviderError::authentication(
                "Anthropic API key must start with 'sk-ant-'",
            ));
        }

        Ok(Self { transport, api_key })
    }

    pub fn default_http_transport(client: Client) -> AnthropicHttpTransport {
        AnthropicHttpTransport::new(client)
    }

    fn build_request(request: CompletionRequest) -> MessagesRequest {
        let messages = request
            .messages
            .into_iter()
            .map(|message| WireMessage {
                role: match message.role {
                    Role::User => "user".to_string(),
                    Role::Assistant => "assistant".to_string(),
                },
                content: message.content,
            })
            .collect();

        MessagesRequest {
            model: request.model,
            max_tokens: request.max_tokens,
            system: request.system,
            messages,
        }
    }
}

impl ChatProvider for AnthropicProvider {
    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelInfo>, ProviderError>> {
        Box::pin(async move {
            let page = self.transport.get_models(&self.api_key).await?;
            Ok(page.data.into_iter().map(ModelInfo::from).collect())
        })
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<CompletionResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let wire_request = Self::build_request(request);
            let response = self
                .transport
                .post_messages(wire_request, &self.api_key)
                .await?;

            let (model, output, usage) = response.into_output();
            Ok(CompletionResponse {
                model,
                output,
                usage,
            })
        })
    }
}
