//! Stable provider construction surface for facade consumers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::{AnthropicProvider, ChatProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct ProviderBuildConfig {
    pub api_key: String,
    pub timeout: Duration,
    pub base_url: Option<String>,
}

impl ProviderBuildConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            timeout: Duration::from_secs(90),
            base_url: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

pub fn build_provider_from_api_key(
    api_key: impl Into<String>,
) -> Result<Arc<dyn ChatProvider>, ProviderError> {
    build_provider_with_config(ProviderBuildConfig::new(api_key))
}

pub fn build_provider_with_config(
    config: ProviderBuildConfig,
) -> Result<Arc<dyn ChatProvider>, ProviderError> {
    let api_key = config.api_key.trim().to_string();
    if api_key.is_empty() {
        return Err(ProviderError::authentication(
            "provider API key must not be empty",
        ));
    }

    let http = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    let mut transport = AnthropicProvider::default_http_transport(http);
    if let Some(base_url) = config.base_url {
        transport = transport.with_base_url(base_url);
    }

    let provider = AnthropicProvider::new(Arc::new(transport), api_key)?;
    Ok(Arc::new(provider))
}
