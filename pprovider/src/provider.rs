use pcommon::BoxFuture;

use crate::{CompletionRequest, CompletionResponse, ModelInfo, ProviderError};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

pub trait ChatProvider: Send + Sync {
    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelInfo>, ProviderError>>;

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<CompletionResponse, ProviderError>>;
}
