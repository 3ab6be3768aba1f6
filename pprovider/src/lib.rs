//! Provider contract, model catalog, and Anthropic adapter for the relay.

pub mod adapters;
mod catalog;
mod error;
mod model;
mod provider;

pub mod prelude {
    pub use crate::{
        CATALOG_TTL, CatalogSnapshot, ChatProvider, CompletionRequest, CompletionResponse,
        ErrorType, FALLBACK_MODEL_IDS, Message, ModelCandidate, ModelCatalog, ModelInfo,
        ModelTier, OutputItem, ProviderError, ProviderFuture, Role, TIER_COSTS, TierCosts,
        TokenUsage, fallback_candidates,
    };
}

pub use catalog::{
    CATALOG_TTL, CatalogSnapshot, FALLBACK_MODEL_IDS, ModelCandidate, ModelCatalog, ModelTier,
    TIER_COSTS, TierCosts, fallback_candidates,
};
pub use error::{ErrorType, ProviderError};
pub use model::{
    CompletionRequest, CompletionResponse, Message, ModelInfo, OutputItem, Role, TokenUsage,
};
pub use provider::{ChatProvider, ProviderFuture};
