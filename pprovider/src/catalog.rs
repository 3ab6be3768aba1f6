//! Candidate model discovery with tier ordering and a TTL-cached snapshot.
//!
//! ```rust
//! use pprovider::{ModelCandidate, ModelTier};
//!
//! let candidate = ModelCandidate::new("claude-3-5-haiku-20241022");
//! assert_eq!(candidate.tier, ModelTier::Haiku);
//! ```

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::{ChatProvider, ModelInfo};

/// Cached listings are considered stale after one hour.
pub const CATALOG_TTL: Duration = Duration::from_secs(3600);

const FAMILY_MARKER: &str = "claude";
const EMBEDDING_MARKER: &str = "embed";

/// Known-good ids used when the provider listing cannot be fetched,
/// cheapest first.
pub const FALLBACK_MODEL_IDS: [&str; 4] = [
    "claude-3-5-haiku-20241022",
    "claude-3-haiku-20240307",
    "claude-3-5-sonnet-20241022",
    "claude-sonnet-4-20250514",
];

/// Cost class inferred from a model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    Haiku,
    Sonnet,
    Opus,
    Unknown,
}

impl ModelTier {
    pub fn of(id: &str) -> Self {
        if id.contains("haiku") {
            Self::Haiku
        } else if id.contains("sonnet") {
            Self::Sonnet
        } else if id.contains("opus") {
            Self::Opus
        } else {
            Self::Unknown
        }
    }

    /// Sort bucket: haiku before sonnet before everything else. Opus and
    /// unrecognized ids share the expensive bucket.
    fn rank(self) -> u8 {
        match self {
            Self::Haiku => 0,
            Self::Sonnet => 1,
            Self::Opus | Self::Unknown => 2,
        }
    }
}

/// Per-million-token price strings surfaced by the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCosts {
    pub haiku: &'static str,
    pub sonnet: &'static str,
    pub opus: &'static str,
}

pub const TIER_COSTS: TierCosts = TierCosts {
    haiku: "$0.25 per million input tokens, $1.25 per million output tokens",
    sonnet: "$3 per million input tokens, $15 per million output tokens",
    opus: "$15 per million input tokens, $75 per million output tokens",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub id: String,
    pub tier: ModelTier,
}

impl ModelCandidate {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let tier = ModelTier::of(&id);
        Self { id, tier }
    }
}

/// Immutable catalog value swapped atomically on refresh.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub entries: Vec<ModelCandidate>,
    pub fetched_at: Instant,
}

/// Process-wide catalog of usable model ids.
///
/// `list` never fails: a fetch error yields the static fallback list and
/// leaves any previously cached snapshot untouched. Concurrent refreshes
/// race benignly; both writers compute equivalent snapshots from the same
/// upstream listing, so the last whole-value write wins.
pub struct ModelCatalog {
    provider: Arc<dyn ChatProvider>,
    ttl: Duration,
    cache: Mutex<Option<Arc<CatalogSnapshot>>>,
}

impl ModelCatalog {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            ttl: CATALOG_TTL,
            cache: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Ordered candidate ids, cheapest tier first. Never empty.
    pub async fn list(&self) -> Vec<ModelCandidate> {
        if let Some(snapshot) = self.fresh_snapshot() {
            return snapshot.entries.clone();
        }

        let models = match self.provider.list_models().await {
            Ok(models) => models,
            Err(error) => {
                tracing::warn!(
                    event = "catalog_fetch_failed",
                    error = %error,
                    "falling back to static model list"
                );
                return fallback_candidates();
            }
        };

        let entries = order_candidates(models);
        if entries.is_empty() {
            tracing::warn!(
                event = "catalog_listing_empty",
                "provider listing had no chat-capable models, using fallback"
            );
            return fallback_candidates();
        }

        tracing::info!(event = "catalog_refreshed", total = entries.len());
        let snapshot = Arc::new(CatalogSnapshot {
            entries,
            fetched_at: Instant::now(),
        });
        *self.lock_cache() = Some(Arc::clone(&snapshot));
        snapshot.entries.clone()
    }

    /// Cheapest usable candidate, the first entry of `list`.
    pub async fn recommended(&self) -> ModelCandidate {
        self.list()
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| ModelCandidate::new(FALLBACK_MODEL_IDS[0]))
    }

    fn fresh_snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        let cache = self.lock_cache();
        let snapshot = cache.as_ref()?;
        if snapshot.fetched_at.elapsed() < self.ttl {
            Some(Arc::clone(snapshot))
        } else {
            None
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, Option<Arc<CatalogSnapshot>>> {
        // Writes are whole-value swaps, so a poisoned guard still holds a
        // coherent snapshot.
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn fallback_candidates() -> Vec<ModelCandidate> {
    FALLBACK_MODEL_IDS
        .into_iter()
        .map(ModelCandidate::new)
        .collect()
}

fn is_chat_capable(id: &str) -> bool {
    id.contains(FAMILY_MARKER) && !id.contains(EMBEDDING_MARKER)
}

fn order_candidates(models: Vec<ModelInfo>) -> Vec<ModelCandidate> {
    let mut entries = models
        .into_iter()
        .filter(|model| is_chat_capable(&model.id))
        .map(|model| ModelCandidate::new(model.id))
        .collect::<Vec<_>>();

    entries.sort_by(compare_candidates);
    entries
}

fn compare_candidates(a: &ModelCandidate, b: &ModelCandidate) -> Ordering {
    a.tier
        .rank()
        .cmp(&b.tier.rank())
        // Descending on the raw id favors date-suffixed newer releases.
        .then_with(|| b.id.cmp(&a.id))
}
