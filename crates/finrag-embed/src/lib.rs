use anyhow::Result;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{info, warn};
use twox_hash::XxHash64;

use finrag_core::config::Config;
use finrag_core::normalize::normalize;
use finrag_core::traits::EmbeddingProvider;
use finrag_core::types::ProviderInfo;

pub const DEFAULT_DIMENSION: usize = 384;

/// Deterministic hash-bucket embedder. Each normalized token is hashed
/// into one of `dimension` buckets with a position-dependent nudge, then
/// the vector is L2 normalized. Texts with no tokens come out as the
/// zero vector, which downstream search treats as "matches nothing".
///
/// Not semantically meaningful, but stable across runs, which makes it
/// good enough for offline development and the fallback when a real
/// model backend is unavailable.
pub struct HashEmbedder {
    dimension: usize,
    label: String,
    degraded: bool,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, label: "hash".to_string(), degraded: false }
    }

    fn fallback_for(requested: &str, dimension: usize) -> Self {
        Self {
            dimension,
            label: format!("hash (fallback for {requested})"),
            degraded: true,
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dimension];
        let normalized = normalize(text);
        for (i, token) in normalized.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dimension;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: self.label.clone(),
            dimension: self.dimension,
            degraded: self.degraded,
        }
    }
}

/// Build the provider a name refers to. Anything other than `hash` is a
/// model backend this build cannot serve, so it degrades to the hash
/// embedder and says so both in the log and in `info().degraded`.
pub fn provider_for(requested: &str, dimension: usize) -> Arc<dyn EmbeddingProvider> {
    match requested {
        "hash" => Arc::new(HashEmbedder::new(dimension)),
        other => {
            warn!("embedding backend '{}' unavailable, falling back to hash embedder", other);
            Arc::new(HashEmbedder::fallback_for(other, dimension))
        }
    }
}

/// Provider selected by `embedding.provider` / `embedding.dimension`.
pub fn provider_from_config(config: &Config) -> Arc<dyn EmbeddingProvider> {
    let requested: String = config.get_or("embedding.provider", "hash".to_string());
    let dimension: usize = config.get_or("embedding.dimension", DEFAULT_DIMENSION);
    let provider = provider_for(&requested, dimension);
    let info = provider.info();
    info!("embedding provider: {} (dimension {})", info.name, info.dimension);
    provider
}
