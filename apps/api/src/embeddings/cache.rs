use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{EmbeddingError, EmbeddingProvider, EmbeddingVector};

type CacheKey = (String, String);

/// Bounded LRU cache keyed by `(model, text)` in front of another provider.
///
/// A hit refreshes the entry, so a job description scored against many
/// resumes stays resident. Failures are never cached. The lock is released
/// before the inner provider is awaited, so concurrent misses for the same
/// text may both encode.
pub struct CachedEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<CacheKey, EmbeddingVector>>,
}

impl CachedEmbeddingProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[cfg(test)]
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn lookup(&self, key: &CacheKey) -> Option<EmbeddingVector> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    fn store(&self, key: CacheKey, vector: EmbeddingVector) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, vector);
        }
    }
}

#[async_trait]
impl EmbeddingProvider for CachedEmbeddingProvider {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn encode(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let key = (self.inner.model_id().to_string(), text.to_string());
        if let Some(hit) = self.lookup(&key) {
            debug!("Embedding cache hit ({} chars)", text.len());
            return Ok(hit);
        }

        let vector = self.inner.encode(text).await?;
        self.store(key, vector.clone());
        Ok(vector)
    }
}
