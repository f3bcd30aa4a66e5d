//! Process-wide model cache.
//!
//! Loading a checkpoint is by far the slowest step of an analysis, so pipelines built
//! with the same options share one loaded model. Models are cheap to clone (their
//! tensors are reference counted) and are never mutated after loading.

use crate::core::{AnalyzerError, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Trait implemented by model option types to generate a stable cache key.
pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

type CacheStorage = HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>;

/// A thread-safe cache for model instances, keyed by model type and option key.
pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn storage(&self) -> Result<MutexGuard<'_, CacheStorage>> {
        self.cache
            .lock()
            .map_err(|_| AnalyzerError::Cache("lock poisoned".into()))
    }

    /// Get or create a model from the cache.
    ///
    /// If a model with the given key already exists, a clone is returned.
    /// Otherwise `loader` is called and its result stored. The lock is not held while
    /// loading, so a failed load leaves the cache untouched.
    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<M>
    where
        M: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        if let Some(model) = self
            .storage()?
            .get(&cache_key)
            .and_then(|cached| cached.downcast_ref::<M>())
        {
            tracing::debug!(key, "model cache hit");
            return Ok(model.clone());
        }

        tracing::debug!(key, "model cache miss, loading");
        let model = loader()?;

        self.storage()?.insert(
            cache_key,
            Arc::new(model.clone()) as Arc<dyn Any + Send + Sync>,
        );

        Ok(model)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage()?.clear();
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.storage()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.storage()?.is_empty())
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

/// Get a reference to the global model cache.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}
