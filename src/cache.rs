//! Memoization of built descriptors.
//!
//! Descriptors are keyed by model name, optionality and the schema's
//! [fingerprint](crate::Schema::fingerprint), so structurally equal schemas
//! share one descriptor no matter where they came from.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::ConversionError;
use crate::model::{ModelBuilder, Optionality, TypeDescriptor};
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    model: String,
    optionality: Optionality,
    fingerprint: String,
}

type DescriptorMap = Arc<RwLock<HashMap<CacheKey, Arc<TypeDescriptor>>>>;

/// A thread-safe descriptor cache.
///
/// Cloning the cache shares the underlying storage. Lookups take a read
/// lock; a miss builds outside any lock and then inserts, so two threads
/// racing on the same schema may both build, and the first insert wins.
/// Since building is deterministic the loser's work is simply discarded.
///
/// # Example
///
/// ```rust
/// use hflav_fair::{infer, DescriptorCache, ModelBuilder};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let cache = DescriptorCache::new();
/// let builder = ModelBuilder::new();
/// let schema = infer(&json!({"title": "x"})).unwrap();
///
/// let first = cache.get_or_build(&builder, &schema, "Model").unwrap();
/// let second = cache.get_or_build(&builder, &schema, "Model").unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct DescriptorCache {
    descriptors: DescriptorMap,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached descriptor for `schema`, building it on a miss.
    pub fn get_or_build(
        &self,
        builder: &ModelBuilder,
        schema: &Schema,
        name: &str,
    ) -> Result<Arc<TypeDescriptor>, ConversionError> {
        let key = CacheKey {
            model: name.to_string(),
            optionality: builder.current_optionality(),
            fingerprint: schema.fingerprint(),
        };

        if let Some(hit) = self.descriptors.read().get(&key) {
            debug!(model = name, fingerprint = %key.fingerprint, "descriptor cache hit");
            return Ok(Arc::clone(hit));
        }

        let built = builder.build(schema, name)?;
        let mut descriptors = self.descriptors.write();
        let stored = Arc::clone(descriptors.entry(key).or_insert(built));
        trace!(model = name, cached = descriptors.len(), "descriptor cached");
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    pub fn clear(&self) {
        self.descriptors.write().clear();
    }
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("len", &self.len())
            .finish()
    }
}
