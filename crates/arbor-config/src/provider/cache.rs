//! Memoized secret values.

use std::sync::Arc;

use dashmap::DashMap;

use crate::value::Value;

/// Identifies one fetched secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretCacheKey {
    /// Store the bundle came from.
    pub store: String,
    /// Key within the bundle.
    pub key: String,
    /// Credential profile active at fetch time.
    pub profile: Option<String>,
}

impl SecretCacheKey {
    /// Build a key.
    #[must_use]
    pub fn new(store: &str, key: &str, profile: Option<&str>) -> Self {
        Self {
            store: store.to_owned(),
            key: key.to_owned(),
            profile: profile.map(str::to_owned),
        }
    }
}

/// Shared cache of tagged secret values.
///
/// Clones share storage. Entries are only added or cleared as a whole;
/// racing inserts for the same key store equal values.
#[derive(Debug, Clone, Default)]
pub struct SecretCache {
    entries: Arc<DashMap<SecretCacheKey, Value>>,
}

impl SecretCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cached value.
    #[must_use]
    pub fn get(&self, key: &SecretCacheKey) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Remember a value.
    pub fn insert(&self, key: SecretCacheKey, value: Value) {
        self.entries.insert(key, value);
    }

    /// Number of cached values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
