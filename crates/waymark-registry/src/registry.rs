//! Type-keyed registry
//!
//! First writer wins for a given owner lineage. A composing layer that is
//! re-evaluated registers again with the same [`Seed`] and keeps its slot;
//! an unrelated live owner is refused with a warning.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::seed::{Seed, WeakSeed};
use crate::Result;

/// A registered value plus the owner that installed it.
#[derive(Clone)]
struct Factory<V> {
    seed: WeakSeed,
    value: V,
}

#[derive(Clone)]
pub struct Registry<K, V> {
    table: HashMap<K, Factory<V>>,
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Register `value` for `key` on behalf of `seed`.
    ///
    /// Returns `false` when an entry owned by a different live seed already
    /// exists; the new value is dropped in that case.
    pub fn register(&mut self, value: V, key: K, seed: &Seed) -> bool {
        if let Some(existing) = self.table.get(&key) {
            if !existing.seed.is_expired() && !existing.seed.is(seed) {
                tracing::warn!(
                    key = ?key,
                    owner = ?existing.seed,
                    rejected = %seed,
                    "Registry keeps the first value already registered"
                );
                return false;
            }
        }

        self.table.insert(
            key,
            Factory {
                seed: seed.downgrade(),
                value,
            },
        );
        true
    }

    /// Look up the value registered for `key`.
    pub fn resolve(&self, key: &K) -> Result<&V> {
        self.table
            .get(key)
            .map(|factory| &factory.value)
            .ok_or_else(|| RegistryError::UnresolvedKey(format!("{:?}", key)))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    /// Owner currently holding `key`, if it is still alive.
    pub fn owner(&self, key: &K) -> Option<Seed> {
        self.table.get(key).and_then(|factory| factory.seed.upgrade())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<K, V> Default for Registry<K, V>
where
    K: Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Registry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.table.iter().map(|(k, factory)| (k, &factory.seed)))
            .finish()
    }
}

/// One composing layer's contribution to a registry.
///
/// Each evaluation of the layer merges into whatever registry the enclosing
/// layers already built, creating a fresh one only when there is none.
#[derive(Debug, Clone)]
pub struct RegistryLayer<K, V> {
    key: K,
    value: V,
    seed: Seed,
}

impl<K, V> RegistryLayer<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            seed: Seed::new(),
        }
    }

    /// Layer that registers with an externally owned seed.
    pub fn with_seed(key: K, value: V, seed: Seed) -> Self {
        Self { key, value, seed }
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn build(&self, existing: Option<&Registry<K, V>>) -> Registry<K, V> {
        let mut registry = existing.cloned().unwrap_or_default();
        registry.register(self.value.clone(), self.key.clone(), &self.seed);
        registry
    }
}

/// Shared handle over a [`Registry`]; clones observe the same table.
pub struct SharedRegistry<K, V> {
    inner: Arc<RwLock<Registry<K, V>>>,
}

impl<K, V> SharedRegistry<K, V>
where
    K: Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Registry::new())),
        }
    }

    pub fn register(&self, value: V, key: K, seed: &Seed) -> bool {
        self.inner.write().register(value, key, seed)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Run `f` against the resolved value while the table is read-locked.
    pub fn with_resolved<F, T>(&self, key: &K, f: F) -> Result<T>
    where
        F: FnOnce(&V) -> T,
    {
        let guard = self.inner.read();
        guard.resolve(key).map(f)
    }
}

impl<K, V> SharedRegistry<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: Clone,
{
    pub fn resolve(&self, key: &K) -> Result<V> {
        self.inner.read().resolve(key).cloned()
    }
}

impl<K, V> Default for SharedRegistry<K, V>
where
    K: Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for SharedRegistry<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
