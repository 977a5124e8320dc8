//! Identity tokens
//!
//! A [`Seed`] has no behavior beyond identity: two seeds are equal iff they
//! are the same instance (clones share the instance). Registries hold a
//! [`WeakSeed`] so ownership lapses once every strong handle is dropped.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use uuid::Uuid;

#[derive(Debug)]
struct SeedInner {
    /// Only used for diagnostics; identity is the allocation itself.
    id: Uuid,
}

#[derive(Clone)]
pub struct Seed {
    inner: Arc<SeedInner>,
}

impl Seed {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SeedInner { id: Uuid::new_v4() }),
        }
    }

    /// Non-owning handle to this seed.
    pub fn downgrade(&self) -> WeakSeed {
        WeakSeed {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Seed {}

impl Hash for Seed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.inner) as usize).hash(state);
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Seed").field(&self.inner.id).finish()
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.id)
    }
}

/// Expiring reference to a [`Seed`].
#[derive(Clone, Default)]
pub struct WeakSeed {
    inner: Weak<SeedInner>,
}

impl WeakSeed {
    /// Returns the seed if it is still alive.
    pub fn upgrade(&self) -> Option<Seed> {
        self.inner.upgrade().map(|inner| Seed { inner })
    }

    pub fn is_expired(&self) -> bool {
        self.inner.strong_count() == 0
    }

    /// True when `seed` is the live instance this handle points at.
    pub fn is(&self, seed: &Seed) -> bool {
        std::ptr::eq(self.inner.as_ptr(), Arc::as_ptr(&seed.inner))
    }
}

impl fmt::Debug for WeakSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(seed) => f.debug_tuple("WeakSeed").field(&seed.id()).finish(),
            None => f.write_str("WeakSeed(<expired>)"),
        }
    }
}
