//! Item envelope
//!
//! Wraps a heterogeneous stack item with a key derived from its concrete
//! type. Hash and equality both include the key, so `1_i32` and `1_i64`
//! never collide.

use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Identity hash of a stack item.
pub type ItemHash = u64;

/// Anything that can be pushed onto a navigation stack.
pub trait NavigationItem: Any + Clone + Eq + Hash + fmt::Debug + Send + Sync {}

impl<T> NavigationItem for T where T: Any + Clone + Eq + Hash + fmt::Debug + Send + Sync {}

/// Stack item that can also take part in a snapshot.
pub trait CodableNavigationItem: NavigationItem + Serialize + DeserializeOwned {}

impl<T> CodableNavigationItem for T where T: NavigationItem + Serialize + DeserializeOwned {}

/// Stable per-type key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey {
    id: TypeId,
    name: &'static str,
}

impl ItemKey {
    pub fn of<I: Any>() -> Self {
        Self {
            id: TypeId::of::<I>(),
            name: type_name::<I>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Hash of `item` combined with its type name.
///
/// Uses a zero-keyed hasher so the value is the same for every process
/// running the same build; snapshot hash indexes rely on that.
pub fn item_hash<I: NavigationItem>(item: &I) -> ItemHash {
    let mut hasher = DefaultHasher::new();
    type_name::<I>().hash(&mut hasher);
    item.hash(&mut hasher);
    hasher.finish()
}

trait ErasedItem: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_erased(&self, other: &dyn Any) -> bool;
}

impl<T: NavigationItem> ErasedItem for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_erased(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }
}

#[derive(Clone)]
pub struct ItemEnvelope {
    key: ItemKey,
    hash: ItemHash,
    value: Arc<dyn ErasedItem>,
}

impl ItemEnvelope {
    pub fn wrap<I: NavigationItem>(item: I) -> Self {
        Self {
            key: ItemKey::of::<I>(),
            hash: item_hash(&item),
            value: Arc::new(item),
        }
    }

    pub fn key(&self) -> ItemKey {
        self.key
    }

    pub fn hash_value(&self) -> ItemHash {
        self.hash
    }

    pub fn is<I: Any>(&self) -> bool {
        self.key.id == TypeId::of::<I>()
    }

    pub fn downcast_ref<I: Any>(&self) -> Option<&I> {
        self.value.as_any().downcast_ref::<I>()
    }
}

impl PartialEq for ItemEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value.eq_erased(other.value.as_any())
    }
}

impl Eq for ItemEnvelope {}

impl Hash for ItemEnvelope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for ItemEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemEnvelope")
            .field("key", &self.key.name)
            .field("value", &self.value)
            .finish()
    }
}
