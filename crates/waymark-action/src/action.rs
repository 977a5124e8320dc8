//! Navigation action facade
//!
//! Wraps a shared [`NavigationState`] plus an immutable map of per-type
//! handlers. Registering a handler returns a new action that layers it over
//! the existing ones; at most one handler is kept per item type, first
//! registration wins.
//!
//! Change observers on the engine run while it is write-locked and must not
//! call back into the action.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use waymark_state::{
    CodableNavigationItem, CodableRepresentation, ItemKey, NavigationItem, NavigationState,
};

use crate::perform::{NavigationOperation, NavigationPerform};
use crate::transformer::NavigationDestinationTransformer;
use crate::Result;

type Handler = Arc<dyn Fn(Box<dyn Any>) -> Option<NavigationOperation> + Send + Sync>;

#[derive(Clone)]
pub struct NavigationAction {
    state: Arc<RwLock<NavigationState>>,
    handlers: Arc<HashMap<TypeId, (ItemKey, Handler)>>,
}

impl NavigationAction {
    pub fn new(state: Arc<RwLock<NavigationState>>) -> Self {
        Self {
            state,
            handlers: Arc::new(HashMap::new()),
        }
    }

    pub fn from_state(state: NavigationState) -> Self {
        Self::new(Arc::new(RwLock::new(state)))
    }

    /// Shared engine handle.
    pub fn state(&self) -> &Arc<RwLock<NavigationState>> {
        &self.state
    }

    // ---- mutations ----

    pub fn append<I: NavigationItem>(&self, item: I) {
        match self.handler::<I>() {
            Some(handler) => {
                self.apply_replacement(handler(Box::new(NavigationPerform::Append(item))))
            }
            None => self.state.write().append(item),
        }
    }

    pub fn append_codable<I: CodableNavigationItem>(&self, item: I) {
        match self.handler::<I>() {
            Some(handler) => {
                self.apply_replacement(handler(Box::new(NavigationPerform::Append(item))))
            }
            None => self.state.write().append_codable(item),
        }
    }

    pub fn set_items<I: NavigationItem>(&self, items: Vec<I>) {
        match self.handler::<I>() {
            Some(handler) => {
                self.apply_replacement(handler(Box::new(NavigationPerform::SetItems(items))))
            }
            None => self.state.write().set_items(items),
        }
    }

    pub fn set_items_codable<I: CodableNavigationItem>(&self, items: Vec<I>) {
        match self.handler::<I>() {
            Some(handler) => {
                self.apply_replacement(handler(Box::new(NavigationPerform::SetItems(items))))
            }
            None => self.state.write().set_items_codable(items),
        }
    }

    /// Remove `item` and everything pushed after it.
    pub fn remove_including<I: NavigationItem>(&self, item: I) {
        match self.handler::<I>() {
            Some(handler) => self.apply_replacement(handler(Box::new(
                NavigationPerform::RemoveIncluding(item),
            ))),
            None => self.state.write().remove_including(&item),
        }
    }

    /// Remove everything pushed after `item`, keeping it on top.
    pub fn remove_until<I: NavigationItem>(&self, item: I) {
        match self.handler::<I>() {
            Some(handler) => {
                self.apply_replacement(handler(Box::new(NavigationPerform::RemoveUntil(item))))
            }
            None => self.state.write().remove_until(&item),
        }
    }

    /// Remove `item` wherever it sits, keeping the order of the rest.
    pub fn remove<I: NavigationItem>(&self, item: I) {
        match self.handler::<I>() {
            Some(handler) => {
                self.apply_replacement(handler(Box::new(NavigationPerform::Remove(item))))
            }
            None => self.state.write().remove(&item),
        }
    }

    pub fn remove_all(&self) {
        self.state.write().remove_all();
    }

    pub fn remove_last(&self) -> Result<()> {
        Ok(self.state.write().remove_last()?)
    }

    pub fn remove_last_n(&self, k: usize) -> Result<()> {
        Ok(self.state.write().remove_last_n(k)?)
    }

    // ---- queries ----

    pub fn count(&self) -> usize {
        self.state.read().count()
    }

    /// Hash-based membership of `item` itself.
    ///
    /// A handler for the item type still sees the lookup, but whatever it
    /// returns is discarded: the engine is never mutated and the answer always
    /// comes from the original item.
    pub fn contains<I: NavigationItem>(&self, item: &I) -> bool {
        if let Some(handler) = self.handler::<I>() {
            if let Some(operation) = handler(Box::new(NavigationPerform::Contains(item.clone()))) {
                tracing::debug!(kind = ?operation.kind(), "Ignoring replacement for contains");
            }
        }

        self.state.read().contains(item)
    }

    pub fn codable(&self) -> Option<CodableRepresentation> {
        self.state.read().codable()
    }

    // ---- pipeline ----

    /// Register a pure interceptor for items of type `I`.
    ///
    /// Returns `self` unchanged if `I` already has a handler.
    pub fn interceptor<I, F>(&self, interceptor: F) -> Self
    where
        I: NavigationItem,
        F: Fn(NavigationPerform<I>) -> Option<NavigationOperation> + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<I>();
        if self.handlers.contains_key(&type_id) {
            tracing::warn!(
                item_type = type_name::<I>(),
                "Resolver for item type already registered"
            );
            return self.clone();
        }

        let handler: Handler = Arc::new(move |perform: Box<dyn Any>| {
            match perform.downcast::<NavigationPerform<I>>() {
                Ok(perform) => interceptor(*perform),
                Err(_) => {
                    tracing::error!(
                        item_type = type_name::<I>(),
                        "Handler invoked with a foreign operation"
                    );
                    None
                }
            }
        });

        let mut handlers = (*self.handlers).clone();
        handlers.insert(type_id, (ItemKey::of::<I>(), handler));

        Self {
            state: Arc::clone(&self.state),
            handlers: Arc::new(handlers),
        }
    }

    /// Register a destination transformer for items of type `I`.
    ///
    /// `closure` receives a fresh [`NavigationDestinationTransformer`] bound
    /// to the intercepted operation, once per item (so once per source item
    /// for `set_items`). Whatever it sends becomes the replacement.
    pub fn resolver_for<I, F>(&self, closure: F) -> Self
    where
        I: NavigationItem,
        F: Fn(&NavigationDestinationTransformer, I) + Send + Sync + 'static,
    {
        self.interceptor::<I, _>(move |perform| {
            let transformer = NavigationDestinationTransformer::new(perform.kind());
            for item in perform.into_items() {
                closure(&transformer, item);
            }
            transformer.into_operation()
        })
    }

    pub fn has_handler<I: Any>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<I>())
    }

    /// Apply `operation` to the engine without consulting any handler.
    pub(crate) fn apply_direct(&self, operation: NavigationOperation) -> Option<bool> {
        operation.apply(&mut self.state.write())
    }

    fn handler<I: Any>(&self) -> Option<Handler> {
        self.handlers
            .get(&TypeId::of::<I>())
            .map(|(_, handler)| Arc::clone(handler))
    }

    fn apply_replacement(&self, replacement: Option<NavigationOperation>) {
        match replacement {
            Some(operation) => {
                tracing::debug!(kind = ?operation.kind(), "Applying intercepted operation");
                self.apply_direct(operation);
            }
            None => tracing::debug!("Navigation operation vetoed by handler"),
        }
    }
}

impl Default for NavigationAction {
    fn default() -> Self {
        Self::from_state(NavigationState::new())
    }
}

impl fmt::Debug for NavigationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationAction")
            .field("count", &self.count())
            .field(
                "handlers",
                &self
                    .handlers
                    .values()
                    .map(|(key, _)| key.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::perform::PerformKind;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum UserState {
        Model(u32),
        Loading,
    }

    fn ints(action: &NavigationAction) -> Vec<i32> {
        let state = action.state().read();
        (0..state.count())
            .filter_map(|i| state.path().downcast::<i32>(i))
            .collect()
    }

    #[test]
    fn test_default_operations() {
        let action = NavigationAction::default();

        action.set_items(vec![1, 2, 3]);
        assert_eq!(action.count(), 3);

        action.remove_until(2);
        assert_eq!(ints(&action), vec![1, 2]);

        action.append(3);
        action.remove(2);
        assert_eq!(ints(&action), vec![1, 3]);

        action.remove_including(1);
        assert_eq!(action.count(), 0);

        action.set_items(vec![1, 2, 3]);
        action.remove_last().unwrap();
        action.remove_last_n(1).unwrap();
        assert_eq!(ints(&action), vec![1]);
        assert!(action.remove_last_n(2).is_err());

        action.remove_all();
        assert_eq!(action.count(), 0);
    }

    #[test]
    fn test_veto_leaves_stack_unchanged() {
        let action = NavigationAction::default();
        action.append(1);

        let action = action.resolver_for::<String, _>(|_, _| {});
        action.append("ignored".to_string());

        assert_eq!(ints(&action), vec![1]);
    }

    #[test]
    fn test_substitution_string_to_int() {
        let action = NavigationAction::default().resolver_for::<String, _>(|transformer, item| {
            if let Ok(number) = item.parse::<i32>() {
                transformer.send(number);
            }
        });

        action.append("42".to_string());

        assert_eq!(ints(&action), vec![42]);
        assert!(action.state().read().path().downcast::<String>(0).is_none());
        assert!(action.state().read().contains(&42));
    }

    #[test]
    fn test_enum_state_to_model() {
        let action = NavigationAction::default().resolver_for::<UserState, _>(|transformer, scene| {
            match scene {
                UserState::Model(id) => transformer.send(id),
                UserState::Loading => {}
            }
        });

        action.append(UserState::Model(7));
        action.append(UserState::Loading);

        let state = action.state().read();
        assert_eq!(state.count(), 1);
        assert_eq!(state.path().downcast::<u32>(0), Some(7));
    }

    #[test]
    fn test_set_items_transforms_each_item() {
        let action = NavigationAction::default().resolver_for::<String, _>(|transformer, item| {
            transformer.send(item.len() as i32);
        });

        action.set_items(vec!["a".to_string(), "bbb".to_string()]);

        assert_eq!(ints(&action), vec![1, 3]);
    }

    #[test]
    fn test_removals_are_transformed() {
        let action = NavigationAction::default().resolver_for::<String, _>(|transformer, item| {
            if let Ok(number) = item.parse::<i32>() {
                transformer.send(number);
            }
        });
        action.set_items(vec![1, 2, 3, 4]);

        action.remove_until("3".to_string());
        assert_eq!(ints(&action), vec![1, 2, 3]);

        action.remove("2".to_string());
        assert_eq!(ints(&action), vec![1, 3]);

        action.remove_including("3".to_string());
        assert_eq!(ints(&action), vec![1]);
    }

    #[test]
    fn test_replacement_is_not_reintercepted() {
        let int_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&int_calls);

        let action = NavigationAction::default()
            .resolver_for::<i32, _>(move |transformer, item| {
                counter.fetch_add(1, Ordering::SeqCst);
                transformer.send(item);
            })
            .resolver_for::<String, _>(|transformer, item| {
                transformer.send(item.len() as i32);
            });

        action.append("abc".to_string());

        assert_eq!(ints(&action), vec![3]);
        assert_eq!(int_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_first_registered_handler_wins() {
        let action = NavigationAction::default()
            .resolver_for::<String, _>(|transformer, _| transformer.send(1))
            .resolver_for::<String, _>(|transformer, _| transformer.send(2));

        action.append("x".to_string());

        assert_eq!(ints(&action), vec![1]);
    }

    #[test]
    fn test_registration_does_not_touch_prior_action() {
        let base = NavigationAction::default();
        let layered = base.resolver_for::<String, _>(|_, _| {});

        assert!(!base.has_handler::<String>());
        assert!(layered.has_handler::<String>());

        // Both share the same engine
        base.append("kept".to_string());
        layered.append("vetoed".to_string());
        assert_eq!(layered.count(), 1);
    }

    #[test]
    fn test_contains_answers_from_original_item() {
        let action = NavigationAction::default().resolver_for::<String, _>(|transformer, item| {
            if let Ok(number) = item.parse::<i32>() {
                transformer.send(number);
            }
        });
        action.set_items(vec![1, 2, 3]);

        // The replacement 2_i32 is on the stack, the string "2" is not
        assert!(!action.contains(&"2".to_string()));
        assert!(!action.contains(&"two".to_string()));
        assert_eq!(action.count(), 3);

        action.state().write().append("2".to_string());
        assert!(action.contains(&"2".to_string()));
    }

    #[test]
    fn test_contains_never_mutates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let action = NavigationAction::default().interceptor::<u8, _>(move |perform| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(NavigationOperation::append(i32::from(perform.into_items()[0])))
        });

        assert!(!action.contains(&7_u8));
        assert_eq!(action.count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        action.state().write().append(7_u8);
        assert!(action.contains(&7_u8));
        assert_eq!(action.count(), 1);
    }

    #[test]
    fn test_pure_interceptor() {
        let action = NavigationAction::default().interceptor::<u8, _>(|perform| match perform {
            NavigationPerform::Append(item) => Some(NavigationOperation::append(i32::from(item))),
            other => {
                assert_eq!(other.kind(), PerformKind::Remove);
                None
            }
        });

        action.append(5_u8);
        action.remove(5_u8);

        assert_eq!(ints(&action), vec![5]);
    }

    #[test]
    fn test_codable_through_action() {
        let action = NavigationAction::default();
        action.append_codable(1);
        action.set_items_codable(vec!["a".to_string(), "b".to_string()]);

        let codable = action.codable().unwrap();
        assert_eq!(codable.hashes.len(), 2);

        let json = serde_json::to_string(&codable).unwrap();
        let decoded: CodableRepresentation = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.hashes, codable.hashes);
    }
}
