//! One-shot destination transformer
//!
//! Handed to an interception closure together with the intercepted item.
//! The closure calls it with whatever item should be used instead; for a
//! batch (`SetItems`) it may be called once per source item and the calls
//! accumulate in order. Not calling it at all vetoes the operation.

use parking_lot::Mutex;

use waymark_state::{item_hash, CodableNavigationItem, ItemHash, NavigationItem, PathEntry};

use crate::action::NavigationAction;
use crate::perform::{NavigationOperation, PerformKind};

#[derive(Debug)]
pub struct NavigationDestinationTransformer {
    kind: PerformKind,
    pending: Mutex<Option<NavigationOperation>>,
}

impl NavigationDestinationTransformer {
    pub fn new(kind: PerformKind) -> Self {
        Self {
            kind,
            pending: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> PerformKind {
        self.kind
    }

    /// Use `item` as the destination.
    pub fn send<I: NavigationItem>(&self, item: I) {
        let hash = item_hash(&item);
        self.record(hash, || PathEntry::live(item));
    }

    /// Use `item` as the destination, keeping it codable.
    pub fn send_codable<I: CodableNavigationItem>(&self, item: I) {
        let hash = item_hash(&item);
        self.record(hash, || PathEntry::live_codable(item));
    }

    /// Replacement operation built so far, or `None` when nothing was sent.
    pub fn into_operation(self) -> Option<NavigationOperation> {
        self.pending.into_inner()
    }

    /// Apply the replacement straight to `action`'s engine, skipping its
    /// pipeline. Returns the lookup answer for a `Contains` transformer.
    pub fn perform(self, action: &NavigationAction) -> Option<bool> {
        let operation = self.into_operation()?;
        action.apply_direct(operation)
    }

    fn record<F>(&self, hash: ItemHash, entry: F)
    where
        F: FnOnce() -> PathEntry,
    {
        let mut pending = self.pending.lock();
        let operation = match self.kind {
            PerformKind::SetItems => {
                let mut items = match pending.take() {
                    Some(NavigationOperation::SetItems(items)) => items,
                    _ => Vec::new(),
                };
                items.push((hash, entry()));
                NavigationOperation::SetItems(items)
            }
            PerformKind::Append => NavigationOperation::Append {
                hash,
                entry: entry(),
            },
            PerformKind::RemoveUntil => NavigationOperation::RemoveUntil(hash),
            PerformKind::RemoveIncluding => NavigationOperation::RemoveIncluding(hash),
            PerformKind::Remove => NavigationOperation::Remove(hash),
            PerformKind::Contains => NavigationOperation::Contains(hash),
        };
        *pending = Some(operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct NotCodable<T>(T);

    fn stack<I: NavigationItem>(action: &NavigationAction) -> Vec<I> {
        let state = action.state().read();
        (0..state.count())
            .filter_map(|i| state.path().downcast::<I>(i))
            .collect()
    }

    #[test]
    fn test_append_codable() {
        let action = NavigationAction::default();
        let sut = NavigationDestinationTransformer::new(PerformKind::Append);

        sut.send_codable("Hello World".to_string());
        sut.perform(&action);

        assert_eq!(stack::<String>(&action), vec!["Hello World".to_string()]);
        assert!(action.codable().is_some());
    }

    #[test]
    fn test_append_not_codable() {
        let action = NavigationAction::default();
        let sut = NavigationDestinationTransformer::new(PerformKind::Append);

        sut.send(NotCodable("Hello World"));
        sut.perform(&action);

        assert_eq!(
            stack::<NotCodable<&str>>(&action),
            vec![NotCodable("Hello World")]
        );
        assert!(action.codable().is_none());
    }

    #[test]
    fn test_append_last_call_wins() {
        let action = NavigationAction::default();
        let sut = NavigationDestinationTransformer::new(PerformKind::Append);

        sut.send(1);
        sut.send(2);
        sut.perform(&action);

        assert_eq!(stack::<i32>(&action), vec![2]);
    }

    #[test]
    fn test_set_items_replaces_stack() {
        let action = NavigationAction::default();
        let sut = NavigationDestinationTransformer::new(PerformKind::SetItems);

        action.append(1);
        sut.send("Hello World");
        sut.perform(&action);

        assert_eq!(action.count(), 1);
        assert_eq!(stack::<&str>(&action), vec!["Hello World"]);
    }

    #[test]
    fn test_set_items_accumulates() {
        let action = NavigationAction::default();
        let sut = NavigationDestinationTransformer::new(PerformKind::SetItems);

        for item in [1, 2, 3] {
            sut.send(item * 10);
        }
        sut.perform(&action);

        assert_eq!(stack::<i32>(&action), vec![10, 20, 30]);
    }

    #[test]
    fn test_remove_item() {
        let action = NavigationAction::default();
        let sut = NavigationDestinationTransformer::new(PerformKind::Remove);

        action.append(NotCodable(1));
        sut.send(NotCodable(1));
        sut.perform(&action);

        assert_eq!(action.count(), 0);
    }

    #[test]
    fn test_remove_until() {
        let action = NavigationAction::default();
        let sut = NavigationDestinationTransformer::new(PerformKind::RemoveUntil);

        action.set_items(vec![1, 2, 3]);
        sut.send(2);
        sut.perform(&action);

        assert_eq!(stack::<i32>(&action), vec![1, 2]);
    }

    #[test]
    fn test_remove_including() {
        let action = NavigationAction::default();
        let sut = NavigationDestinationTransformer::new(PerformKind::RemoveIncluding);

        action.set_items(vec![1, 2, 3]);
        sut.send(2);
        sut.perform(&action);

        assert_eq!(stack::<i32>(&action), vec![1]);
    }

    #[test]
    fn test_contains_does_not_mutate() {
        let action = NavigationAction::default();
        action.set_items(vec![1, 2, 3]);

        let hit = NavigationDestinationTransformer::new(PerformKind::Contains);
        hit.send(2);
        assert_eq!(hit.perform(&action), Some(true));

        let miss = NavigationDestinationTransformer::new(PerformKind::Contains);
        miss.send(0);
        assert_eq!(miss.perform(&action), Some(false));

        assert_eq!(action.count(), 3);
    }

    #[test]
    fn test_nothing_sent_is_noop() {
        let action = NavigationAction::default();
        action.set_items(vec![1, 2]);

        let sut = NavigationDestinationTransformer::new(PerformKind::Append);
        assert!(sut.perform(&action).is_none());
        assert_eq!(action.count(), 2);
    }
}
