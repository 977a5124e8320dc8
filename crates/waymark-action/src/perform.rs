//! Tagged navigation operations
//!
//! [`NavigationPerform`] is what an interceptor receives: the original
//! operation with its concrete item type. [`NavigationOperation`] is what it
//! may hand back: a replacement whose items are already erased, so it can
//! target a different item type.

use waymark_state::{
    item_hash, CodableNavigationItem, ItemHash, NavigationItem, NavigationState, PathEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformKind {
    Append,
    SetItems,
    RemoveUntil,
    RemoveIncluding,
    Remove,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavigationPerform<I> {
    SetItems(Vec<I>),
    RemoveIncluding(I),
    RemoveUntil(I),
    Append(I),
    Remove(I),
    Contains(I),
}

impl<I> NavigationPerform<I> {
    pub fn kind(&self) -> PerformKind {
        match self {
            Self::SetItems(_) => PerformKind::SetItems,
            Self::RemoveIncluding(_) => PerformKind::RemoveIncluding,
            Self::RemoveUntil(_) => PerformKind::RemoveUntil,
            Self::Append(_) => PerformKind::Append,
            Self::Remove(_) => PerformKind::Remove,
            Self::Contains(_) => PerformKind::Contains,
        }
    }

    /// The items carried, in order.
    pub fn into_items(self) -> Vec<I> {
        match self {
            Self::SetItems(items) => items,
            Self::RemoveIncluding(item)
            | Self::RemoveUntil(item)
            | Self::Append(item)
            | Self::Remove(item)
            | Self::Contains(item) => vec![item],
        }
    }
}

#[derive(Debug, Clone)]
pub enum NavigationOperation {
    Append { hash: ItemHash, entry: PathEntry },
    SetItems(Vec<(ItemHash, PathEntry)>),
    RemoveUntil(ItemHash),
    RemoveIncluding(ItemHash),
    Remove(ItemHash),
    Contains(ItemHash),
}

impl NavigationOperation {
    pub fn append<I: NavigationItem>(item: I) -> Self {
        Self::Append {
            hash: item_hash(&item),
            entry: PathEntry::live(item),
        }
    }

    pub fn append_codable<I: CodableNavigationItem>(item: I) -> Self {
        Self::Append {
            hash: item_hash(&item),
            entry: PathEntry::live_codable(item),
        }
    }

    pub fn set_items<I: NavigationItem>(items: Vec<I>) -> Self {
        Self::SetItems(
            items
                .into_iter()
                .map(|item| (item_hash(&item), PathEntry::live(item)))
                .collect(),
        )
    }

    pub fn set_items_codable<I: CodableNavigationItem>(items: Vec<I>) -> Self {
        Self::SetItems(
            items
                .into_iter()
                .map(|item| (item_hash(&item), PathEntry::live_codable(item)))
                .collect(),
        )
    }

    pub fn remove_until<I: NavigationItem>(item: &I) -> Self {
        Self::RemoveUntil(item_hash(item))
    }

    pub fn remove_including<I: NavigationItem>(item: &I) -> Self {
        Self::RemoveIncluding(item_hash(item))
    }

    pub fn remove<I: NavigationItem>(item: &I) -> Self {
        Self::Remove(item_hash(item))
    }

    pub fn contains<I: NavigationItem>(item: &I) -> Self {
        Self::Contains(item_hash(item))
    }

    pub fn kind(&self) -> PerformKind {
        match self {
            Self::Append { .. } => PerformKind::Append,
            Self::SetItems(_) => PerformKind::SetItems,
            Self::RemoveUntil(_) => PerformKind::RemoveUntil,
            Self::RemoveIncluding(_) => PerformKind::RemoveIncluding,
            Self::Remove(_) => PerformKind::Remove,
            Self::Contains(_) => PerformKind::Contains,
        }
    }

    /// Apply to the engine. Only `Contains` produces an answer.
    pub(crate) fn apply(self, state: &mut NavigationState) -> Option<bool> {
        match self {
            Self::Append { hash, entry } => state.append_entry(hash, entry),
            Self::SetItems(entries) => state.set_entries(entries),
            Self::RemoveUntil(hash) => state.remove_until_hash(hash),
            Self::RemoveIncluding(hash) => state.remove_including_hash(hash),
            Self::Remove(hash) => state.remove_hash(hash),
            Self::Contains(hash) => return Some(state.contains_hash(hash)),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perform_kind_and_items() {
        let perform = NavigationPerform::SetItems(vec![1, 2]);
        assert_eq!(perform.kind(), PerformKind::SetItems);
        assert_eq!(perform.into_items(), vec![1, 2]);

        let perform = NavigationPerform::Remove("a");
        assert_eq!(perform.kind(), PerformKind::Remove);
        assert_eq!(perform.into_items(), vec!["a"]);
    }

    #[test]
    fn test_operation_apply() {
        let mut state = NavigationState::new();

        NavigationOperation::set_items(vec![1, 2, 3]).apply(&mut state);
        assert_eq!(state.count(), 3);

        assert_eq!(
            NavigationOperation::contains(&2).apply(&mut state),
            Some(true)
        );

        NavigationOperation::remove(&2).apply(&mut state);
        assert_eq!(state.count(), 2);
        assert_eq!(
            NavigationOperation::contains(&2).apply(&mut state),
            Some(false)
        );

        NavigationOperation::append_codable("x".to_string()).apply(&mut state);
        NavigationOperation::remove_until(&1).apply(&mut state);
        assert_eq!(state.count(), 1);

        NavigationOperation::remove_including(&1).apply(&mut state);
        assert_eq!(state.count(), 0);
    }
}
