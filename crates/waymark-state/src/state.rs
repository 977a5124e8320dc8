//! Navigation Stack State Engine
//!
//! State is the triple (Ordered Path, Hash Index, Restore Table):
//! ```text
//! path:    [ a ][ b ][ c ]
//! hashes:  [ha][hb][hc]      always the same length as path
//! restore: { ha: push a, hb: push b, hc: push c }
//! ```
//! Suffix removals cut both sequences directly. Removing a non-top item
//! drops its hash and rebuilds the path by replaying the restore procedures
//! of every remaining hash, with change notifications held back until the
//! rebuild is complete.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::item::{item_hash, CodableNavigationItem, ItemHash, NavigationItem};
use crate::path::{NavigationPath, PathEntry};
use crate::snapshot::{CodableRepresentation, PendingNavigationItems};
use crate::Result;

/// Re-push procedure capturing one concrete item.
type RestoreFn = Arc<dyn Fn() -> PathEntry + Send + Sync>;

type Observer = Box<dyn Fn(&StateChange) + Send + Sync>;

/// What `remove_last_n` does when asked for more items than the stack holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnderflowPolicy {
    /// Reject with [`StateError::Underflow`] and leave the stack untouched
    #[default]
    Raise,
    /// Remove everything that is there
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateOptions {
    pub underflow_policy: UnderflowPolicy,
    /// Clear restore entries for hashes that drop out during `set_items`.
    /// Off by default: stale entries are only overwritten if the hash recurs.
    pub prune_restore_on_set_items: bool,
}

/// Presentation directive attached to a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transaction {
    pub disables_animations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Append,
    SetItems,
    RemoveIncluding,
    RemoveUntil,
    Remove,
    RemoveAll,
    RemoveLast,
    Truncate,
    PendingItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub kind: ChangeKind,
    pub count: usize,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct NavigationState {
    path: NavigationPath,
    hashes: Vec<ItemHash>,
    restore: HashMap<ItemHash, RestoreFn>,
    /// Hash index of the last pending snapshot applied, if any.
    last_pending: Option<Vec<ItemHash>>,
    /// Set while `remove` replays; suppresses notifications.
    is_locked: bool,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    options: StateOptions,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::with_options(StateOptions::default())
    }

    pub fn with_options(options: StateOptions) -> Self {
        Self {
            path: NavigationPath::new(),
            hashes: Vec::new(),
            restore: HashMap::new(),
            last_pending: None,
            is_locked: false,
            observers: Vec::new(),
            next_subscription: 0,
            options,
        }
    }

    /// Engine seeded from an optional snapshot. `None` starts empty.
    pub fn with_pending(options: StateOptions, pending: Option<&PendingNavigationItems>) -> Self {
        let mut state = Self::with_options(options);
        state.apply_pending(pending);
        state
    }

    pub fn options(&self) -> StateOptions {
        self.options
    }

    // ---- pushes ----

    pub fn append<I: NavigationItem>(&mut self, item: I) {
        let hash = item_hash(&item);
        self.append_entry(hash, PathEntry::live(item));
    }

    pub fn append_codable<I: CodableNavigationItem>(&mut self, item: I) {
        let hash = item_hash(&item);
        self.append_entry(hash, PathEntry::live_codable(item));
    }

    /// Push an already erased entry under `hash`.
    pub fn append_entry(&mut self, hash: ItemHash, entry: PathEntry) {
        self.push(hash, entry);
        tracing::debug!(hash, count = self.path.len(), "Appended navigation item");
        self.notify(ChangeKind::Append, Transaction::default());
    }

    pub fn set_items<I: NavigationItem>(&mut self, items: Vec<I>) {
        let entries = items
            .into_iter()
            .map(|item| (item_hash(&item), PathEntry::live(item)))
            .collect();
        self.set_entries(entries);
    }

    pub fn set_items_codable<I: CodableNavigationItem>(&mut self, items: Vec<I>) {
        let entries = items
            .into_iter()
            .map(|item| (item_hash(&item), PathEntry::live_codable(item)))
            .collect();
        self.set_entries(entries);
    }

    /// Replace the whole stack with `entries`.
    pub fn set_entries(&mut self, entries: Vec<(ItemHash, PathEntry)>) {
        if self.options.prune_restore_on_set_items {
            self.restore.clear();
        }

        self.hashes.clear();
        self.path.clear();
        for (hash, entry) in entries {
            self.push(hash, entry);
        }

        tracing::debug!(count = self.path.len(), "Replaced navigation items");
        self.notify(ChangeKind::SetItems, Transaction::default());
    }

    // ---- removals ----

    pub fn remove_including<I: NavigationItem>(&mut self, item: &I) {
        self.remove_including_hash(item_hash(item));
    }

    /// Remove the first entry with `hash` and everything above it.
    pub fn remove_including_hash(&mut self, hash: ItemHash) {
        let Some(index) = self.position(hash) else {
            return;
        };
        self.cut(index, ChangeKind::RemoveIncluding);
    }

    pub fn remove_until<I: NavigationItem>(&mut self, item: &I) {
        self.remove_until_hash(item_hash(item));
    }

    /// Remove everything above the first entry with `hash`, keeping it.
    pub fn remove_until_hash(&mut self, hash: ItemHash) {
        let Some(index) = self.position(hash) else {
            return;
        };
        self.cut(index + 1, ChangeKind::RemoveUntil);
    }

    pub fn remove<I: NavigationItem>(&mut self, item: &I) {
        self.remove_hash(item_hash(item));
    }

    /// Remove the first entry with `hash` wherever it sits.
    pub fn remove_hash(&mut self, hash: ItemHash) {
        let Some(index) = self.position(hash) else {
            return;
        };

        let removed = self.hashes.remove(index);
        if !self.hashes.contains(&removed) {
            self.restore.remove(&removed);
        }

        let remaining = std::mem::take(&mut self.hashes);
        self.path.clear();

        self.is_locked = true;
        for hash in remaining {
            match self.restore.get(&hash).cloned() {
                Some(restore) => self.append_entry(hash, restore()),
                None => tracing::warn!(hash, "No restore procedure, dropping entry"),
            }
        }
        self.is_locked = false;

        tracing::debug!(
            hash = removed,
            index,
            count = self.path.len(),
            "Removed navigation item"
        );
        self.notify(
            ChangeKind::Remove,
            Transaction {
                disables_animations: true,
            },
        );
    }

    pub fn remove_all(&mut self) {
        self.restore.clear();
        self.hashes.clear();
        self.path.clear();
        self.notify(ChangeKind::RemoveAll, Transaction::default());
    }

    pub fn remove_last(&mut self) -> Result<()> {
        self.remove_last_n(1)
    }

    pub fn remove_last_n(&mut self, k: usize) -> Result<()> {
        let available = self.hashes.len();
        let k = if k > available {
            match self.options.underflow_policy {
                UnderflowPolicy::Raise => {
                    return Err(StateError::Underflow {
                        requested: k,
                        available,
                    })
                }
                UnderflowPolicy::Clamp => available,
            }
        } else {
            k
        };

        self.cut(available - k, ChangeKind::RemoveLast);
        Ok(())
    }

    /// Cut the stack down to `len`, e.g. after the presentation layer popped
    /// on its own. A no-op when `len` is not below the current depth.
    pub fn truncate(&mut self, len: usize) {
        if len < self.hashes.len() {
            self.cut(len, ChangeKind::Truncate);
        }
    }

    // ---- queries ----

    pub fn count(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Hash-based membership; not a full equality check.
    pub fn contains<I: NavigationItem>(&self, item: &I) -> bool {
        self.contains_hash(item_hash(item))
    }

    pub fn contains_hash(&self, hash: ItemHash) -> bool {
        self.hashes.contains(&hash)
    }

    pub fn path(&self) -> &NavigationPath {
        &self.path
    }

    pub fn hashes(&self) -> &[ItemHash] {
        &self.hashes
    }

    /// Snapshot of the stack, or `None` if any entry lacks a codable form.
    pub fn codable(&self) -> Option<CodableRepresentation> {
        self.path.codable().map(|navigation_path| CodableRepresentation {
            navigation_path,
            hashes: self.hashes.clone(),
        })
    }

    // ---- snapshot ingestion ----

    /// Replace the stack with `pending` unless it was the last one applied.
    ///
    /// Returns `true` when the stack was replaced.
    pub fn apply_pending(&mut self, pending: Option<&PendingNavigationItems>) -> bool {
        let incoming = pending.map(|p| p.hashes().to_vec());
        if self.last_pending == incoming {
            return false;
        }
        self.last_pending = incoming;

        self.hashes.clear();
        self.path.clear();

        if let Some(pending) = pending {
            if pending.path().len() != pending.hashes().len() {
                tracing::warn!(
                    items = pending.path().len(),
                    hashes = pending.hashes().len(),
                    "Pending snapshot is misaligned, keeping the common prefix"
                );
            }

            for (hash, codable) in pending.hashes().iter().zip(pending.path()) {
                self.push(*hash, PathEntry::Encoded(codable.clone()));
            }
        }

        tracing::info!(count = self.path.len(), "Applied pending navigation items");
        self.notify(ChangeKind::PendingItems, Transaction::default());
        true
    }

    // ---- observation ----

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    // ---- internals ----

    fn position(&self, hash: ItemHash) -> Option<usize> {
        self.hashes.iter().position(|h| *h == hash)
    }

    fn push(&mut self, hash: ItemHash, entry: PathEntry) {
        let captured = entry.clone();
        self.restore
            .insert(hash, Arc::new(move || captured.clone()));
        self.hashes.push(hash);
        self.path.push(entry);
    }

    /// Truncate both sequences to `len`, clearing restore entries for hashes
    /// that no longer appear anywhere in the index.
    fn cut(&mut self, len: usize, kind: ChangeKind) {
        let removed = self.hashes.split_off(len);
        self.path.truncate(len);

        for hash in removed {
            if !self.hashes.contains(&hash) {
                self.restore.remove(&hash);
            }
        }

        tracing::debug!(count = self.path.len(), ?kind, "Cut navigation stack");
        self.notify(kind, Transaction::default());
    }

    fn notify(&self, kind: ChangeKind, transaction: Transaction) {
        if self.is_locked {
            return;
        }

        let change = StateChange {
            kind,
            count: self.path.len(),
            transaction,
        };
        for (_, observer) in &self.observers {
            observer(&change);
        }
    }

    #[cfg(test)]
    fn restore_len(&self) -> usize {
        self.restore.len()
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationState")
            .field("path", &self.path)
            .field("hashes", &self.hashes)
            .field("restore", &self.restore.len())
            .field("observers", &self.observers.len())
            .field("options", &self.options)
            .finish()
    }
}
