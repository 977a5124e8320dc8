//! Serialized snapshot of a navigation stack

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::item::ItemHash;
use crate::path::CodableItem;

/// Codable pair of (ordered items, hash index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodableRepresentation {
    pub navigation_path: Vec<CodableItem>,
    pub hashes: Vec<ItemHash>,
}

/// Snapshot waiting to seed an engine.
///
/// Identity is the hash index alone: two pending snapshots with equal hashes
/// are the same pending state even when their decoded items differ.
#[derive(Debug, Clone)]
pub struct PendingNavigationItems {
    path: Vec<CodableItem>,
    hashes: Vec<ItemHash>,
}

impl PendingNavigationItems {
    pub fn new(path: Vec<CodableItem>, hashes: Vec<ItemHash>) -> Self {
        Self { path, hashes }
    }

    pub fn path(&self) -> &[CodableItem] {
        &self.path
    }

    pub fn hashes(&self) -> &[ItemHash] {
        &self.hashes
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn into_parts(self) -> (Vec<CodableItem>, Vec<ItemHash>) {
        (self.path, self.hashes)
    }
}

impl PartialEq for PendingNavigationItems {
    fn eq(&self, other: &Self) -> bool {
        self.hashes == other.hashes
    }
}

impl Eq for PendingNavigationItems {}

impl Hash for PendingNavigationItems {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hashes.hash(state);
    }
}

impl From<CodableRepresentation> for PendingNavigationItems {
    fn from(representation: CodableRepresentation) -> Self {
        Self::new(representation.navigation_path, representation.hashes)
    }
}
