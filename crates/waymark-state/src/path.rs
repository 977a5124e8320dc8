//! Ordered Path and its codable form

use std::any::type_name;

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::item::{CodableNavigationItem, ItemEnvelope, NavigationItem};
use crate::Result;

/// One encoded stack item: its type name plus a JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodableItem {
    pub type_name: String,
    pub value: serde_json::Value,
}

impl CodableItem {
    pub fn encode<I: CodableNavigationItem>(item: &I) -> Result<Self> {
        let value = serde_json::to_value(item).map_err(|source| StateError::Encode {
            type_name: type_name::<I>().to_string(),
            source,
        })?;

        Ok(Self {
            type_name: type_name::<I>().to_string(),
            value,
        })
    }

    pub fn decode<I: CodableNavigationItem>(&self) -> Result<I> {
        if self.type_name != type_name::<I>() {
            return Err(StateError::TypeMismatch {
                expected: type_name::<I>().to_string(),
                found: self.type_name.clone(),
            });
        }

        serde_json::from_value(self.value.clone()).map_err(|source| StateError::Decode {
            type_name: self.type_name.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub enum PathEntry {
    /// Pushed in this process; the concrete value is held behind the envelope.
    Live {
        envelope: ItemEnvelope,
        codable: Option<CodableItem>,
    },
    /// Ingested from a snapshot and decoded on demand.
    Encoded(CodableItem),
}

impl PathEntry {
    pub fn live<I: NavigationItem>(item: I) -> Self {
        Self::Live {
            envelope: ItemEnvelope::wrap(item),
            codable: None,
        }
    }

    /// Live entry that also carries its encoded form. An item that fails to
    /// encode is kept but leaves the path without a codable form.
    pub fn live_codable<I: CodableNavigationItem>(item: I) -> Self {
        let codable = match CodableItem::encode(&item) {
            Ok(codable) => Some(codable),
            Err(e) => {
                tracing::warn!(error = %e, "Pushing item without a codable form");
                None
            }
        };

        Self::Live {
            envelope: ItemEnvelope::wrap(item),
            codable,
        }
    }

    pub fn codable(&self) -> Option<&CodableItem> {
        match self {
            Self::Live { codable, .. } => codable.as_ref(),
            Self::Encoded(codable) => Some(codable),
        }
    }

    pub fn envelope(&self) -> Option<&ItemEnvelope> {
        match self {
            Self::Live { envelope, .. } => Some(envelope),
            Self::Encoded(_) => None,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Live { envelope, .. } => envelope.key().name(),
            Self::Encoded(codable) => &codable.type_name,
        }
    }
}

/// The ordered, type-erased sequence of stack items.
#[derive(Debug, Clone, Default)]
pub struct NavigationPath {
    entries: Vec<PathEntry>,
}

impl NavigationPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_codable(items: Vec<CodableItem>) -> Self {
        Self {
            entries: items.into_iter().map(PathEntry::Encoded).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&PathEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&PathEntry> {
        self.entries.last()
    }

    /// Concrete item at `index` if it was pushed live as an `I`.
    pub fn downcast<I: NavigationItem>(&self, index: usize) -> Option<I> {
        self.entries
            .get(index)?
            .envelope()?
            .downcast_ref::<I>()
            .cloned()
    }

    /// Concrete item at `index`, decoding snapshot-ingested entries.
    pub fn decode<I: CodableNavigationItem>(&self, index: usize) -> Option<I> {
        match self.entries.get(index)? {
            PathEntry::Live { envelope, .. } => envelope.downcast_ref::<I>().cloned(),
            PathEntry::Encoded(codable) => match codable.decode::<I>() {
                Ok(item) => Some(item),
                Err(StateError::TypeMismatch { .. }) => None,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Failed to decode path entry");
                    None
                }
            },
        }
    }

    /// Encoded form of every entry, or `None` if any entry has none.
    pub fn codable(&self) -> Option<Vec<CodableItem>> {
        self.entries
            .iter()
            .map(|entry| entry.codable().cloned())
            .collect()
    }

    pub(crate) fn push(&mut self, entry: PathEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
