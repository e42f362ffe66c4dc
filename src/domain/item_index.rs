//! The ordered Item Index for the currently displayed collection page(s).
//!
//! The index is a read-only snapshot: the engine never reorders or edits it,
//! it only replaces it when the collection collaborator delivers new data.
//! Positions are valid only for the snapshot they came from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::traits::ItemId;

/// An item as seen by the selection engine: identity plus display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub position: usize,
}

/// Ordered, de-duplicated view of the loaded items.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    /// Item IDs in display order
    ids: Vec<ItemId>,
    /// Reverse lookup id -> position
    positions: HashMap<ItemId, usize>,
}

impl ItemIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from ids in display order.
    ///
    /// Duplicate ids keep their first position; later occurrences are dropped.
    pub fn from_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        let mut index = Self::new();
        index.append(ids);
        index
    }

    /// Appends a further page of ids, skipping ids already present.
    ///
    /// # Returns
    /// Number of ids actually appended.
    pub fn append(&mut self, ids: impl IntoIterator<Item = ItemId>) -> usize {
        let before = self.ids.len();
        for id in ids {
            if self.positions.contains_key(&id) {
                continue;
            }
            self.positions.insert(id, self.ids.len());
            self.ids.push(id);
        }
        self.ids.len() - before
    }

    // ===== Queries =====

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns all ids in display order.
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Returns the id displayed at `position`, if any.
    pub fn id_at(&self, position: usize) -> Option<ItemId> {
        self.ids.get(position).copied()
    }

    /// Returns the current position of `id`, if it is loaded.
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Returns the item displayed at `position`, if any.
    pub fn item_at(&self, position: usize) -> Option<Item> {
        self.id_at(position).map(|id| Item { id, position })
    }

    /// Returns the item with the given id, if it is loaded.
    pub fn item(&self, id: ItemId) -> Option<Item> {
        self.position_of(id).map(|position| Item { id, position })
    }

    /// Returns the ids for the positions `[lo, hi]` inclusive, clipped to the index.
    pub fn ids_between(&self, lo: usize, hi: usize) -> &[ItemId] {
        if lo >= self.ids.len() || lo > hi {
            return &[];
        }
        let end = hi.min(self.ids.len() - 1);
        &self.ids[lo..=end]
    }

    /// Iterates over items in display order.
    pub fn iter(&self) -> impl Iterator<Item = Item> + '_ {
        self.ids
            .iter()
            .enumerate()
            .map(|(position, &id)| Item { id, position })
    }
}
