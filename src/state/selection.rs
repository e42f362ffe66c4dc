//! Multi-item selection state management.
//!
//! This module encapsulates the Selection Store: the set of selected item ids,
//! the range anchor, and the batch-mode flag. Every mutation goes through an
//! intent-revealing method so the coupling between selection and batch mode is
//! enforced in one place instead of at each call site.

use std::collections::HashSet;

use tokio::sync::watch;

use crate::domain::{Item, ItemIndex};
use crate::traits::ItemId;

/// Cheap change notification published after every store mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Monotonic change counter
    pub revision: u64,
    /// Number of selected items
    pub selected_count: usize,
    /// Whether clicks toggle selection instead of opening items
    pub batch_mode: bool,
    /// Current anchor position, if any
    pub anchor_position: Option<usize>,
}

/// The Selection Store.
///
/// Responsibilities:
/// - Tracking the set of selected item ids
/// - Tracking the anchor of the most recent explicit single-item selection
/// - Keeping "non-empty selection implies batch mode" true after every operation
/// - Publishing a summary to subscribers on every change
///
/// All operations are synchronous and total.
#[derive(Debug)]
pub struct SelectionStore {
    /// Currently selected ids (order irrelevant)
    selected: HashSet<ItemId>,
    /// Most recent explicit selection; the id keeps the anchor attached to the
    /// same item when positions shift between index snapshots
    anchor: Option<Item>,
    /// Whether clicks are interpreted as toggles
    batch_mode: bool,
    /// Change counter
    revision: u64,
    /// Subscription channel
    changes: watch::Sender<SelectionSummary>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    /// Creates an empty store with batch mode off.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(SelectionSummary::default());
        Self {
            selected: HashSet::new(),
            anchor: None,
            batch_mode: false,
            revision: 0,
            changes,
        }
    }

    /// Subscribes to change summaries.
    ///
    /// The receiver always holds the latest summary; intermediate revisions may
    /// be skipped if the subscriber reads slower than the store changes.
    pub fn subscribe(&self) -> watch::Receiver<SelectionSummary> {
        self.changes.subscribe()
    }

    // ===== Selection Queries =====

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn batch_mode(&self) -> bool {
        self.batch_mode
    }

    /// Returns the anchor position for range selection, if set.
    pub fn anchor_position(&self) -> Option<usize> {
        self.anchor.map(|item| item.position)
    }

    /// Returns the anchored item, if set.
    pub fn anchor(&self) -> Option<Item> {
        self.anchor
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the selected ids in ascending order.
    ///
    /// This is the snapshot handed to the batch dispatcher; it is an owned copy,
    /// so later mutations of the store never reach an in-flight request.
    pub fn snapshot(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.selected.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the current change summary.
    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            revision: self.revision,
            selected_count: self.selected.len(),
            batch_mode: self.batch_mode,
            anchor_position: self.anchor_position(),
        }
    }

    // ===== Selection Mutations =====

    /// Toggles membership of a single item.
    ///
    /// Adding sets the anchor to the item's position and turns batch mode on.
    /// Removing leaves the anchor where it was.
    ///
    /// # Returns
    /// `true` if the item is selected afterwards.
    pub fn toggle(&mut self, item: Item) -> bool {
        let now_selected = if self.selected.remove(&item.id) {
            false
        } else {
            self.selected.insert(item.id);
            self.anchor = Some(item);
            true
        };
        self.sync_batch_mode();
        self.publish();
        now_selected
    }

    /// Adds a single item and anchors on it (long-press activation).
    ///
    /// Unlike `toggle`, an already-selected item stays selected.
    pub fn mark(&mut self, item: Item) {
        self.selected.insert(item.id);
        self.anchor = Some(item);
        self.sync_batch_mode();
        self.publish();
    }

    /// Replaces the whole selection (drag-select).
    ///
    /// The anchor is left untouched: drag results never become an anchor.
    pub fn replace_with(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        let next: HashSet<ItemId> = ids.into_iter().collect();
        if next == self.selected {
            return;
        }
        self.selected = next;
        self.sync_batch_mode();
        self.publish();
    }

    /// Adds ids to the selection without removing anything (range-select).
    pub fn union_with(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        let before = self.selected.len();
        self.selected.extend(ids);
        if self.selected.len() == before && (self.batch_mode || self.selected.is_empty()) {
            return;
        }
        self.sync_batch_mode();
        self.publish();
    }

    /// Selects exactly the given ids and turns batch mode on.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.selected = ids.into_iter().collect();
        self.batch_mode = true;
        self.publish();
    }

    /// Empties the selection. Batch mode is left as it is.
    ///
    /// The anchor is dropped too, so a range gesture after a clear starts from
    /// a fresh explicit selection instead of an item the user deselected.
    pub fn clear(&mut self) {
        if self.selected.is_empty() && self.anchor.is_none() {
            return;
        }
        self.selected.clear();
        self.anchor = None;
        self.publish();
    }

    /// Sets batch mode explicitly. Turning it off also clears the selection.
    pub fn set_batch_mode(&mut self, enabled: bool) {
        if !enabled {
            self.selected.clear();
            self.anchor = None;
        }
        self.batch_mode = enabled;
        self.publish();
    }

    /// Keeps only the selected ids for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(ItemId) -> bool) {
        let before = self.selected.len();
        self.selected.retain(|id| keep(*id));
        if self.selected.len() != before {
            self.publish();
        }
    }

    /// Reconciles the store with a freshly supplied Item Index.
    ///
    /// Ids no longer present are dropped. The anchor is re-resolved by id, so it
    /// follows its item to a new position, or is unset if the item is gone.
    pub fn prune_to(&mut self, index: &ItemIndex) {
        let before = self.selected.len();
        self.selected.retain(|id| index.contains(*id));
        let anchor = self.anchor.and_then(|item| index.item(item.id));
        if self.selected.len() != before || anchor != self.anchor {
            self.anchor = anchor;
            self.publish();
        }
    }

    /// Clears everything and leaves batch mode (view navigation).
    pub fn reset(&mut self) {
        self.selected.clear();
        self.anchor = None;
        self.batch_mode = false;
        self.publish();
    }

    fn sync_batch_mode(&mut self) {
        if !self.selected.is_empty() {
            self.batch_mode = true;
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        let summary = self.summary();
        self.changes.send_replace(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(id: ItemId, position: usize) -> Item {
        Item { id, position }
    }

    #[test]
    fn test_first_toggle_enters_batch_mode() {
        let mut store = SelectionStore::new();
        assert!(store.toggle(item(7, 3)));
        assert!(store.batch_mode());
        assert_eq!(store.anchor_position(), Some(3));
    }

    #[test]
    fn test_toggle_off_keeps_anchor_and_batch_mode() {
        let mut store = SelectionStore::new();
        store.toggle(item(7, 3));
        assert!(!store.toggle(item(7, 3)));
        assert!(store.is_empty());
        assert!(store.batch_mode());
        assert_eq!(store.anchor_position(), Some(3));
    }

    #[test]
    fn test_replace_with_does_not_move_anchor() {
        let mut store = SelectionStore::new();
        store.toggle(item(3, 2));
        store.replace_with([1, 2, 3]);
        assert_eq!(store.anchor_position(), Some(2));
        assert_eq!(store.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_replace_keeps_batch_mode_off() {
        let mut store = SelectionStore::new();
        store.replace_with([]);
        assert!(!store.batch_mode());
    }

    #[test]
    fn test_non_empty_replace_enters_batch_mode() {
        let mut store = SelectionStore::new();
        store.replace_with([4, 5]);
        assert!(store.batch_mode());
        assert_eq!(store.anchor(), None);
    }

    #[test]
    fn test_union_is_additive() {
        let mut store = SelectionStore::new();
        store.replace_with([1, 9]);
        store.union_with([3, 4]);
        assert_eq!(store.snapshot(), vec![1, 3, 4, 9]);
    }

    #[test]
    fn test_union_enters_batch_mode() {
        let mut store = SelectionStore::new();
        store.union_with([5]);
        assert!(store.batch_mode());
    }

    #[test]
    fn test_select_all_forces_batch_mode() {
        let mut store = SelectionStore::new();
        store.select_all(1..=10);
        assert_eq!(store.len(), 10);
        assert!(store.batch_mode());
    }

    #[test]
    fn test_clear_keeps_batch_mode() {
        let mut store = SelectionStore::new();
        store.select_all([1, 2]);
        store.clear();
        assert!(store.is_empty());
        assert!(store.batch_mode());
        assert_eq!(store.anchor_position(), None);
    }

    #[test]
    fn test_leaving_batch_mode_clears_selection() {
        let mut store = SelectionStore::new();
        store.toggle(item(1, 0));
        store.set_batch_mode(false);
        assert!(store.is_empty());
        assert!(!store.batch_mode());
    }

    #[test]
    fn test_mark_never_deselects() {
        let mut store = SelectionStore::new();
        store.toggle(item(4, 1));
        store.mark(item(4, 1));
        assert!(store.is_selected(4));
    }

    #[test]
    fn test_prune_drops_stale_ids_and_follows_anchor() {
        let mut store = SelectionStore::new();
        store.toggle(item(20, 1));
        store.union_with([10, 30]);

        // Refresh: 10 was deleted, 20 moved to the front
        let index = ItemIndex::from_ids([20, 30, 40]);
        store.prune_to(&index);
        assert_eq!(store.snapshot(), vec![20, 30]);
        assert_eq!(store.anchor_position(), Some(0));
    }

    #[test]
    fn test_prune_unsets_anchor_of_removed_item() {
        let mut store = SelectionStore::new();
        store.toggle(item(20, 1));
        store.prune_to(&ItemIndex::from_ids([30]));
        assert_eq!(store.anchor_position(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_retain_trims_selection() {
        let mut store = SelectionStore::new();
        store.select_all([1, 2, 3, 4]);
        store.retain(|id| id % 2 == 0);
        assert_eq!(store.snapshot(), vec![2, 4]);
    }

    #[test]
    fn test_subscribers_see_latest_summary() {
        let mut store = SelectionStore::new();
        let rx = store.subscribe();
        store.select_all([1, 2, 3]);
        let summary = *rx.borrow();
        assert_eq!(summary.selected_count, 3);
        assert!(summary.batch_mode);
        assert_eq!(summary.revision, store.revision());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = SelectionStore::new();
        store.select_all([1, 2, 3]);
        let snapshot = store.snapshot();
        store.replace_with([4, 5]);
        assert_eq!(snapshot, vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn prop_double_toggle_is_identity(
            initial in proptest::collection::hash_set(0u64..40, 0..20),
            id in 0u64..40,
            position in 0usize..40,
        ) {
            let mut store = SelectionStore::new();
            store.replace_with(initial.iter().copied());
            let before = store.snapshot();
            store.toggle(Item { id, position });
            store.toggle(Item { id, position });
            prop_assert_eq!(store.snapshot(), before);
        }
    }
}
