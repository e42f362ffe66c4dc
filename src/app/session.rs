//! Per-view selection session.
//!
//! `SelectionSession` composes the focused state components (selection store,
//! drag region, long-press activator, keyboard router) with the current Item
//! Index and view. Input handlers call its intent-revealing methods; it turns
//! gestures into store mutations and reconciles the store after batches and
//! reloads.
//!
//! The session is single-writer: it is owned and mutated by the UI thread only.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use egui::{Modifiers, Pos2, Rect};
use tokio::sync::watch;

use crate::app::EngineConfig;
use crate::dispatch::{ActionKind, BatchAction, BatchReport, BatchRequest};
use crate::domain::hit_testing::item_at_point;
use crate::domain::range_operations::compute_range;
use crate::domain::ItemIndex;
use crate::error::DispatchError;
use crate::input::{classify_click, ClickIntent, KeyEvent, KeyResponse, KeyboardRouter, Shortcut};
use crate::notify::NotificationSink;
use crate::state::{
    ContactId, DragRelease, DragSelectRegion, DragUpdate, LongPressActivator, LongPressEvent,
    PointerPress, SelectionStore, SelectionSummary,
};
use crate::traits::{CollectionPage, ItemId, ViewQuery};

/// What a click (or a pointer release that was a click) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing under the pointer, or the gesture was not a click
    Ignored,
    /// The item was opened in the detail view
    Opened(ItemId),
    Toggled { id: ItemId, selected: bool },
    /// A range was unioned into the selection
    RangeSelected { count: usize },
    /// A drag-select finished
    DragEnded,
}

/// What the surface should do after a touch event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchResponse {
    /// Trigger haptic feedback (the long-press fired)
    pub haptic: bool,
    /// Swallow the click the platform synthesizes for this touch
    pub suppress_click: bool,
}

/// Selection state and gesture handling for one collection view.
pub struct SelectionSession {
    config: EngineConfig,

    // ===== Focused State Components =====
    store: SelectionStore,
    /// Pointer drag-select rectangle
    pub drag: DragSelectRegion,
    /// Touch hold timer
    pub long_press: LongPressActivator,
    pub keyboard: KeyboardRouter,

    // ===== View State =====
    view: ViewQuery,
    index: ItemIndex,
    /// Last loaded page number (0 before the first page)
    page: u32,
    has_more: bool,
    total: usize,
    /// Item shown in the detail view, if open
    detail: Option<ItemId>,

    // ===== Batch State =====
    in_flight: Option<ActionKind>,
    needs_refresh: bool,

    notifier: Arc<dyn NotificationSink>,
}

impl SelectionSession {
    /// Creates a session for the library view with an empty index.
    ///
    /// # Arguments
    /// * `config` - Gesture and paging settings
    /// * `notifier` - Where user-facing messages go
    /// * `container` - Bounds of the scrollable collection area
    pub fn new(config: EngineConfig, notifier: Arc<dyn NotificationSink>, container: Rect) -> Self {
        Self {
            drag: DragSelectRegion::new(container, config.drag_threshold_px),
            long_press: LongPressActivator::new(config.long_press()),
            keyboard: KeyboardRouter::new(),
            store: SelectionStore::new(),
            view: ViewQuery::library(),
            index: ItemIndex::new(),
            page: 0,
            has_more: false,
            total: 0,
            detail: None,
            in_flight: None,
            needs_refresh: false,
            notifier,
            config,
        }
    }

    // ===== Configuration =====

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the settings and pushes the gesture thresholds into the drag
    /// region and long-press activator.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.drag.set_threshold(config.drag_threshold_px);
        self.long_press.set_hold(config.long_press());
        self.config = config;
    }

    // ===== Queries =====

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionSummary> {
        self.store.subscribe()
    }

    pub fn view(&self) -> &ViewQuery {
        &self.view
    }

    pub fn index(&self) -> &ItemIndex {
        &self.index
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Page number to request for "load more".
    pub fn next_page(&self) -> u32 {
        self.page + 1
    }

    /// Number of pages a refresh has to re-query to cover the loaded items.
    pub fn loaded_pages(&self) -> u32 {
        self.page.max(1)
    }

    /// Total items in the view as reported by the collection service.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn detail(&self) -> Option<ItemId> {
        self.detail
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<ActionKind> {
        self.in_flight
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Returns and clears the pending refresh request.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_refresh)
    }

    // ===== View Lifecycle =====

    /// Switches to a different view.
    ///
    /// Selection, anchor, batch mode, detail view and any gesture in progress
    /// are reset, and the index is emptied until the first page arrives.
    ///
    /// # Returns
    /// `false` if `query` is already the current view (nothing reset).
    pub fn navigate_to(&mut self, query: ViewQuery) -> bool {
        if query == self.view {
            return false;
        }
        tracing::debug!(?query, "navigating to view");
        self.view = query;
        self.store.reset();
        self.drag.cancel();
        self.long_press.cancel();
        self.detail = None;
        self.index = ItemIndex::new();
        self.page = 0;
        self.has_more = false;
        self.total = 0;
        self.needs_refresh = false;
        true
    }

    /// Applies a page delivered for the current view.
    ///
    /// Page 1 replaces the index; later pages append to it. The store is then
    /// pruned against the new index before anything else can read it.
    pub fn apply_page(&mut self, page: CollectionPage) {
        if page.page <= 1 {
            self.index = ItemIndex::from_ids(page.items);
        } else {
            let added = self.index.append(page.items);
            tracing::debug!(page = page.page, added, "appended page");
        }
        self.page = page.page.max(1);
        self.has_more = page.has_more;
        self.total = page.total;
        self.reconcile();
    }

    /// Applies a refresh covering every page loaded so far.
    ///
    /// The merged result replaces the index, so selected ids beyond the first
    /// page survive as long as the service still lists them.
    pub fn apply_reload(&mut self, page: CollectionPage) {
        self.index = ItemIndex::from_ids(page.items);
        self.page = page.page.max(1);
        self.has_more = page.has_more;
        self.total = page.total;
        self.reconcile();
    }

    /// Replaces the whole index (e.g. after the surface reorders items).
    pub fn replace_items(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.index = ItemIndex::from_ids(ids);
        self.reconcile();
    }

    /// Reports a failed page load for the current view.
    pub fn load_failed(&self, message: &str) {
        tracing::warn!(error = message, "collection load failed");
        self.notifier.error(format!("Failed to load items: {message}"));
    }

    fn reconcile(&mut self) {
        self.store.prune_to(&self.index);
        if let Some(id) = self.detail {
            if !self.index.contains(id) {
                self.detail = None;
            }
        }
    }

    // ===== Pointer Input =====

    /// Handles a click on the item at `position`.
    pub fn click(&mut self, position: usize, modifiers: Modifiers) -> ClickOutcome {
        let Some(item) = self.index.item_at(position) else {
            return ClickOutcome::Ignored;
        };
        match classify_click(self.store.batch_mode(), modifiers) {
            ClickIntent::Open => {
                self.detail = Some(item.id);
                ClickOutcome::Opened(item.id)
            }
            ClickIntent::Toggle => ClickOutcome::Toggled {
                id: item.id,
                selected: self.store.toggle(item),
            },
            ClickIntent::Range => match self.store.anchor_position() {
                Some(anchor) => {
                    let ids = compute_range(anchor, position, &self.index);
                    let count = ids.len();
                    self.store.union_with(ids);
                    ClickOutcome::RangeSelected { count }
                }
                None => ClickOutcome::Toggled {
                    id: item.id,
                    selected: self.store.toggle(item),
                },
            },
        }
    }

    pub fn pointer_down(&mut self, press: PointerPress) -> bool {
        self.drag.pointer_down(press)
    }

    /// Handles a pointer move; returns the new selection size while dragging.
    ///
    /// # Arguments
    /// * `point` - Current pointer position
    /// * `item_rects` - On-screen bounding boxes of the rendered items, keyed by position
    pub fn pointer_move(&mut self, point: Pos2, item_rects: &[(usize, Rect)]) -> Option<usize> {
        match self.drag.pointer_move(point, item_rects) {
            DragUpdate::Selection(positions) => {
                let ids: Vec<ItemId> = positions
                    .into_iter()
                    .filter_map(|p| self.index.id_at(p))
                    .collect();
                let count = ids.len();
                self.store.replace_with(ids);
                Some(count)
            }
            DragUpdate::None => None,
        }
    }

    /// Handles a pointer release; a release that never became a drag is a click.
    pub fn pointer_up(&mut self, point: Pos2, item_rects: &[(usize, Rect)], modifiers: Modifiers) -> ClickOutcome {
        match self.drag.pointer_up(point) {
            DragRelease::Click { point } => match item_at_point(point, item_rects) {
                Some(position) => self.click(position, modifiers),
                None => ClickOutcome::Ignored,
            },
            DragRelease::DragEnded => ClickOutcome::DragEnded,
            DragRelease::Idle => ClickOutcome::Ignored,
        }
    }

    // ===== Touch Input =====

    pub fn touch_start(&mut self, contact: ContactId, position: usize, now: Instant) -> TouchResponse {
        let Some(id) = self.index.id_at(position) else {
            return TouchResponse::default();
        };
        let event = self.long_press.touch_start(contact, id, now);
        self.apply_long_press(event, false)
    }

    pub fn touch_move(&mut self, contact: ContactId, now: Instant) -> TouchResponse {
        let event = self.long_press.touch_move(contact, now);
        self.apply_long_press(event, false)
    }

    pub fn touch_end(&mut self, contact: ContactId, now: Instant) -> TouchResponse {
        let event = self.long_press.touch_end(contact, now);
        self.apply_long_press(event, true)
    }

    /// Advances the long-press clock; call on every frame while a touch is held.
    pub fn tick(&mut self, now: Instant) -> TouchResponse {
        let event = self.long_press.tick(now);
        self.apply_long_press(event, false)
    }

    fn apply_long_press(&mut self, event: LongPressEvent, releasing: bool) -> TouchResponse {
        match event {
            LongPressEvent::Fired(id) => {
                // The item may have been paged out while the finger was down
                match self.index.item(id) {
                    Some(item) => self.store.mark(item),
                    None => self.store.set_batch_mode(true),
                }
                TouchResponse {
                    haptic: true,
                    suppress_click: releasing,
                }
            }
            LongPressEvent::ReleasedAfterActivation => TouchResponse {
                haptic: false,
                suppress_click: true,
            },
            LongPressEvent::Cancelled | LongPressEvent::None => TouchResponse::default(),
        }
    }

    // ===== Keyboard Input =====

    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyResponse {
        match self.keyboard.route(event) {
            Some(Shortcut::SelectAll) => {
                if self.detail.is_some() {
                    return KeyResponse::Ignored;
                }
                self.select_all();
                KeyResponse::Handled {
                    prevent_default: true,
                }
            }
            Some(Shortcut::Escape) => {
                if self.detail.is_some() {
                    self.close_detail();
                } else if !self.store.is_empty() {
                    self.store.clear();
                    if self.config.escape_exits_batch_mode {
                        self.store.set_batch_mode(false);
                    }
                } else {
                    return KeyResponse::Ignored;
                }
                KeyResponse::Handled {
                    prevent_default: false,
                }
            }
            None => KeyResponse::Ignored,
        }
    }

    // ===== Selection Commands =====

    /// Selects every loaded item and enters batch mode.
    pub fn select_all(&mut self) {
        self.store.select_all(self.index.ids().iter().copied());
        self.notifier
            .info(format!("Selected {} items", self.store.len()));
    }

    /// Empties the selection, keeping batch mode.
    pub fn clear_selection(&mut self) {
        self.store.clear();
    }

    pub fn enter_batch_mode(&mut self) {
        self.store.set_batch_mode(true);
    }

    /// Leaves batch mode, which also clears the selection.
    pub fn exit_batch_mode(&mut self) {
        self.store.set_batch_mode(false);
    }

    // ===== Detail View =====

    /// Opens the detail view on a loaded item.
    pub fn open_detail(&mut self, id: ItemId) -> bool {
        if !self.index.contains(id) {
            return false;
        }
        self.detail = Some(id);
        true
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn has_prev(&self) -> bool {
        self.detail_position().is_some_and(|p| p > 0)
    }

    pub fn has_next(&self) -> bool {
        self.detail_position()
            .is_some_and(|p| p + 1 < self.index.len())
    }

    /// Moves the detail view to the neighbouring item.
    ///
    /// # Returns
    /// The newly shown id, or `None` at either end (the view stays put).
    pub fn detail_step(&mut self, forward: bool) -> Option<ItemId> {
        let position = self.detail_position()?;
        let target = if forward {
            position.checked_add(1)?
        } else {
            position.checked_sub(1)?
        };
        let id = self.index.id_at(target)?;
        self.detail = Some(id);
        Some(id)
    }

    fn detail_position(&self) -> Option<usize> {
        self.detail.and_then(|id| self.index.position_of(id))
    }

    // ===== Batch Actions =====

    /// Captures the current selection for a batch.
    ///
    /// The returned request owns a sorted copy of the ids; nothing done to the
    /// session afterwards changes what the batch targets.
    pub fn prepare_batch(&self, action: BatchAction) -> Result<BatchRequest, DispatchError> {
        if let Some(kind) = self.in_flight {
            return Err(DispatchError::Busy(kind));
        }
        if self.store.is_empty() {
            return Err(DispatchError::EmptySelection);
        }
        Ok(BatchRequest::new(action, self.store.snapshot()))
    }

    /// Records that a batch of `kind` has been handed to the dispatcher.
    pub fn mark_in_flight(&mut self, kind: ActionKind) {
        self.in_flight = Some(kind);
    }

    /// Reconciles the session with a finished batch.
    ///
    /// Full success clears the selection (and leaves batch mode for actions
    /// that remove items from the view). Any failure leaves the selection as it
    /// is. A refresh is requested whenever something was actually mutated.
    ///
    /// # Returns
    /// The report, for callers that need the archive or per-id outcomes.
    pub fn finish_batch(&mut self, result: Result<BatchReport, DispatchError>) -> Option<BatchReport> {
        self.in_flight = None;
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "batch rejected");
                self.notifier.error(e.to_string());
                return None;
            }
        };

        let kind = report.kind;
        if kind.mutates_collection() && report.applied_any() {
            self.needs_refresh = true;
        }

        if report.is_full_success() {
            self.store.clear();
            if kind.is_destructive() {
                self.store.set_batch_mode(false);
            }
            self.notifier.success(success_message(&report));
        } else {
            self.notifier.error(failure_message(&report));
        }
        Some(report)
    }

    /// Keeps only the ids that failed in `report` selected, for a retry.
    pub fn retain_failed(&mut self, report: &BatchReport) {
        let failed: HashSet<ItemId> = report.failed_ids().into_iter().collect();
        self.store.retain(|id| failed.contains(&id));
    }
}

fn success_message(report: &BatchReport) -> String {
    let n = report.total();
    match report.kind {
        ActionKind::Delete => format!("Moved {n} items to trash"),
        ActionKind::Restore => format!("Restored {n} items"),
        ActionKind::Move => format!("Moved {n} items"),
        ActionKind::Tag => format!("Updated tags on {n} items"),
        ActionKind::AddToAlbum => format!("Added {n} items to album"),
        ActionKind::AddToCollection => format!("Added {n} items to collection"),
        ActionKind::MoveToVault => format!("Moved {n} items to vault"),
        ActionKind::Download => "Download started".to_string(),
    }
}

fn failure_message(report: &BatchReport) -> String {
    let reason = report.first_failure().unwrap_or("unknown error");
    if report.is_total_failure() {
        format!("{} failed: {reason}", report.kind)
    } else {
        format!(
            "{} completed for {} items; the rest failed: {reason}",
            report.kind,
            report.summary()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationCenter;
    use egui::{pos2, Key};
    use std::time::Duration;

    fn session_with(count: u64) -> (SelectionSession, Arc<NotificationCenter>) {
        let center = Arc::new(NotificationCenter::default());
        let container = Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 1000.0));
        let mut session = SelectionSession::new(EngineConfig::default(), center.clone(), container);
        session.replace_items(1..=count);
        (session, center)
    }

    #[test]
    fn test_plain_click_opens_detail() {
        let (mut session, _) = session_with(10);
        assert_eq!(session.click(3, Modifiers::NONE), ClickOutcome::Opened(4));
        assert_eq!(session.detail(), Some(4));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_click_outside_index_is_ignored() {
        let (mut session, _) = session_with(3);
        assert_eq!(session.click(9, Modifiers::NONE), ClickOutcome::Ignored);
    }

    #[test]
    fn test_shift_click_without_anchor_toggles() {
        let (mut session, _) = session_with(10);
        let outcome = session.click(5, Modifiers::SHIFT);
        assert_eq!(outcome, ClickOutcome::Toggled { id: 6, selected: true });
        assert!(session.store().batch_mode());
    }

    #[test]
    fn test_ctrl_click_toggles_outside_batch_mode() {
        let (mut session, _) = session_with(10);
        let outcome = session.click(0, Modifiers::COMMAND);
        assert_eq!(outcome, ClickOutcome::Toggled { id: 1, selected: true });
    }

    #[test]
    fn test_escape_with_empty_selection_is_ignored() {
        let (mut session, _) = session_with(10);
        let response = session.handle_key(&KeyEvent::new(Key::Escape, Modifiers::NONE));
        assert_eq!(response, KeyResponse::Ignored);
    }

    #[test]
    fn test_escape_can_keep_batch_mode() {
        let (mut session, _) = session_with(10);
        session.set_config(EngineConfig {
            escape_exits_batch_mode: false,
            ..EngineConfig::default()
        });
        session.select_all();
        session.handle_key(&KeyEvent::new(Key::Escape, Modifiers::NONE));
        assert!(session.store().is_empty());
        assert!(session.store().batch_mode());
    }

    #[test]
    fn test_select_all_ignored_in_detail_view() {
        let (mut session, _) = session_with(10);
        session.open_detail(3);
        let response = session.handle_key(&KeyEvent::new(Key::A, Modifiers::CTRL));
        assert_eq!(response, KeyResponse::Ignored);
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_select_all_notifies() {
        let (mut session, center) = session_with(10);
        session.handle_key(&KeyEvent::new(Key::A, Modifiers::CTRL));
        assert_eq!(center.messages(), vec!["Selected 10 items".to_string()]);
    }

    #[test]
    fn test_detail_navigation() {
        let (mut session, _) = session_with(3);
        session.open_detail(1);
        assert!(!session.has_prev());
        assert!(session.has_next());
        assert_eq!(session.detail_step(true), Some(2));
        assert_eq!(session.detail_step(true), Some(3));
        assert_eq!(session.detail_step(true), None);
        assert_eq!(session.detail(), Some(3));
        assert_eq!(session.detail_step(false), Some(2));
    }

    #[test]
    fn test_navigation_resets_selection() {
        let (mut session, _) = session_with(10);
        session.select_all();
        assert!(session.navigate_to(ViewQuery::trash()));
        assert!(session.store().is_empty());
        assert!(!session.store().batch_mode());
        assert!(session.index().is_empty());
        assert!(!session.navigate_to(ViewQuery::trash()));
    }

    #[test]
    fn test_appended_page_keeps_selection_and_anchor() {
        let (mut session, _) = session_with(0);
        session.apply_page(CollectionPage {
            items: (1..=50).collect(),
            total: 60,
            page: 1,
            has_more: true,
        });
        session.click(4, Modifiers::COMMAND);
        session.apply_page(CollectionPage {
            items: (51..=60).collect(),
            total: 60,
            page: 2,
            has_more: false,
        });
        assert!(session.store().is_selected(5));
        assert_eq!(session.store().anchor_position(), Some(4));
        assert_eq!(session.next_page(), 3);
        assert!(!session.has_more());
    }

    #[test]
    fn test_refresh_prunes_deleted_items() {
        let (mut session, _) = session_with(5);
        session.click(0, Modifiers::COMMAND);
        session.click(1, Modifiers::COMMAND);
        session.open_detail(2);
        session.replace_items([1, 3, 4, 5]);
        assert_eq!(session.store().snapshot(), vec![1]);
        assert_eq!(session.detail(), None);
    }

    #[test]
    fn test_prepare_batch_rejects_empty_and_busy() {
        let (mut session, _) = session_with(5);
        assert_eq!(
            session.prepare_batch(BatchAction::Download { preset_id: None }).unwrap_err(),
            DispatchError::EmptySelection
        );
        session.select_all();
        session.mark_in_flight(ActionKind::Tag);
        assert_eq!(
            session.prepare_batch(BatchAction::Download { preset_id: None }).unwrap_err(),
            DispatchError::Busy(ActionKind::Tag)
        );
    }

    #[test]
    fn test_full_success_clears_and_exits_batch_mode() {
        let (mut session, center) = session_with(5);
        session.select_all();
        let request = session.prepare_batch(BatchAction::Restore).unwrap();
        session.mark_in_flight(request.kind());
        let report = BatchReport::all_succeeded(ActionKind::Restore, &request.ids);
        session.finish_batch(Ok(report));

        assert!(!session.is_busy());
        assert!(session.store().is_empty());
        assert!(!session.store().batch_mode());
        assert!(session.take_refresh_request());
        assert!(!session.needs_refresh());
        assert!(center.messages().contains(&"Restored 5 items".to_string()));
    }

    #[test]
    fn test_non_destructive_success_keeps_batch_mode() {
        let (mut session, _) = session_with(5);
        session.select_all();
        let report = BatchReport::all_succeeded(ActionKind::Download, &[1, 2, 3, 4, 5]);
        session.finish_batch(Ok(report));
        assert!(session.store().is_empty());
        assert!(session.store().batch_mode());
        assert!(!session.needs_refresh());
    }

    #[test]
    fn test_failure_keeps_selection() {
        let (mut session, center) = session_with(5);
        session.select_all();
        let report = BatchReport::all_failed(ActionKind::Move, &[1, 2, 3, 4, 5], "offline");
        session.finish_batch(Ok(report));
        assert_eq!(session.store().len(), 5);
        assert!(!session.needs_refresh());
        let last = center.drain().pop().map(|n| n.message).unwrap_or_default();
        assert_eq!(last, "Move failed: offline");
    }

    #[test]
    fn test_retain_failed_after_partial_success() {
        let (mut session, _) = session_with(5);
        session.select_all();
        let mut report = BatchReport::all_succeeded(ActionKind::MoveToVault, &[1, 2, 3, 4, 5]);
        report.outcomes[1].1 = crate::dispatch::ItemOutcome::Failed {
            reason: "locked".to_string(),
        };
        let report = session.finish_batch(Ok(report)).unwrap();
        assert!(session.needs_refresh());
        session.retain_failed(&report);
        assert_eq!(session.store().snapshot(), vec![2]);
    }

    #[test]
    fn test_long_press_fires_on_tick() {
        let (mut session, _) = session_with(5);
        let t0 = Instant::now();
        session.touch_start(1, 2, t0);
        let response = session.tick(t0 + Duration::from_millis(600));
        assert!(response.haptic);
        assert!(session.store().is_selected(3));
        assert_eq!(session.store().anchor_position(), Some(2));
        let response = session.touch_end(1, t0 + Duration::from_millis(700));
        assert!(response.suppress_click);
    }

    #[test]
    fn test_set_config_reaches_gesture_components() {
        let (mut session, _) = session_with(5);
        session.set_config(EngineConfig {
            long_press_ms: 300,
            drag_threshold_px: 40.0,
            ..EngineConfig::default()
        });
        assert_eq!(session.drag.threshold(), 40.0);

        let t0 = Instant::now();
        session.touch_start(1, 0, t0);
        let response = session.tick(t0 + Duration::from_millis(350));
        assert!(response.haptic);
        assert!(session.store().is_selected(1));
    }

    #[test]
    fn test_long_press_on_paged_out_item_still_enters_batch_mode() {
        let (mut session, _) = session_with(5);
        let t0 = Instant::now();
        session.touch_start(1, 4, t0);
        session.replace_items(1..=3);
        let response = session.tick(t0 + Duration::from_millis(650));
        assert!(response.haptic);
        assert!(session.store().is_empty());
        assert!(session.store().batch_mode());
    }

    #[test]
    fn test_unnamed_partial_failure_still_refreshes() {
        let (mut session, _) = session_with(5);
        session.select_all();
        let result = crate::traits::BatchOperationResult {
            total: 5,
            success: 3,
            failed: 2,
            failed_ids: Vec::new(),
            message: "quota exceeded".to_string(),
        };
        let report = BatchReport::from_operation_result(ActionKind::Delete, &[1, 2, 3, 4, 5], result);
        session.finish_batch(Ok(report));
        assert_eq!(session.store().len(), 5);
        assert!(session.take_refresh_request());
    }
}
