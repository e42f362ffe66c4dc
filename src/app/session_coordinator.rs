//! Session-level coordination and workflow management.
//!
//! Connects a `SelectionSession` to its background workers: page loads go
//! through a `CollectionLoader`, batches through a `BatchRunner`. The UI calls
//! the `check_*` methods once per frame.

use crate::app::SelectionSession;
use crate::dispatch::{BatchAction, BatchReport, BatchRunner, RunResult};
use crate::error::DispatchError;
use crate::io::{CollectionLoader, LoadResult};
use crate::traits::{MutationService, ViewQuery};

/// Coordinates session workflows.
///
/// This struct is responsible for:
/// - Navigating between views and loading their first page
/// - Paging ("load more") and refreshing after mutations
/// - Launching batches and reconciling their results
pub struct SessionCoordinator;

impl SessionCoordinator {
    /// Switches the session to `query` and starts loading its first page.
    ///
    /// Re-navigating to the current view does nothing.
    pub fn navigate(session: &mut SelectionSession, loader: &mut CollectionLoader, query: ViewQuery) {
        if session.navigate_to(query.clone()) {
            loader.load_first(query);
        }
    }

    /// Re-queries every page loaded so far in the current view.
    pub fn refresh(session: &SelectionSession, loader: &mut CollectionLoader) {
        loader.reload(session.view().clone(), session.loaded_pages());
    }

    /// Requests the next page if there is one and nothing is loading.
    ///
    /// Returns true if a request was started.
    pub fn load_more(session: &SelectionSession, loader: &mut CollectionLoader) -> bool {
        if !session.has_more() || loader.is_loading() {
            return false;
        }
        loader.load_more(session.view().clone(), session.next_page());
        true
    }

    /// Checks for page-load completion and applies the result.
    ///
    /// Returns true if a load for the current view completed (success or error).
    pub fn check_loading_completion(session: &mut SelectionSession, loader: &mut CollectionLoader) -> bool {
        match loader.check_completion() {
            LoadResult::Loaded { query, page } => {
                if &query != session.view() {
                    return false;
                }
                session.apply_page(page);
                true
            }
            LoadResult::Reloaded { query, page } => {
                if &query != session.view() {
                    return false;
                }
                session.apply_reload(page);
                true
            }
            LoadResult::Error(message) => {
                session.load_failed(&message);
                true
            }
            LoadResult::None => false,
        }
    }

    /// Snapshots the selection and starts the batch in the background.
    ///
    /// # Arguments
    /// * `confirmed` - Whether the user confirmed a destructive action
    pub fn launch_batch<M: MutationService + ?Sized + 'static>(
        session: &mut SelectionSession,
        runner: &mut BatchRunner<M>,
        action: BatchAction,
        confirmed: bool,
    ) -> Result<(), DispatchError> {
        let mut request = session.prepare_batch(action)?;
        if confirmed {
            request = request.confirm();
        }
        if let Err(e) = request.validate() {
            tracing::warn!(error = %e, "batch not launched");
            return Err(e);
        }
        let kind = request.kind();
        runner.start(request)?;
        session.mark_in_flight(kind);
        Ok(())
    }

    /// Checks for batch completion, reconciles the session, and refreshes the
    /// view if the batch changed it.
    pub fn check_batch_completion<M: MutationService + ?Sized + 'static>(
        session: &mut SelectionSession,
        runner: &mut BatchRunner<M>,
        loader: &mut CollectionLoader,
    ) -> Option<BatchReport> {
        let RunResult::Finished(result) = runner.check_completion() else {
            return None;
        };
        let report = session.finish_batch(result);
        if session.take_refresh_request() {
            Self::refresh(session, loader);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EngineConfig;
    use crate::io::VirtualCollection;
    use crate::notify::NotificationCenter;
    use egui::{pos2, Rect};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::runtime::Handle;

    fn session() -> SelectionSession {
        let container = Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0));
        SelectionSession::new(
            EngineConfig::default(),
            Arc::new(NotificationCenter::default()),
            container,
        )
    }

    async fn settle_loads(session: &mut SelectionSession, loader: &mut CollectionLoader) {
        for _ in 0..400 {
            SessionCoordinator::check_loading_completion(session, loader);
            if !loader.is_loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_delete_then_refresh() {
        let collection = Arc::new(VirtualCollection::with_ids(1..=8));
        let mut loader = CollectionLoader::new(collection.clone(), Handle::current(), 50);
        let mut runner = BatchRunner::new(collection.clone(), Handle::current());
        let mut session = session();

        SessionCoordinator::refresh(&session, &mut loader);
        settle_loads(&mut session, &mut loader).await;
        assert_eq!(session.index().len(), 8);

        session.select_all();
        SessionCoordinator::launch_batch(&mut session, &mut runner, BatchAction::Delete, true).unwrap();
        assert!(session.is_busy());

        let mut report = None;
        for _ in 0..400 {
            report = SessionCoordinator::check_batch_completion(&mut session, &mut runner, &mut loader);
            if report.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(report.map(|r| r.is_full_success()).unwrap_or(false));
        settle_loads(&mut session, &mut loader).await;

        assert!(session.index().is_empty());
        assert!(!session.store().batch_mode());
    }

    async fn settle_batch<M: MutationService + ?Sized + 'static>(
        session: &mut SelectionSession,
        runner: &mut BatchRunner<M>,
        loader: &mut CollectionLoader,
    ) -> Option<BatchReport> {
        for _ in 0..400 {
            let report = SessionCoordinator::check_batch_completion(session, runner, loader);
            if report.is_some() {
                return report;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        None
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_refresh_keeps_failed_ids_on_later_pages() {
        let collection = Arc::new(VirtualCollection::with_ids(1..=120));
        collection.fail_on([70]);
        let mut loader = CollectionLoader::new(collection.clone(), Handle::current(), 50);
        let mut runner = BatchRunner::new(collection.clone(), Handle::current());
        let mut session = session();

        SessionCoordinator::refresh(&session, &mut loader);
        settle_loads(&mut session, &mut loader).await;
        assert!(SessionCoordinator::load_more(&session, &mut loader));
        settle_loads(&mut session, &mut loader).await;
        assert_eq!(session.index().len(), 100);

        // Ids 6 and 70 sit at positions 5 and 69
        session.click(5, egui::Modifiers::COMMAND);
        session.click(69, egui::Modifiers::COMMAND);
        SessionCoordinator::launch_batch(&mut session, &mut runner, BatchAction::MoveToVault, false).unwrap();

        let report = settle_batch(&mut session, &mut runner, &mut loader).await.unwrap();
        assert_eq!(report.failed_ids(), vec![70]);
        assert!(loader.is_loading());
        settle_loads(&mut session, &mut loader).await;

        assert_eq!(session.index().len(), 100);
        assert!(!session.index().contains(6));
        assert_eq!(session.store().snapshot(), vec![70]);
        assert!(session.store().batch_mode());
        assert_eq!(session.next_page(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unconfirmed_delete_is_not_launched() {
        let collection = Arc::new(VirtualCollection::with_ids(1..=3));
        let mut runner = BatchRunner::new(collection.clone(), Handle::current());
        let mut session = session();
        session.replace_items(1..=3);
        session.select_all();

        let result = SessionCoordinator::launch_batch(&mut session, &mut runner, BatchAction::Delete, false);
        assert!(matches!(result, Err(DispatchError::Unconfirmed(_))));
        assert!(!session.is_busy());
        assert!(collection.requests().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_load_more_appends() {
        let collection = Arc::new(VirtualCollection::with_ids(1..=120));
        let mut loader = CollectionLoader::new(collection, Handle::current(), 50);
        let mut session = session();

        SessionCoordinator::navigate(&mut session, &mut loader, ViewQuery::trash());
        settle_loads(&mut session, &mut loader).await;
        assert!(session.index().is_empty());

        SessionCoordinator::navigate(&mut session, &mut loader, ViewQuery::library());
        settle_loads(&mut session, &mut loader).await;
        assert_eq!(session.index().len(), 50);

        assert!(SessionCoordinator::load_more(&session, &mut loader));
        settle_loads(&mut session, &mut loader).await;
        assert_eq!(session.index().len(), 100);
        assert!(session.has_more());
    }
}
