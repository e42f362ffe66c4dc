//! The Batch Action Dispatcher.
//!
//! A dispatcher owns nothing but a handle to the mutation service. Every call
//! works on the id snapshot carried by its `BatchRequest`, so the live
//! selection can change freely while a batch is in flight.

use std::sync::Arc;

use futures::future::join_all;

use crate::dispatch::{ActionKind, BatchAction, BatchReport, ItemOutcome};
use crate::error::DispatchError;
use crate::traits::{ItemId, MutationService};

/// A prepared batch: the action plus the ids captured at preparation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub action: BatchAction,
    pub ids: Vec<ItemId>,
    pub confirmed: bool,
}

impl BatchRequest {
    pub fn new(action: BatchAction, ids: Vec<ItemId>) -> Self {
        Self {
            action,
            ids,
            confirmed: false,
        }
    }

    /// Records the user's explicit confirmation.
    pub fn confirm(mut self) -> Self {
        self.confirmed = true;
        self
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    pub fn needs_confirmation(&self) -> bool {
        self.kind().requires_confirmation() && !self.confirmed
    }

    /// Checks everything that can be checked before calling the service.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.ids.is_empty() {
            return Err(DispatchError::EmptySelection);
        }
        if self.needs_confirmation() {
            return Err(DispatchError::Unconfirmed(self.kind()));
        }
        match &self.action {
            BatchAction::Tag { tags } if tags.is_empty() => {
                Err(DispatchError::invalid("no tags to add or remove"))
            }
            BatchAction::AddToAlbum { target } | BatchAction::AddToCollection { target }
                if !target.is_valid() =>
            {
                Err(DispatchError::invalid("a new group needs a name"))
            }
            _ => Ok(()),
        }
    }
}

/// Sends batch requests to the mutation service and collects per-id outcomes.
pub struct BatchDispatcher<M: ?Sized> {
    service: Arc<M>,
}

impl<M: ?Sized> Clone for BatchDispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<M: MutationService + ?Sized> BatchDispatcher<M> {
    pub fn new(service: Arc<M>) -> Self {
        Self { service }
    }

    /// Executes a batch.
    ///
    /// # Returns
    /// * `Ok(report)` - The service was called; the report may still contain failures
    /// * `Err(e)` - The request was rejected before anything was sent
    pub async fn execute(&self, request: BatchRequest) -> Result<BatchReport, DispatchError> {
        request.validate()?;
        let kind = request.kind();
        let ids = request.ids.as_slice();
        tracing::debug!(action = %kind, count = ids.len(), "dispatching batch");

        let service = &*self.service;
        let report = match &request.action {
            BatchAction::Delete => aggregate(kind, ids, service.delete(ids).await),
            BatchAction::Restore => aggregate(kind, ids, service.restore(ids).await),
            BatchAction::Move { folder_id } => {
                aggregate(kind, ids, service.move_to_folder(ids, *folder_id).await)
            }
            BatchAction::Tag { tags } => aggregate(kind, ids, service.update_tags(ids, tags).await),
            BatchAction::AddToAlbum { target } => {
                unit(kind, ids, service.add_to_album(ids, target).await)
            }
            BatchAction::AddToCollection { target } => {
                unit(kind, ids, service.add_to_collection(ids, target).await)
            }
            BatchAction::MoveToVault => self.fan_out_vault(ids).await,
            BatchAction::Download { preset_id } => match service.download(ids, *preset_id).await {
                Ok(archive) => BatchReport {
                    archive: Some(archive),
                    ..BatchReport::all_succeeded(kind, ids)
                },
                Err(e) => BatchReport::all_failed(kind, ids, &format!("{e:#}")),
            },
        };

        if report.is_full_success() {
            tracing::info!(action = %kind, count = report.total(), "batch completed");
        } else {
            tracing::warn!(
                action = %kind,
                succeeded = report.success_count(),
                failed = report.total() - report.success_count(),
                "batch completed with failures"
            );
        }
        Ok(report)
    }

    /// Runs one vault move per id concurrently and reports each separately.
    async fn fan_out_vault(&self, ids: &[ItemId]) -> BatchReport {
        let calls = ids.iter().map(|&id| {
            let service = Arc::clone(&self.service);
            async move { (id, service.move_to_vault(id).await) }
        });
        let outcomes = join_all(calls)
            .await
            .into_iter()
            .map(|(id, result)| match result {
                Ok(()) => (id, ItemOutcome::Succeeded),
                Err(e) => {
                    tracing::warn!(id, error = %e, "vault move failed");
                    (id, ItemOutcome::Failed { reason: format!("{e:#}") })
                }
            })
            .collect();
        BatchReport::from_outcomes(ActionKind::MoveToVault, outcomes)
    }
}

fn aggregate(
    kind: ActionKind,
    ids: &[ItemId],
    result: anyhow::Result<crate::traits::BatchOperationResult>,
) -> BatchReport {
    match result {
        Ok(result) => BatchReport::from_operation_result(kind, ids, result),
        Err(e) => BatchReport::all_failed(kind, ids, &format!("{e:#}")),
    }
}

fn unit(kind: ActionKind, ids: &[ItemId], result: anyhow::Result<()>) -> BatchReport {
    match result {
        Ok(()) => BatchReport::all_succeeded(kind, ids),
        Err(e) => BatchReport::all_failed(kind, ids, &format!("{e:#}")),
    }
}
