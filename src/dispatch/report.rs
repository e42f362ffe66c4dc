//! Per-item results of a dispatched batch.

use std::collections::HashSet;

use serde::Serialize;

use crate::dispatch::ActionKind;
use crate::traits::{BatchOperationResult, DownloadArchive, ItemId};

/// Result for one id in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Succeeded,
    Failed { reason: String },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Outcome of one batch, one entry per requested id in request order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub kind: ActionKind,
    pub outcomes: Vec<(ItemId, ItemOutcome)>,
    /// Server message, if any
    pub message: Option<String>,
    /// Items the service reports as changed; may exceed `success_count()`
    /// when the service applies some ids without naming the failed ones
    pub applied: usize,
    /// Present only for a successful download
    #[serde(skip)]
    pub archive: Option<DownloadArchive>,
}

impl BatchReport {
    /// Every id succeeded.
    pub fn all_succeeded(kind: ActionKind, ids: &[ItemId]) -> Self {
        Self {
            kind,
            outcomes: ids.iter().map(|&id| (id, ItemOutcome::Succeeded)).collect(),
            message: None,
            applied: ids.len(),
            archive: None,
        }
    }

    /// Every id failed for the same reason (the whole call failed).
    pub fn all_failed(kind: ActionKind, ids: &[ItemId], reason: &str) -> Self {
        Self {
            kind,
            outcomes: ids
                .iter()
                .map(|&id| {
                    (
                        id,
                        ItemOutcome::Failed {
                            reason: reason.to_string(),
                        },
                    )
                })
                .collect(),
            message: Some(reason.to_string()),
            applied: 0,
            archive: None,
        }
    }

    /// Builds a report from a server aggregate result.
    ///
    /// When the server reports failures without naming the failed ids, every
    /// requested id is treated as failed while `applied` keeps the server's
    /// success count.
    pub fn from_operation_result(kind: ActionKind, ids: &[ItemId], result: BatchOperationResult) -> Self {
        let message = (!result.message.is_empty()).then(|| result.message.clone());
        if result.failed == 0 && result.failed_ids.is_empty() {
            return Self {
                message,
                ..Self::all_succeeded(kind, ids)
            };
        }
        if result.failed_ids.is_empty() {
            let reason = message.clone().unwrap_or_else(|| "operation failed".to_string());
            return Self {
                message,
                applied: result.success.min(ids.len()),
                ..Self::all_failed(kind, ids, &reason)
            };
        }

        let failed: HashSet<ItemId> = result.failed_ids.iter().copied().collect();
        let reason = message.clone().unwrap_or_else(|| "rejected by server".to_string());
        let outcomes = ids
            .iter()
            .map(|&id| {
                let outcome = if failed.contains(&id) {
                    ItemOutcome::Failed {
                        reason: reason.clone(),
                    }
                } else {
                    ItemOutcome::Succeeded
                };
                (id, outcome)
            })
            .collect();
        Self {
            message,
            ..Self::from_outcomes(kind, outcomes)
        }
    }

    /// Builds a report from individually dispatched ids.
    pub fn from_outcomes(kind: ActionKind, outcomes: Vec<(ItemId, ItemOutcome)>) -> Self {
        let applied = outcomes.iter().filter(|(_, o)| o.is_success()).count();
        Self {
            kind,
            outcomes,
            message: None,
            applied,
            archive: None,
        }
    }

    // ===== Queries =====

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded_ids(&self) -> Vec<ItemId> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_success())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn failed_ids(&self) -> Vec<ItemId> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_success())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }

    /// Whether the service changed anything, named or not.
    pub fn applied_any(&self) -> bool {
        self.applied > 0
    }

    pub fn is_full_success(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| o.is_success())
    }

    pub fn is_total_failure(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|(_, o)| !o.is_success())
    }

    /// "3 of 5" style summary of successes.
    pub fn summary(&self) -> String {
        format!("{} of {}", self.success_count(), self.total())
    }

    /// Reason of the first failed item, if any.
    pub fn first_failure(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|(_, o)| match o {
            ItemOutcome::Failed { reason } => Some(reason.as_str()),
            ItemOutcome::Succeeded => None,
        })
    }
}
