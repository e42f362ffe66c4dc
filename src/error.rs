//! Engine-level rejection reasons.
//!
//! These are pre-flight refusals. Failures reported by the mutation service
//! are not errors at this level; they show up as failed outcomes in a
//! `BatchReport`.

use crate::dispatch::ActionKind;

/// Why a batch request was not sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Nothing is selected
    #[error("No items selected")]
    EmptySelection,
    /// A destructive action was requested without confirmation
    #[error("{0} requires confirmation")]
    Unconfirmed(ActionKind),
    /// Another batch is still in flight
    #[error("{0} is still in progress")]
    Busy(ActionKind),
    /// The request itself is malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DispatchError {
    /// Create an invalid request error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }
}
