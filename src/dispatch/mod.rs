//! Batch action dispatch: actions, requests, per-id reports and the runner.

pub mod action;
pub mod dispatcher;
pub mod report;
pub mod runner;

pub use action::{ActionKind, BatchAction, GroupTarget, TagOps};
pub use dispatcher::{BatchDispatcher, BatchRequest};
pub use report::{BatchReport, ItemOutcome};
pub use runner::{BatchRunner, RunResult};
