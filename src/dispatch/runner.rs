//! Background execution of batches.
//!
//! The session lives on the UI thread and must never block on the mutation
//! service. `BatchRunner` spawns the dispatch onto a tokio runtime and hands
//! the result back through a channel that the UI polls once per frame.

use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::dispatch::{ActionKind, BatchDispatcher, BatchReport, BatchRequest};
use crate::error::DispatchError;
use crate::traits::MutationService;

/// Result of polling the runner.
#[derive(Debug)]
pub enum RunResult {
    /// The batch finished (successfully or not)
    Finished(Result<BatchReport, DispatchError>),
    /// Still running, or nothing was started
    None,
}

/// Runs one batch at a time on a tokio runtime.
pub struct BatchRunner<M: ?Sized> {
    dispatcher: BatchDispatcher<M>,
    runtime: Handle,
    /// Channel receiver for the in-flight batch
    receiver: Option<Receiver<Result<BatchReport, DispatchError>>>,
    /// Kind of the in-flight batch
    pending: Option<ActionKind>,
}

impl<M: MutationService + ?Sized + 'static> BatchRunner<M> {
    /// Creates a runner that spawns onto `runtime`.
    pub fn new(service: Arc<M>, runtime: Handle) -> Self {
        Self {
            dispatcher: BatchDispatcher::new(service),
            runtime,
            receiver: None,
            pending: None,
        }
    }

    /// Checks if a batch is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<ActionKind> {
        self.pending
    }

    /// Starts a batch in the background.
    ///
    /// Call `check_completion()` regularly to collect the result.
    pub fn start(&mut self, request: BatchRequest) -> Result<(), DispatchError> {
        if let Some(kind) = self.pending {
            return Err(DispatchError::Busy(kind));
        }
        let (sender, receiver) = channel();
        self.receiver = Some(receiver);
        self.pending = Some(request.kind());

        let dispatcher = self.dispatcher.clone();
        self.runtime.spawn(async move {
            let result = dispatcher.execute(request).await;
            // Receiver may be gone if the runner was dropped; nothing to do then
            let _ = sender.send(result);
        });
        Ok(())
    }

    /// Returns the result of the in-flight batch if it has finished.
    pub fn check_completion(&mut self) -> RunResult {
        let Some(receiver) = &self.receiver else {
            return RunResult::None;
        };
        match receiver.try_recv() {
            Ok(result) => {
                self.receiver = None;
                self.pending = None;
                RunResult::Finished(result)
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => RunResult::None,
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                // The task panicked before reporting
                self.receiver = None;
                let kind = self.pending.take();
                tracing::warn!(?kind, "batch task ended without a result");
                RunResult::Finished(Err(DispatchError::invalid("batch task ended unexpectedly")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::BatchAction;
    use crate::io::VirtualCollection;
    use std::time::Duration;

    async fn wait_for<M: MutationService + ?Sized + 'static>(runner: &mut BatchRunner<M>) -> Result<BatchReport, DispatchError> {
        loop {
            if let RunResult::Finished(result) = runner.check_completion() {
                return result;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn test_idle_runner_has_nothing() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut runner = BatchRunner::new(Arc::new(VirtualCollection::with_ids(1..=3)), runtime.handle().clone());
        assert!(!runner.is_busy());
        assert!(matches!(runner.check_completion(), RunResult::None));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_second_start_is_busy() {
        let collection = Arc::new(VirtualCollection::with_ids(1..=3));
        let gate = collection.hold_mutations();
        let mut runner = BatchRunner::new(Arc::clone(&collection), Handle::current());

        runner.start(BatchRequest::new(BatchAction::Restore, vec![1])).unwrap();
        let second = runner.start(BatchRequest::new(BatchAction::Restore, vec![2]));
        assert_eq!(second, Err(DispatchError::Busy(ActionKind::Restore)));

        gate.release();
        let report = wait_for(&mut runner).await.unwrap();
        assert!(report.is_full_success());
        assert!(!runner.is_busy());
    }
}
