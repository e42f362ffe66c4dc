pub mod traits;
pub mod domain;
pub mod state;
pub mod input;
pub mod dispatch;
pub mod notify;
pub mod error;
pub mod io;
pub mod app;

// Export collaborator interfaces
pub use traits::{
    ItemId, ViewQuery, CollectionPage, BatchOperationResult, DownloadArchive,
    CollectionSource, MutationService
};

// Export selection core
pub use domain::{Item, ItemIndex};
pub use state::{SelectionStore, SelectionSummary};

// Export dispatch
pub use dispatch::{
    ActionKind, BatchAction, BatchDispatcher, BatchReport, BatchRequest, BatchRunner,
    GroupTarget, ItemOutcome, TagOps
};
pub use error::DispatchError;

// Export session and notifications
pub use app::{EngineConfig, SelectionSession, SessionCoordinator};
pub use notify::{NotificationCenter, NotificationLevel, NotificationSink};

// Export the in-memory collection
pub use io::VirtualCollection;
