//! Application-level modules for the selection engine.
//!
//! This module contains the per-view session, its coordinator, and
//! configuration with settings persistence.

mod config;
mod session;
mod session_coordinator;
mod settings_coordinator;

pub use config::{EngineConfig, CONFIG_KEY};
pub use session::{ClickOutcome, SelectionSession, TouchResponse};
pub use session_coordinator::SessionCoordinator;
pub use settings_coordinator::{JsonFileStorage, MemoryStorage, SettingsCoordinator, SettingsStorage};
