//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::settings_coordinator::{SettingsCoordinator, SettingsStorage};

/// Storage key the configuration is persisted under.
pub const CONFIG_KEY: &str = "engine";

/// Tunables for gestures, paging and notifications.
///
/// Missing fields in a stored configuration take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Touch hold duration before long-press activation
    pub long_press_ms: u64,
    /// Pointer travel that turns a press into a drag-select
    pub drag_threshold_px: f32,
    /// Whether Escape with a non-empty selection also leaves batch mode
    pub escape_exits_batch_mode: bool,
    /// Items requested per collection page
    pub page_size: u32,
    /// How long notifications stay visible
    pub notification_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 600,
            drag_threshold_px: 5.0,
            escape_exits_batch_mode: true,
            page_size: 50,
            notification_ttl_secs: 3,
        }
    }
}

impl EngineConfig {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    /// Loads the stored configuration, falling back to defaults.
    pub fn load(storage: Option<&dyn SettingsStorage>) -> Self {
        SettingsCoordinator::load_setting(storage, CONFIG_KEY)
    }

    pub fn save(&self, storage: &mut dyn SettingsStorage) -> anyhow::Result<()> {
        SettingsCoordinator::save_setting(storage, CONFIG_KEY, self)
    }
}
