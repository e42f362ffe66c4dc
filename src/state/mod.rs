//! State management modules for the selection engine.
//!
//! This module contains state-only logic (no presentation concerns):
//! - Selection state (selected ids, anchor, batch mode)
//! - Interaction state (pointer drag-select rectangle)
//! - Long-press state (touch hold timer)

mod selection;
mod interaction;
mod long_press;

pub use selection::{SelectionStore, SelectionSummary};
pub use interaction::{DragRelease, DragSelectRegion, DragSession, DragUpdate, PointerPress};
pub use long_press::{ContactId, LongPressActivator, LongPressEvent, LongPressTimer, DEFAULT_HOLD};
