//! Domain logic modules for the selection engine.
//!
//! This module contains pure, stateless logic:
//! - Item Index (ordered id/position snapshot of the loaded page)
//! - Range operations (inclusive anchor-to-target id ranges)
//! - Hit testing (drag rectangle construction and intersection)
//! - Grid layout (card bounding boxes for a virtualized grid)

pub mod item_index;
pub mod range_operations;
pub mod hit_testing;
pub mod grid_layout;

pub use item_index::{Item, ItemIndex};
