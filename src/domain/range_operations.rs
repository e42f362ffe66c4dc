//! Range selection between an anchor position and a target position.
//!
//! Range selection is additive: the computed ids are unioned into the existing
//! selection by the caller, never substituted for it.

use crate::domain::item_index::ItemIndex;
use crate::traits::ItemId;

/// Computes the ids displayed between two positions, inclusive on both ends.
///
/// The order of `anchor` and `target` does not matter. Positions past the end
/// of the index are clipped.
///
/// # Arguments
/// * `anchor` - Position of the most recent explicit selection
/// * `target` - Position of the item the range gesture landed on
/// * `index` - The Item Index the positions refer to
pub fn compute_range(anchor: usize, target: usize, index: &ItemIndex) -> Vec<ItemId> {
    let lo = anchor.min(target);
    let hi = anchor.max(target);
    index.ids_between(lo, hi).to_vec()
}
