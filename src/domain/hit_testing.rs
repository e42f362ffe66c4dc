//! Hit testing for pointer gestures over the item grid.
//!
//! This module provides pure functions for:
//! - Building the drag-select rectangle clamped to the scroll container
//! - Strict rectangle intersection against item bounding boxes
//! - Point-to-item lookup for plain clicks
//!
//! These functions are stateless and can be tested independently.

use egui::{Pos2, Rect};

/// Builds the axis-aligned selection rectangle between two pointer positions.
///
/// Both points are clamped to the container bounds first, so a pointer that
/// leaves the scroll container stretches the rectangle only up to its edge.
///
/// # Arguments
/// * `origin` - Pointer position at pointer-down
/// * `current` - Latest pointer position
/// * `container` - Bounds of the scrollable collection area
pub fn selection_rect(origin: Pos2, current: Pos2, container: Rect) -> Rect {
    Rect::from_two_pos(container.clamp(origin), container.clamp(current))
}

/// Returns true if the two rectangles overlap with a non-zero area.
///
/// Touching edges do not count, so a rectangle that only grazes the border
/// between two cards selects neither.
pub fn intersects_strict(a: Rect, b: Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Returns the positions of all item boxes the selection rectangle intersects.
///
/// # Arguments
/// * `selection` - The drag-select rectangle
/// * `item_rects` - On-screen bounding boxes keyed by item position
///
/// # Returns
/// Positions in ascending order.
pub fn intersecting_positions(selection: Rect, item_rects: &[(usize, Rect)]) -> Vec<usize> {
    let mut positions: Vec<usize> = item_rects
        .iter()
        .filter(|(_, rect)| intersects_strict(selection, *rect))
        .map(|(position, _)| *position)
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}

/// Finds the item under a point, if any.
pub fn item_at_point(point: Pos2, item_rects: &[(usize, Rect)]) -> Option<usize> {
    item_rects
        .iter()
        .find(|(_, rect)| rect.contains(point))
        .map(|(position, _)| *position)
}

/// Returns true once the pointer has travelled further than `threshold` pixels.
pub fn exceeds_threshold(origin: Pos2, current: Pos2, threshold: f32) -> bool {
    origin.distance(current) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn cards() -> Vec<(usize, Rect)> {
        // Three 100x100 cards in a row with 10px gaps
        (0..3)
            .map(|i| {
                let x = i as f32 * 110.0;
                (i, Rect::from_min_max(pos2(x, 0.0), pos2(x + 100.0, 100.0)))
            })
            .collect()
    }

    #[test]
    fn test_selection_rect_normalizes_corners() {
        let container = Rect::from_min_max(pos2(0.0, 0.0), pos2(500.0, 500.0));
        let rect = selection_rect(pos2(200.0, 150.0), pos2(50.0, 20.0), container);
        assert_eq!(rect.min, pos2(50.0, 20.0));
        assert_eq!(rect.max, pos2(200.0, 150.0));
    }

    #[test]
    fn test_selection_rect_clamps_to_container() {
        let container = Rect::from_min_max(pos2(0.0, 0.0), pos2(300.0, 200.0));
        let rect = selection_rect(pos2(10.0, 10.0), pos2(900.0, -40.0), container);
        assert_eq!(rect.max.x, 300.0);
        assert_eq!(rect.min.y, 0.0);
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0));
        let b = Rect::from_min_max(pos2(10.0, 0.0), pos2(20.0, 10.0));
        assert!(!intersects_strict(a, b));
    }

    #[test]
    fn test_intersecting_positions_spans_cards() {
        let selection = Rect::from_min_max(pos2(50.0, 50.0), pos2(150.0, 60.0));
        assert_eq!(intersecting_positions(selection, &cards()), vec![0, 1]);
    }

    #[test]
    fn test_selection_in_gap_hits_nothing() {
        let selection = Rect::from_min_max(pos2(101.0, 10.0), pos2(109.0, 90.0));
        assert!(intersecting_positions(selection, &cards()).is_empty());
    }

    #[test]
    fn test_item_at_point() {
        assert_eq!(item_at_point(pos2(230.0, 40.0), &cards()), Some(2));
        assert_eq!(item_at_point(pos2(105.0, 40.0), &cards()), None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!exceeds_threshold(pos2(0.0, 0.0), pos2(3.0, 4.0), 5.0));
        assert!(exceeds_threshold(pos2(0.0, 0.0), pos2(3.0, 4.1), 5.0));
    }
}
