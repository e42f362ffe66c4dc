//! Grid geometry for item cards.
//!
//! The selection engine does not lay anything out; it consumes item bounding
//! boxes from the embedding surface. This helper produces those boxes for a
//! uniform card grid so the replay tool and tests can drive drag-select with
//! realistic geometry. Only rows overlapping the viewport (plus a buffer) are
//! emitted, which mirrors what a virtualized grid actually has on screen.

use egui::{pos2, vec2, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Number of rows to emit above/below the viewport
pub const VIEWPORT_BUFFER_ROWS: usize = 2;

/// Uniform card grid description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Top-left corner of the first card in screen coordinates (before scroll)
    pub origin: Pos2,
    /// Cards per row
    pub columns: usize,
    /// Card size in pixels
    pub cell: Vec2,
    /// Gap between neighbouring cards in pixels
    pub gap: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            origin: pos2(0.0, 0.0),
            columns: 5,
            cell: vec2(160.0, 160.0),
            gap: 16.0,
        }
    }
}

impl GridLayout {
    fn columns(&self) -> usize {
        self.columns.max(1)
    }

    fn row_stride(&self) -> f32 {
        self.cell.y + self.gap
    }

    /// Bounding box of the card at `position`, scrolled up by `scroll_y`.
    pub fn item_rect(&self, position: usize, scroll_y: f32) -> Rect {
        let row = position / self.columns();
        let col = position % self.columns();
        let min = pos2(
            self.origin.x + col as f32 * (self.cell.x + self.gap),
            self.origin.y + row as f32 * self.row_stride() - scroll_y,
        );
        Rect::from_min_size(min, self.cell)
    }

    /// Bounding boxes of all `count` cards.
    pub fn all_rects(&self, count: usize, scroll_y: f32) -> Vec<(usize, Rect)> {
        (0..count).map(|p| (p, self.item_rect(p, scroll_y))).collect()
    }

    /// Bounding boxes of the cards a virtualized grid would have rendered.
    ///
    /// # Arguments
    /// * `count` - Number of loaded items
    /// * `viewport` - Visible area of the scroll container
    /// * `scroll_y` - Vertical scroll offset in pixels
    pub fn visible_rects(&self, count: usize, viewport: Rect, scroll_y: f32) -> Vec<(usize, Rect)> {
        if count == 0 {
            return Vec::new();
        }
        let stride = self.row_stride();
        let top = (viewport.top() - self.origin.y + scroll_y).max(0.0);
        let first_row = (top / stride).floor() as usize;
        let last_row = first_row + (viewport.height() / stride).ceil() as usize;

        let first_row = first_row.saturating_sub(VIEWPORT_BUFFER_ROWS);
        let last_row = last_row + VIEWPORT_BUFFER_ROWS;

        let start = first_row * self.columns();
        let end = ((last_row + 1) * self.columns()).min(count);
        (start.min(end)..end).map(|p| (p, self.item_rect(p, scroll_y))).collect()
    }

    /// Center point of the card at `position`; handy for scripted clicks.
    pub fn item_center(&self, position: usize, scroll_y: f32) -> Pos2 {
        self.item_rect(position, scroll_y).center()
    }
}
