//! Pointer drag-select interaction state.
//!
//! This module tracks the rectangle gesture from pointer-down to pointer-up.
//! It never touches the selection store directly; each step returns what the
//! gesture means and the session applies it.

use egui::{PointerButton, Pos2, Rect};

use crate::domain::hit_testing;

/// A pointer-down as reported by the embedding surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub point: Pos2,
    pub button: PointerButton,
    /// True when the press landed on an interactive control inside an item
    /// (a checkbox, a menu button); such presses never arm a drag.
    pub over_control: bool,
}

impl PointerPress {
    /// Primary-button press on plain content.
    pub fn primary(point: Pos2) -> Self {
        Self {
            point,
            button: PointerButton::Primary,
            over_control: false,
        }
    }
}

/// Live drag rectangle; exists only after the movement threshold is exceeded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub origin: Pos2,
    pub current: Pos2,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragPhase {
    #[default]
    Idle,
    /// Button held inside the container, threshold not yet exceeded
    Armed { origin: Pos2 },
    Dragging(DragSession),
}

/// Outcome of a pointer move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragUpdate {
    /// Nothing to apply
    None,
    /// The rectangle now covers exactly these item positions
    Selection(Vec<usize>),
}

/// Outcome of a pointer release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    /// No gesture was armed
    Idle,
    /// The pointer never exceeded the threshold: treat as a click
    Click { point: Pos2 },
    /// A drag finished; the selection from the last move stands
    DragEnded,
}

/// Drag-Select Region state machine.
///
/// Responsibilities:
/// - Arming on a primary press inside the scroll container
/// - Promoting to a drag once movement exceeds the threshold
/// - Clamping the rectangle to the container and hit-testing item boxes
#[derive(Debug, Clone)]
pub struct DragSelectRegion {
    phase: DragPhase,
    /// Bounds of the scrollable collection area
    container: Rect,
    /// Movement in pixels that turns a press into a drag
    threshold: f32,
}

impl DragSelectRegion {
    pub fn new(container: Rect, threshold: f32) -> Self {
        Self {
            phase: DragPhase::Idle,
            container,
            threshold,
        }
    }

    /// Updates the container bounds (e.g. after a window resize).
    pub fn set_container(&mut self, container: Rect) {
        self.container = container;
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    /// Takes effect from the next press; a drag in progress keeps its state.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    // ===== Queries =====

    pub fn is_idle(&self) -> bool {
        self.phase == DragPhase::Idle
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Returns the active drag session, if any.
    pub fn session(&self) -> Option<DragSession> {
        match self.phase {
            DragPhase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Returns the clamped rectangle to draw as an overlay while dragging.
    pub fn selection_rect(&self) -> Option<Rect> {
        self.session()
            .map(|s| hit_testing::selection_rect(s.origin, s.current, self.container))
    }

    // ===== Transitions =====

    /// Handles a pointer-down.
    ///
    /// # Returns
    /// `true` if the press armed a gesture.
    pub fn pointer_down(&mut self, press: PointerPress) -> bool {
        if press.button != PointerButton::Primary
            || press.over_control
            || !self.container.contains(press.point)
        {
            return false;
        }
        tracing::debug!(x = press.point.x, y = press.point.y, "drag armed");
        self.phase = DragPhase::Armed { origin: press.point };
        true
    }

    /// Handles a pointer move.
    ///
    /// # Arguments
    /// * `point` - Current pointer position
    /// * `item_rects` - On-screen bounding boxes of the rendered items, keyed by position
    pub fn pointer_move(&mut self, point: Pos2, item_rects: &[(usize, Rect)]) -> DragUpdate {
        let session = match self.phase {
            DragPhase::Idle => return DragUpdate::None,
            DragPhase::Armed { origin } => {
                if !hit_testing::exceeds_threshold(origin, point, self.threshold) {
                    return DragUpdate::None;
                }
                tracing::debug!("drag started");
                DragSession {
                    origin,
                    current: point,
                    active: true,
                }
            }
            DragPhase::Dragging(session) => DragSession {
                current: point,
                ..session
            },
        };
        self.phase = DragPhase::Dragging(session);

        let rect = hit_testing::selection_rect(session.origin, session.current, self.container);
        DragUpdate::Selection(hit_testing::intersecting_positions(rect, item_rects))
    }

    /// Handles a pointer release and returns to idle.
    pub fn pointer_up(&mut self, point: Pos2) -> DragRelease {
        let release = match self.phase {
            DragPhase::Idle => DragRelease::Idle,
            DragPhase::Armed { .. } => DragRelease::Click { point },
            DragPhase::Dragging(_) => {
                tracing::debug!("drag ended");
                DragRelease::DragEnded
            }
        };
        self.phase = DragPhase::Idle;
        release
    }

    /// Abandons any gesture in progress without producing a click.
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn container() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(400.0, 400.0))
    }

    fn cards() -> Vec<(usize, Rect)> {
        (0..3)
            .map(|i| {
                let x = i as f32 * 110.0;
                (i, Rect::from_min_max(pos2(x, 0.0), pos2(x + 100.0, 100.0)))
            })
            .collect()
    }

    #[test]
    fn test_small_movement_is_a_click() {
        let mut region = DragSelectRegion::new(container(), 5.0);
        assert!(region.pointer_down(PointerPress::primary(pos2(50.0, 50.0))));
        assert_eq!(region.pointer_move(pos2(53.0, 52.0), &cards()), DragUpdate::None);
        assert_eq!(
            region.pointer_up(pos2(53.0, 52.0)),
            DragRelease::Click { point: pos2(53.0, 52.0) }
        );
        assert!(region.is_idle());
    }

    #[test]
    fn test_drag_reports_intersecting_positions() {
        let mut region = DragSelectRegion::new(container(), 5.0);
        region.pointer_down(PointerPress::primary(pos2(50.0, 50.0)));
        let update = region.pointer_move(pos2(150.0, 60.0), &cards());
        assert_eq!(update, DragUpdate::Selection(vec![0, 1]));
        assert!(region.is_dragging());

        // Shrinking the rectangle shrinks the result
        let update = region.pointer_move(pos2(90.0, 60.0), &cards());
        assert_eq!(update, DragUpdate::Selection(vec![0]));
        assert_eq!(region.pointer_up(pos2(90.0, 60.0)), DragRelease::DragEnded);
    }

    #[test]
    fn test_secondary_button_does_not_arm() {
        let mut region = DragSelectRegion::new(container(), 5.0);
        let press = PointerPress {
            button: PointerButton::Secondary,
            ..PointerPress::primary(pos2(10.0, 10.0))
        };
        assert!(!region.pointer_down(press));
        assert_eq!(region.pointer_up(pos2(10.0, 10.0)), DragRelease::Idle);
    }

    #[test]
    fn test_press_on_control_does_not_arm() {
        let mut region = DragSelectRegion::new(container(), 5.0);
        let press = PointerPress {
            over_control: true,
            ..PointerPress::primary(pos2(10.0, 10.0))
        };
        assert!(!region.pointer_down(press));
    }

    #[test]
    fn test_press_outside_container_does_not_arm() {
        let mut region = DragSelectRegion::new(container(), 5.0);
        assert!(!region.pointer_down(PointerPress::primary(pos2(500.0, 10.0))));
    }

    #[test]
    fn test_rectangle_clamped_when_pointer_leaves_container() {
        let mut region = DragSelectRegion::new(container(), 5.0);
        region.pointer_down(PointerPress::primary(pos2(10.0, 10.0)));
        region.pointer_move(pos2(900.0, 900.0), &cards());
        let rect = region.selection_rect().unwrap_or(Rect::NOTHING);
        assert_eq!(rect.max, pos2(400.0, 400.0));
    }

    #[test]
    fn test_cancel_discards_gesture() {
        let mut region = DragSelectRegion::new(container(), 5.0);
        region.pointer_down(PointerPress::primary(pos2(10.0, 10.0)));
        region.cancel();
        assert_eq!(region.pointer_up(pos2(10.0, 10.0)), DragRelease::Idle);
    }
}
