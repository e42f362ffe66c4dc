//! Keyboard shortcut routing.
//!
//! The router only classifies key events; the session decides what a shortcut
//! does given the current view (detail open, selection empty, and so on).

use egui::{Key, Modifiers};

/// A key press delivered by the embedding surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// True when a text input, textarea or content-editable element has focus
    pub text_entry_focused: bool,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            text_entry_focused: false,
        }
    }

    /// Marks the event as arriving while a text field is focused.
    pub fn in_text_entry(mut self) -> Self {
        self.text_entry_focused = true;
        self
    }
}

/// Shortcuts the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    SelectAll,
    Escape,
}

/// What the surface should do with the native key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// Let the event through untouched
    Ignored,
    /// The engine acted on the event
    Handled { prevent_default: bool },
}

/// Keyboard Shortcut Router.
///
/// Active only while mounted; an unmounted router ignores everything.
#[derive(Debug, Clone, Default)]
pub struct KeyboardRouter {
    mounted: bool,
}

impl KeyboardRouter {
    /// Creates a mounted router.
    pub fn new() -> Self {
        Self { mounted: true }
    }

    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Maps a key event to a shortcut, if it is one.
    pub fn route(&self, event: &KeyEvent) -> Option<Shortcut> {
        if !self.mounted || event.text_entry_focused {
            return None;
        }
        match event.key {
            Key::A if is_command(event.modifiers) => Some(Shortcut::SelectAll),
            Key::Escape => Some(Shortcut::Escape),
            _ => None,
        }
    }
}

/// Ctrl on Linux/Windows, Cmd on macOS; Alt must not be held.
fn is_command(modifiers: Modifiers) -> bool {
    (modifiers.command || modifiers.ctrl || modifiers.mac_cmd) && !modifiers.alt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_a_routes_to_select_all() {
        let router = KeyboardRouter::new();
        let event = KeyEvent::new(Key::A, Modifiers::CTRL);
        assert_eq!(router.route(&event), Some(Shortcut::SelectAll));
    }

    #[test]
    fn test_cmd_a_routes_to_select_all() {
        let router = KeyboardRouter::new();
        let event = KeyEvent::new(Key::A, Modifiers::MAC_CMD);
        assert_eq!(router.route(&event), Some(Shortcut::SelectAll));
    }

    #[test]
    fn test_plain_a_is_not_a_shortcut() {
        let router = KeyboardRouter::new();
        assert_eq!(router.route(&KeyEvent::new(Key::A, Modifiers::NONE)), None);
        assert_eq!(router.route(&KeyEvent::new(Key::A, Modifiers::CTRL | Modifiers::ALT)), None);
    }

    #[test]
    fn test_text_entry_suppresses_shortcuts() {
        let router = KeyboardRouter::new();
        let event = KeyEvent::new(Key::A, Modifiers::CTRL).in_text_entry();
        assert_eq!(router.route(&event), None);
        let event = KeyEvent::new(Key::Escape, Modifiers::NONE).in_text_entry();
        assert_eq!(router.route(&event), None);
    }

    #[test]
    fn test_unmounted_router_ignores_everything() {
        let mut router = KeyboardRouter::new();
        router.unmount();
        assert_eq!(router.route(&KeyEvent::new(Key::Escape, Modifiers::NONE)), None);
        router.mount();
        assert_eq!(
            router.route(&KeyEvent::new(Key::Escape, Modifiers::NONE)),
            Some(Shortcut::Escape)
        );
    }
}
