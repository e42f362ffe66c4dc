//! Click interpretation.

use egui::Modifiers;

/// What a plain click on an item means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickIntent {
    /// Open the item in the detail view
    Open,
    /// Toggle membership in the selection
    Toggle,
    /// Extend the selection from the anchor to this item
    Range,
}

/// Classifies a click from the current batch-mode flag and held modifiers.
///
/// Shift always means range. Ctrl/Cmd toggles even outside batch mode.
pub fn classify_click(batch_mode: bool, modifiers: Modifiers) -> ClickIntent {
    if modifiers.shift {
        ClickIntent::Range
    } else if modifiers.command || modifiers.ctrl || modifiers.mac_cmd || batch_mode {
        ClickIntent::Toggle
    } else {
        ClickIntent::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_click_opens_outside_batch_mode() {
        assert_eq!(classify_click(false, Modifiers::NONE), ClickIntent::Open);
    }

    #[test]
    fn test_plain_click_toggles_in_batch_mode() {
        assert_eq!(classify_click(true, Modifiers::NONE), ClickIntent::Toggle);
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(classify_click(false, Modifiers::SHIFT), ClickIntent::Range);
        assert_eq!(classify_click(true, Modifiers::SHIFT), ClickIntent::Range);
        assert_eq!(classify_click(false, Modifiers::COMMAND), ClickIntent::Toggle);
    }
}
