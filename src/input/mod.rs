//! Input classification for keyboard and pointer events.

pub mod keyboard;
pub mod pointer;

pub use keyboard::{KeyEvent, KeyResponse, KeyboardRouter, Shortcut};
pub use pointer::{classify_click, ClickIntent};
