//! Platform collaborator interfaces
//!
//! The router consumes these narrow traits instead of owning any platform
//! state; the embedding application wires them to its window system once and
//! passes them into every routing call through [`crate::manager::GuiIo`].

use crate::events::CursorType;
use crate::foundation::collections::WidgetId;
use crate::foundation::math::Vec2I;

/// Identifier of an OS window owned by the platform layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// Window queries the router needs for hit-testing
pub trait PlatformWindows {
    /// Whether the screen position is over the given window
    fn is_point_over_window(&self, window: WindowId, screen_pos: Vec2I) -> bool;

    /// Convert a screen position to window-local coordinates
    fn screen_to_window_pos(&self, window: WindowId, screen_pos: Vec2I) -> Vec2I;

    /// Whether the window still exists; used by debug lifecycle checks
    fn window_exists(&self, window: WindowId) -> bool {
        let _ = window;
        true
    }
}

/// Receiver for cursor glyph changes
pub trait CursorHost {
    /// Change the active cursor glyph
    fn set_cursor(&mut self, cursor: CursorType);
}

/// Receiver for tooltip show/hide requests
pub trait TooltipHost {
    /// Show a tooltip for a widget at a window-local position
    fn show(&mut self, widget: WidgetId, window_pos: Vec2I, text: &str);

    /// Hide any visible tooltip
    fn hide(&mut self);
}
