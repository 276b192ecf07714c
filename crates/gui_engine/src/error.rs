//! GUI runtime error types

use crate::events::PointerButton;

/// Result type for GUI routing operations
pub type GuiResult<T> = Result<T, GuiError>;

/// Errors that can occur while routing input or managing GUI state
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GuiError {
    /// The platform reported a pointer button the GUI does not support
    #[error("pointer button {0:?} is not a supported GUI mouse button")]
    UnsupportedPointerButton(PointerButton),

    /// A widget referenced a render target that was never registered
    #[error("render target is not registered with the GUI manager")]
    UnknownRenderTarget,

    /// An element referenced a widget that was never registered
    #[error("widget is not registered with the GUI manager")]
    UnknownWidget,
}
