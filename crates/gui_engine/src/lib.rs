//! Retained GUI runtime for a real-time 3D engine
//!
//! The crate routes platform pointer and keyboard input to retained GUI
//! elements, tracks hover, focus and drag state, coordinates drag-and-drop
//! payload sessions and batches element geometry into per-material meshes
//! handed to the renderer once per frame.
//!
//! The [`manager::GuiManager`] is the single entry point: the application
//! registers render targets, widgets and elements, forwards pointer events
//! through the routing calls and ticks [`manager::GuiManager::update`] once
//! per frame. Platform services (windows, cursor, tooltips, mesh uploads)
//! are lent per call through [`manager::GuiIo`].

pub mod config;
pub mod dragdrop;
pub mod element;
pub mod error;
pub mod events;
pub mod foundation;
pub mod manager;
pub mod platform;
pub mod render;
pub mod widget;

mod batching;
mod router;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::GuiConfig;
pub use dragdrop::DragState;
pub use element::{GuiActions, GuiElement};
pub use error::{GuiError, GuiResult};
pub use events::{
    CursorType, DragPayload, GuiCommandEvent, GuiModifiers, GuiMouseButton, GuiMouseEvent,
    GuiMouseEventKind, GuiTextInputEvent, GuiVirtualButtonEvent, InputCommand, PointerButton,
    PointerEvent, VirtualButton,
};
pub use foundation::collections::{ElementId, TargetId, WidgetId};
pub use manager::{GuiIo, GuiManager};
pub use platform::{CursorHost, PlatformWindows, TooltipHost, WindowId};
pub use render::{
    CameraId, Color, GuiDrawEntry, GuiRenderBridge, GuiRenderSnapshot, GuiVertex, MeshData,
    MeshHandle, MeshPool, RenderCallbacks, SpriteMaterial, SpriteMaterialInfo, TextureId,
};
pub use widget::{GuiWidget, RenderTarget};
