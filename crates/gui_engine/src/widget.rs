//! Widgets and render targets

use crate::foundation::collections::{ElementId, TargetId};
use crate::foundation::math::{Mat4, RectI, Vec2I};
use crate::render::CameraId;
use crate::platform::WindowId;

/// A render target a widget draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// An OS window surface
    Window(WindowId),
    /// An offscreen texture, possibly input-bridged into another widget
    Texture {
        /// Texture width in pixels
        width: u32,
        /// Texture height in pixels
        height: u32,
    },
}

/// Container of GUI elements bound to a single render target
///
/// Widgets own their world transform and a window-space bounds rectangle
/// used for coarse hit rejection before per-element tests run.
#[derive(Debug, Clone)]
pub struct GuiWidget {
    target: TargetId,
    camera: Option<CameraId>,
    world_transform: Mat4,
    bounds: RectI,
    pub(crate) elements: Vec<ElementId>,
    pub(crate) dirty: bool,
}

impl GuiWidget {
    /// Create a widget bound to a render target
    pub fn new(target: TargetId) -> Self {
        Self {
            target,
            camera: None,
            world_transform: Mat4::identity(),
            bounds: RectI::default(),
            elements: Vec::new(),
            dirty: true,
        }
    }

    /// Attach the camera whose viewport the widget's batches render through
    pub fn with_camera(mut self, camera: CameraId) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Set the widget's window-space bounds
    pub fn with_bounds(mut self, bounds: RectI) -> Self {
        self.bounds = bounds;
        self
    }

    /// The widget's render target
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// The camera the widget renders through, if any
    pub fn camera(&self) -> Option<CameraId> {
        self.camera
    }

    /// The widget's world transform
    pub fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }

    /// Replace the world transform, invalidating cached batches
    pub fn set_world_transform(&mut self, transform: Mat4) {
        self.world_transform = transform;
        self.dirty = true;
    }

    /// The widget's window-space bounds
    pub fn bounds(&self) -> RectI {
        self.bounds
    }

    /// Replace the window-space bounds
    pub fn set_bounds(&mut self, bounds: RectI) {
        self.bounds = bounds;
    }

    /// Coarse hit test in (bridged) window coordinates
    pub fn in_bounds(&self, pos: Vec2I) -> bool {
        self.bounds.contains(pos)
    }

    /// Elements owned by the widget, in registration order
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }
}
