//! Render-side data types and collaborator interfaces
//!
//! The batcher produces transient [`MeshData`] buffers, hands them to a
//! [`MeshPool`] for upload and caches the returned handles per render
//! target. Once per frame the manager condenses the caches into a
//! [`GuiRenderSnapshot`] which is handed to the render-side
//! [`GuiRenderBridge`] in a single ownership swap.

use std::collections::HashMap;

use crate::foundation::collections::WidgetId;
use crate::foundation::math::Mat4;

/// Identifier of a camera owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub u32);

/// Identifier of a texture owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Handle to a mesh allocated from a [`MeshPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// RGBA color with float components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
    /// Alpha component
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Create a color from components
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Sprite shader family a GUI quad renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteMaterial {
    /// Distance-field text material
    Text,
    /// Opaque image material
    Image,
    /// Alpha-blended image material
    ImageAlpha,
}

/// Material state of one render sub-element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteMaterialInfo {
    /// Shader family
    pub kind: SpriteMaterial,
    /// Texture bound to the material; entries without one are skipped at draw time
    pub texture: Option<TextureId>,
    /// Tint multiplied into the sprite color
    pub tint: Color,
}

impl Default for SpriteMaterialInfo {
    fn default() -> Self {
        Self {
            kind: SpriteMaterial::ImageAlpha,
            texture: None,
            tint: Color::WHITE,
        }
    }
}

impl SpriteMaterialInfo {
    /// Grouping key: two sub-elements may share a batch only with equal keys
    pub(crate) fn key(&self) -> MaterialKey {
        MaterialKey {
            kind: self.kind,
            texture: self.texture,
            tint: [
                self.tint.r.to_bits(),
                self.tint.g.to_bits(),
                self.tint.b.to_bits(),
                self.tint.a.to_bits(),
            ],
        }
    }
}

/// Hashable material identity used by the batcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MaterialKey {
    kind: SpriteMaterial,
    texture: Option<TextureId>,
    tint: [u32; 4],
}

/// Interleaved GUI vertex: screen-space position and texture coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GuiVertex {
    /// Position in widget-local pixels
    pub position: [f32; 2],
    /// Texture coordinates
    pub uv: [f32; 2],
}

/// CPU-side mesh buffer filled by the batcher
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex buffer, four vertices per quad
    pub vertices: Vec<GuiVertex>,
    /// Index buffer, six indices per quad
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create a zeroed buffer for the given quad count
    pub fn with_quads(num_quads: u32) -> Self {
        Self {
            vertices: vec![GuiVertex::default(); num_quads as usize * 4],
            indices: vec![0; num_quads as usize * 6],
        }
    }

    /// Vertex data as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Transient mesh allocator owned by the render backend
///
/// Allocation may fail under pool pressure; the batcher then skips the
/// affected group for the frame instead of aborting.
pub trait MeshPool {
    /// Upload mesh data, returning a handle valid until released
    fn allocate(&mut self, data: MeshData) -> Option<MeshHandle>;

    /// Release a previously allocated handle back to the pool
    fn release(&mut self, handle: MeshHandle);
}

/// Cached batching output for one render target
#[derive(Debug, Default)]
pub(crate) struct GuiRenderData {
    pub(crate) widgets: Vec<WidgetId>,
    pub(crate) dirty: bool,
    pub(crate) cached_meshes: Vec<Option<MeshHandle>>,
    pub(crate) cached_materials: Vec<SpriteMaterialInfo>,
    pub(crate) cached_widgets_per_mesh: Vec<Option<WidgetId>>,
}

impl GuiRenderData {
    /// Release every cached mesh back to the pool
    pub(crate) fn release_meshes(&mut self, pool: &mut dyn MeshPool) {
        for mesh in self.cached_meshes.drain(..).flatten() {
            pool.release(mesh);
        }
        self.cached_materials.clear();
        self.cached_widgets_per_mesh.clear();
    }
}

/// One draw call in a render snapshot
#[derive(Debug, Clone)]
pub struct GuiDrawEntry {
    /// Sprite shader family
    pub material: SpriteMaterial,
    /// Texture to bind
    pub texture: TextureId,
    /// Tint to apply
    pub tint: Color,
    /// Mesh to draw
    pub mesh: MeshHandle,
    /// World transform of the owning widget
    pub world_transform: Mat4,
}

/// Per-camera draw lists produced when any batch changed
///
/// Handed to the render side as one value; the router keeps no reference to
/// it afterwards.
#[derive(Debug, Default)]
pub struct GuiRenderSnapshot {
    /// Draw entries grouped by target camera, in draw order
    pub per_camera: HashMap<CameraId, Vec<GuiDrawEntry>>,
}

/// Renderer hooks for per-camera GUI draw callbacks
pub trait RenderCallbacks {
    /// Register a GUI draw callback for a camera at the given priority
    fn register_camera_callback(&mut self, camera: CameraId, priority: i32);

    /// Remove the GUI draw callback for a camera at the given priority
    fn unregister_camera_callback(&mut self, camera: CameraId, priority: i32);
}

/// Render-thread consumer of GUI snapshots
///
/// Applies each snapshot atomically and keeps renderer callbacks in sync
/// with the set of cameras that currently have GUI to draw.
#[derive(Debug, Default)]
pub struct GuiRenderBridge {
    per_camera: HashMap<CameraId, Vec<GuiDrawEntry>>,
    priority: i32,
}

impl GuiRenderBridge {
    /// Create a bridge registering callbacks at the given priority
    pub fn new(priority: i32) -> Self {
        Self {
            per_camera: HashMap::new(),
            priority,
        }
    }

    /// Swap in a new snapshot, registering and unregistering camera callbacks
    pub fn apply(&mut self, snapshot: GuiRenderSnapshot, callbacks: &mut dyn RenderCallbacks) {
        let stale: Vec<CameraId> = self
            .per_camera
            .keys()
            .filter(|camera| !snapshot.per_camera.contains_key(camera))
            .copied()
            .collect();

        for camera in stale {
            callbacks.unregister_camera_callback(camera, self.priority);
            self.per_camera.remove(&camera);
        }

        for (camera, entries) in snapshot.per_camera {
            if self.per_camera.insert(camera, entries).is_none() {
                callbacks.register_camera_callback(camera, self.priority);
            }
        }
    }

    /// Draw entries for one camera, in draw order
    pub fn entries(&self, camera: CameraId) -> &[GuiDrawEntry] {
        self.per_camera
            .get(&camera)
            .map_or(&[], |entries| entries.as_slice())
    }

    /// Unregister every remaining camera callback
    pub fn shutdown(&mut self, callbacks: &mut dyn RenderCallbacks) {
        for camera in self.per_camera.keys() {
            callbacks.unregister_camera_callback(*camera, self.priority);
        }
        self.per_camera.clear();
    }
}
