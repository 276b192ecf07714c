//! GUI element trait and deferred action queue

use crate::events::{
    CursorType, DragPayload, GuiCommandEvent, GuiMouseEvent, GuiTextInputEvent,
    GuiVirtualButtonEvent,
};
use crate::foundation::collections::{ElementId, WidgetId};
use crate::foundation::math::{RectI, Vec2I};
use crate::render::{GuiVertex, SpriteMaterialInfo};

/// A single interactive/visual primitive owned by a widget
///
/// Elements are stored behind stable [`ElementId`] handles in the GUI
/// manager's arena. Event handlers may not call back into the manager while
/// it is dispatching; side effects (destroying elements, changing focus,
/// starting a drag) are queued on [`GuiActions`] instead and drained by the
/// manager at a fixed point after dispatch.
///
/// An element may consist of several render sub-elements, each contributing
/// its own quads and material to the batcher (per-glyph text runs are the
/// typical case).
pub trait GuiElement {
    /// Paint-order key. Lower values draw later, i.e. closer to the viewer.
    fn depth(&self) -> u32;

    /// Layout area in widget-local coordinates
    fn bounds(&self) -> RectI;

    /// Whether the element takes part in hit-testing and rendering
    fn is_visible(&self) -> bool {
        true
    }

    /// Bounds after clipping by parent containers, widget-local
    fn clipped_bounds(&self) -> RectI {
        self.bounds()
    }

    /// Hit test in widget-local coordinates
    fn in_bounds(&self, local_pos: Vec2I) -> bool {
        self.clipped_bounds().contains(local_pos)
    }

    /// Number of independently batched render pieces
    fn num_render_elements(&self) -> u32 {
        0
    }

    /// Paint depth of one render sub-element
    fn render_element_depth(&self, render_element: u32) -> u32 {
        let _ = render_element;
        self.depth()
    }

    /// Number of quads one render sub-element contributes
    fn num_quads(&self, render_element: u32) -> u32 {
        let _ = render_element;
        0
    }

    /// Material of one render sub-element
    fn material(&self, render_element: u32) -> SpriteMaterialInfo {
        let _ = render_element;
        SpriteMaterialInfo::default()
    }

    /// Write the sub-element's quads into a batch buffer
    ///
    /// Vertices go to `vertices[quad_offset * 4 ..]` and indices to
    /// `indices[quad_offset * 6 ..]`. Indices are written relative to the
    /// element's own first vertex; the batcher rebases them.
    fn fill_buffer(
        &self,
        vertices: &mut [GuiVertex],
        indices: &mut [u32],
        quad_offset: u32,
        total_quads: u32,
        render_element: u32,
    ) {
        let _ = (vertices, indices, quad_offset, total_quads, render_element);
    }

    /// Per-frame layout refresh, called before event sweeps
    fn update_layout(&mut self) {}

    /// Return and clear the element's paint-dirty flag
    fn take_dirty(&mut self) -> bool {
        false
    }

    /// Handle a synthetic mouse event; return true to consume it
    fn mouse_event(&mut self, event: &GuiMouseEvent, actions: &mut GuiActions) -> bool {
        let _ = (event, actions);
        false
    }

    /// Handle a command event; return true to consume it
    fn command_event(&mut self, event: GuiCommandEvent, actions: &mut GuiActions) -> bool {
        let _ = (event, actions);
        false
    }

    /// Handle a text input event; return true to consume it
    fn text_event(&mut self, event: &GuiTextInputEvent, actions: &mut GuiActions) -> bool {
        let _ = (event, actions);
        false
    }

    /// Handle a virtual button event; return true to consume it
    fn virtual_button_event(
        &mut self,
        event: &GuiVirtualButtonEvent,
        actions: &mut GuiActions,
    ) -> bool {
        let _ = (event, actions);
        false
    }

    /// Whether the element would accept a drag-and-drop payload of this type
    fn accept_drag_and_drop(&self, local_pos: Vec2I, type_id: u32) -> bool {
        let _ = (local_pos, type_id);
        false
    }

    /// Cursor to show while the pointer hovers this position, if any
    fn custom_cursor(&self, local_pos: Vec2I) -> Option<CursorType> {
        let _ = local_pos;
        None
    }

    /// Tooltip text to show after a hover delay, if any
    fn tooltip(&self) -> Option<String> {
        None
    }

    /// Called while the element is being destroyed; may queue further work
    fn on_destroyed(&mut self, actions: &mut GuiActions) {
        let _ = actions;
    }
}

/// Deferred side effects queued by element handlers during dispatch
///
/// The manager drains the queue after every dispatch, so destruction marks
/// become visible before the next element is considered, while the actual
/// mutation of arenas and focus state happens outside iteration.
#[derive(Default)]
pub struct GuiActions {
    pub(crate) current_element: ElementId,
    pub(crate) destroy: Vec<ElementId>,
    pub(crate) focus_changes: Vec<(ElementId, bool)>,
    pub(crate) dirty_widgets: Vec<WidgetId>,
    pub(crate) pending_drag: Option<(u32, DragPayload, bool)>,
}

impl GuiActions {
    /// The element currently being dispatched to
    pub fn element(&self) -> ElementId {
        self.current_element
    }

    /// Queue an element for deferred destruction
    pub fn queue_destroy(&mut self, element: ElementId) {
        self.destroy.push(element);
    }

    /// Queue the currently dispatched element for deferred destruction
    pub fn queue_destroy_self(&mut self) {
        let element = self.current_element;
        self.destroy.push(element);
    }

    /// Request a focus change, applied once per frame before press handling
    pub fn set_focus(&mut self, element: ElementId, focus: bool) {
        self.focus_changes.push((element, focus));
    }

    /// Mark a widget's batches as needing a rebuild
    pub fn mark_dirty(&mut self, widget: WidgetId) {
        self.dirty_widgets.push(widget);
    }

    /// Begin a drag-and-drop payload session
    pub fn start_drag(&mut self, type_id: u32, payload: DragPayload, needs_valid_drop_target: bool) {
        self.pending_drag = Some((type_id, payload, needs_valid_drop_target));
    }
}
