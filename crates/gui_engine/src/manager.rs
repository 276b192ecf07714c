//! GUI manager: element lifetime, focus, frame update and render handoff
//!
//! The manager owns every widget and element behind stable slotmap handles
//! and drives the per-frame update. Pointer routing lives in the router
//! module and batching in the batching module; both operate on the state
//! declared here.
//!
//! Element handlers never call back into the manager. They queue side
//! effects on [`GuiActions`](crate::element::GuiActions) which the manager
//! absorbs after every dispatch, so destruction marks are visible before the
//! next element is considered while arena mutation stays outside iteration.

use std::collections::HashMap;
use std::mem;

use crate::config::GuiConfig;
use crate::dragdrop::{DragAndDrop, DragState};
use crate::element::{GuiActions, GuiElement};
use crate::error::{GuiError, GuiResult};
use crate::events::{
    CursorType, DragPayload, GuiCommandEvent, GuiModifiers, GuiMouseButton, GuiMouseEvent,
    GuiMouseEventKind, GuiTextInputEvent, GuiVirtualButtonEvent, InputCommand, VirtualButton,
};
use crate::foundation::collections::{ElementId, ElementMap, TargetId, TargetMap, WidgetId, WidgetMap};
use crate::foundation::math::{transform_point, Mat4, Vec2I};
use crate::foundation::time::FrameClock;
use crate::platform::{CursorHost, PlatformWindows, TooltipHost, WindowId};
use crate::render::{
    GuiDrawEntry, GuiRenderData, GuiRenderSnapshot, MeshPool,
};
use crate::widget::{GuiWidget, RenderTarget};

/// Bounded recursion through input bridges guards against bridge cycles
const MAX_BRIDGE_DEPTH: usize = 8;

/// External collaborators threaded through routing and update calls
///
/// The manager holds none of these between calls; the embedding application
/// owns them and lends them per call.
pub struct GuiIo<'a> {
    /// Window queries for hit-testing
    pub platform: &'a dyn PlatformWindows,
    /// Cursor glyph receiver
    pub cursor: &'a mut dyn CursorHost,
    /// Tooltip receiver
    pub tooltip: &'a mut dyn TooltipHost,
    /// Mesh allocator for batch rebuilds
    pub mesh_pool: &'a mut dyn MeshPool,
}

/// Arena slot for one element
pub(crate) struct ElementEntry {
    pub(crate) element: Box<dyn GuiElement>,
    pub(crate) widget: WidgetId,
    pub(crate) destroyed: bool,
}

/// Hover bookkeeping for one element under the pointer
///
/// `received_mouse_over` and `uses_mouse_over` carry across refreshes;
/// `is_hovering` is recomputed every refresh and marks the elements at or in
/// front of the first one that claimed the hover.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HoverInfo {
    pub(crate) element: ElementId,
    pub(crate) widget: WidgetId,
    pub(crate) depth: u32,
    pub(crate) received_mouse_over: bool,
    pub(crate) uses_mouse_over: bool,
    pub(crate) is_hovering: bool,
}

/// Focus bookkeeping for one focused element
#[derive(Debug, Clone, Copy)]
pub(crate) struct FocusInfo {
    pub(crate) element: ElementId,
    pub(crate) widget: WidgetId,
    pub(crate) uses_focus: bool,
}

/// An element participating in the current press
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveInfo {
    pub(crate) element: ElementId,
    pub(crate) widget: WidgetId,
}

/// Pending tooltip for the front-most hovered element
#[derive(Debug, Clone, Copy)]
pub(crate) struct TooltipState {
    pub(crate) element: ElementId,
    pub(crate) hover_start: f32,
    pub(crate) shown: bool,
    pub(crate) window_pos: Vec2I,
}

/// The retained GUI runtime
///
/// One instance serves every window and offscreen surface of the
/// application. All state mutation funnels through the routing entry points
/// and [`GuiManager::update`].
pub struct GuiManager {
    pub(crate) config: GuiConfig,
    pub(crate) targets: TargetMap<RenderTarget>,
    pub(crate) widgets: WidgetMap<GuiWidget>,
    pub(crate) widget_order: Vec<WidgetId>,
    pub(crate) elements: ElementMap<ElementEntry>,
    pub(crate) render_data: HashMap<TargetId, GuiRenderData>,
    pub(crate) core_dirty: bool,

    pub(crate) elements_under_pointer: Vec<HoverInfo>,
    pub(crate) elements_in_focus: Vec<FocusInfo>,
    pub(crate) active_elements: Vec<ActiveInfo>,
    pub(crate) active_mouse_button: Option<GuiMouseButton>,

    pub(crate) drag_state: DragState,
    pub(crate) last_pointer_click_pos: Vec2I,
    pub(crate) drag_start_pos: Vec2I,
    pub(crate) last_pointer_screen_pos: Vec2I,
    pub(crate) last_button_states: [bool; 3],
    pub(crate) last_modifiers: GuiModifiers,

    pub(crate) active_cursor: CursorType,
    pub(crate) drag_and_drop: DragAndDrop,
    pub(crate) destroy_queue: Vec<ElementId>,
    pub(crate) forced_focus: Vec<(ElementId, bool)>,
    pub(crate) input_bridges: HashMap<TargetId, ElementId>,
    pub(crate) actions: GuiActions,

    pub(crate) clock: FrameClock,
    pub(crate) caret_timer: f32,
    pub(crate) caret_visible: bool,
    pub(crate) tooltip: Option<TooltipState>,
    pub(crate) tooltip_hide_pending: bool,
}

impl Default for GuiManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GuiManager {
    /// Create a manager with default configuration
    pub fn new() -> Self {
        Self::with_config(GuiConfig::default())
    }

    /// Create a manager with the given configuration
    pub fn with_config(config: GuiConfig) -> Self {
        Self {
            config,
            targets: TargetMap::default(),
            widgets: WidgetMap::default(),
            widget_order: Vec::new(),
            elements: ElementMap::default(),
            render_data: HashMap::new(),
            core_dirty: false,
            elements_under_pointer: Vec::new(),
            elements_in_focus: Vec::new(),
            active_elements: Vec::new(),
            active_mouse_button: None,
            drag_state: DragState::NoDrag,
            last_pointer_click_pos: Vec2I::zeros(),
            drag_start_pos: Vec2I::zeros(),
            last_pointer_screen_pos: Vec2I::zeros(),
            last_button_states: [false; 3],
            last_modifiers: GuiModifiers::empty(),
            active_cursor: CursorType::Arrow,
            drag_and_drop: DragAndDrop::default(),
            destroy_queue: Vec::new(),
            forced_focus: Vec::new(),
            input_bridges: HashMap::new(),
            actions: GuiActions::default(),
            clock: FrameClock::new(),
            caret_timer: 0.0,
            caret_visible: true,
            tooltip: None,
            tooltip_hide_pending: false,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    /// Register a render target, returning its handle
    pub fn add_target(&mut self, target: RenderTarget) -> TargetId {
        self.targets.insert(target)
    }

    /// The render target behind a handle, if registered
    pub fn target(&self, id: TargetId) -> Option<&RenderTarget> {
        self.targets.get(id)
    }

    /// Register a widget; its target must already be registered
    pub fn register_widget(&mut self, widget: GuiWidget) -> GuiResult<WidgetId> {
        let target = widget.target();
        if !self.targets.contains_key(target) {
            return Err(GuiError::UnknownRenderTarget);
        }
        let id = self.widgets.insert(widget);
        self.widget_order.push(id);
        self.widgets[id].dirty = true;
        self.render_data.entry(target).or_default().widgets.push(id);
        Ok(id)
    }

    /// Remove a widget, queueing its elements for destruction
    ///
    /// When the last widget of a render target goes away its cached meshes
    /// are released immediately.
    pub fn unregister_widget(&mut self, id: WidgetId, pool: &mut dyn MeshPool) {
        let Some(widget) = self.widgets.remove(id) else {
            return;
        };
        let target = widget.target();
        self.widget_order.retain(|&w| w != id);

        for element in widget.elements {
            if let Some(entry) = self.elements.get_mut(element) {
                if !entry.destroyed {
                    entry.destroyed = true;
                    self.destroy_queue.push(element);
                }
            }
        }

        self.elements_under_pointer.retain(|h| h.widget != id);
        self.elements_in_focus.retain(|f| f.widget != id);
        self.active_elements.retain(|a| a.widget != id);
        if self.active_elements.is_empty() {
            self.active_mouse_button = None;
        }

        if let Some(data) = self.render_data.get_mut(&target) {
            data.widgets.retain(|&w| w != id);
            if data.widgets.is_empty() {
                data.release_meshes(pool);
                self.render_data.remove(&target);
            } else {
                data.dirty = true;
            }
        }
        self.core_dirty = true;
    }

    /// Shared access to a widget
    pub fn widget(&self, id: WidgetId) -> Option<&GuiWidget> {
        self.widgets.get(id)
    }

    /// Mutable access to a widget; callers changing its transform or bounds
    /// mark batches dirty through the widget itself
    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut GuiWidget> {
        self.widgets.get_mut(id)
    }

    /// Hand an element to the manager, attached to a widget
    pub fn add_element(
        &mut self,
        widget: WidgetId,
        element: Box<dyn GuiElement>,
    ) -> GuiResult<ElementId> {
        if !self.widgets.contains_key(widget) {
            return Err(GuiError::UnknownWidget);
        }
        let id = self.elements.insert(ElementEntry {
            element,
            widget,
            destroyed: false,
        });
        let owner = &mut self.widgets[widget];
        owner.elements.push(id);
        owner.dirty = true;
        Ok(id)
    }

    /// Queue an element for destruction at the next update fixed point
    ///
    /// The element stops receiving events immediately.
    pub fn queue_for_destroy(&mut self, id: ElementId) {
        if let Some(entry) = self.elements.get_mut(id) {
            if !entry.destroyed {
                entry.destroyed = true;
                self.destroy_queue.push(id);
            }
        }
    }

    /// Whether an element handle is still alive
    pub fn is_element_alive(&self, id: ElementId) -> bool {
        self.elements.get(id).map_or(false, |e| !e.destroyed)
    }

    /// Request a focus change, applied at the next update fixed point
    pub fn set_focus(&mut self, element: ElementId, focus: bool) {
        self.forced_focus.push((element, focus));
    }

    /// Elements currently holding input focus, front-most first
    pub fn focused_elements(&self) -> Vec<ElementId> {
        self.elements_in_focus.iter().map(|f| f.element).collect()
    }

    /// Begin a drag-and-drop payload session
    ///
    /// A session already in progress is replaced.
    pub fn start_drag_and_drop(
        &mut self,
        type_id: u32,
        payload: DragPayload,
        needs_valid_drop_target: bool,
    ) {
        self.drag_and_drop
            .start_drag(type_id, payload, needs_valid_drop_target);
    }

    /// Whether a drag-and-drop payload session is active
    pub fn is_drag_in_progress(&self) -> bool {
        self.drag_and_drop.is_drag_in_progress()
    }

    /// Route pointer input landing on a texture target through the given
    /// element, which is expected to display that texture
    pub fn set_input_bridge(&mut self, target: TargetId, element: ElementId) {
        self.input_bridges.insert(target, element);
    }

    /// Remove the input bridge for a texture target
    pub fn clear_input_bridge(&mut self, target: TargetId) {
        self.input_bridges.remove(&target);
    }

    /// The current pointer drag state
    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    /// Current caret blink phase; text elements query this when repainting
    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    /// Advance the GUI by one frame
    ///
    /// Runs layout, drains the destruction and forced-focus queues to a
    /// fixed point, ticks the caret and tooltip timers and rebuilds dirty
    /// batches. Returns a fresh render snapshot when any batch changed.
    pub fn update(&mut self, delta_time: f32, io: &mut GuiIo<'_>) -> Option<GuiRenderSnapshot> {
        self.clock.advance(delta_time);

        if self.tooltip_hide_pending {
            io.tooltip.hide();
            self.tooltip_hide_pending = false;
        }

        // layout sweep
        let widget_ids: Vec<WidgetId> = self.widget_order.clone();
        for widget_id in widget_ids {
            let Some(widget) = self.widgets.get(widget_id) else {
                continue;
            };
            let element_ids = widget.elements.clone();
            let mut any_dirty = false;
            for element_id in element_ids {
                if let Some(entry) = self.elements.get_mut(element_id) {
                    if entry.destroyed {
                        continue;
                    }
                    entry.element.update_layout();
                    if entry.element.take_dirty() {
                        any_dirty = true;
                    }
                }
            }
            if any_dirty {
                if let Some(widget) = self.widgets.get_mut(widget_id) {
                    widget.dirty = true;
                }
            }
        }

        // destruction and forced focus interleave until both queues drain
        loop {
            let destroyed = self.process_destroy_queue();
            let focused = self.apply_forced_focus();
            if !destroyed && !focused {
                break;
            }
        }

        // caret blink drives a redraw of focused elements
        if self.elements_in_focus.is_empty() {
            self.caret_timer = 0.0;
            self.caret_visible = true;
        } else if self.config.caret_blink_interval > 0.0 {
            self.caret_timer += delta_time;
            while self.caret_timer >= self.config.caret_blink_interval {
                self.caret_timer -= self.config.caret_blink_interval;
                self.caret_visible = !self.caret_visible;
                let focused: Vec<ElementId> =
                    self.elements_in_focus.iter().map(|f| f.element).collect();
                for id in focused {
                    self.dispatch_command(id, GuiCommandEvent::Redraw);
                }
            }
        }

        // tooltip delay; holding ctrl shows it immediately
        let show = match &self.tooltip {
            Some(state)
                if !state.shown
                    && (self.clock.total_time() - state.hover_start
                        >= self.config.tooltip_hover_time
                        || self.last_modifiers.contains(GuiModifiers::CTRL)) =>
            {
                Some((state.element, state.window_pos))
            }
            _ => None,
        };
        if let Some((element, window_pos)) = show {
            if let Some(entry) = self.elements.get(element) {
                if !entry.destroyed {
                    if let Some(text) = entry.element.tooltip() {
                        io.tooltip.show(entry.widget, window_pos, &text);
                    }
                }
            }
            if let Some(state) = &mut self.tooltip {
                state.shown = true;
            }
        }

        // handlers above may have queued more destruction
        while self.process_destroy_queue() {}

        self.update_meshes(io.mesh_pool);

        if self.core_dirty {
            self.core_dirty = false;
            Some(self.build_snapshot())
        } else {
            None
        }
    }

    /// Dispatch a typed character to every focused element
    pub fn route_text_input(&mut self, character: char) -> bool {
        let event = GuiTextInputEvent { character };
        let targets: Vec<ElementId> = self.elements_in_focus.iter().map(|f| f.element).collect();
        let mut consumed = false;
        for id in targets {
            if self.dispatch_text(id, &event) {
                consumed = true;
            }
        }
        consumed
    }

    /// Dispatch an editing or navigation command to every focused element
    pub fn route_input_command(&mut self, command: InputCommand) -> bool {
        if let Some(state) = self.tooltip.take() {
            if state.shown {
                self.tooltip_hide_pending = true;
            }
        }
        let event = GuiCommandEvent::from(command);
        let targets: Vec<ElementId> = self.elements_in_focus.iter().map(|f| f.element).collect();
        let mut consumed = false;
        for id in targets {
            if self.dispatch_command(id, event) {
                consumed = true;
            }
        }
        consumed
    }

    /// Dispatch a virtual button press to the focused elements, stopping at
    /// the first consumer
    pub fn route_virtual_button(&mut self, button: VirtualButton) -> bool {
        if let Some(state) = self.tooltip.take() {
            if state.shown {
                self.tooltip_hide_pending = true;
            }
        }
        let event = GuiVirtualButtonEvent { button };
        let targets: Vec<ElementId> = self.elements_in_focus.iter().map(|f| f.element).collect();
        for id in targets {
            if self.dispatch_virtual_button(id, &event) {
                return true;
            }
        }
        false
    }

    /// Drop focus from every element living in the given window
    pub fn notify_window_focus_lost(&mut self, window: WindowId) {
        let focus = mem::take(&mut self.elements_in_focus);
        let (lost, kept): (Vec<FocusInfo>, Vec<FocusInfo>) = focus
            .into_iter()
            .partition(|f| self.widget_window(f.widget) == Some(window));
        self.elements_in_focus = kept;
        for info in lost {
            self.dispatch_command(info.element, GuiCommandEvent::FocusLost);
        }
    }

    /// Sweep hover state out of a window the pointer left
    ///
    /// Skipped while a button is held so drags survive leaving the window.
    pub fn notify_mouse_left_window(&mut self, window: WindowId, io: &mut GuiIo<'_>) {
        if !self.active_elements.is_empty() {
            return;
        }

        let hovered = mem::take(&mut self.elements_under_pointer);
        let (out, kept): (Vec<HoverInfo>, Vec<HoverInfo>) = hovered
            .into_iter()
            .partition(|h| self.widget_window(h.widget) == Some(window));
        self.elements_under_pointer = kept;

        for info in out {
            if !info.received_mouse_over {
                continue;
            }
            let Some(local) =
                self.widget_relative_pos(info.widget, self.last_pointer_screen_pos, io.platform)
            else {
                continue;
            };
            let event = self.make_mouse_event(GuiMouseEventKind::MouseOut { local_pos: local });
            self.dispatch_mouse(info.element, &event);
        }

        if let Some(state) = self.tooltip.take() {
            if state.shown {
                io.tooltip.hide();
            }
        }

        if self.elements_under_pointer.is_empty() && self.active_cursor != CursorType::Arrow {
            io.cursor.set_cursor(CursorType::Arrow);
            self.active_cursor = CursorType::Arrow;
        }
    }

    /// Destroy everything and release all cached meshes
    pub fn shutdown(&mut self, pool: &mut dyn MeshPool) {
        let ids: Vec<ElementId> = self.elements.keys().collect();
        for id in ids {
            self.queue_for_destroy(id);
        }
        while self.process_destroy_queue() {}

        for data in self.render_data.values_mut() {
            data.release_meshes(pool);
        }
        self.render_data.clear();
        self.widgets.clear();
        self.widget_order.clear();
        self.targets.clear();
        self.input_bridges.clear();
        self.elements_under_pointer.clear();
        self.elements_in_focus.clear();
        self.active_elements.clear();
        self.active_mouse_button = None;
        self.drag_state = DragState::NoDrag;
        self.drag_and_drop.end_drag();
        self.forced_focus.clear();
        self.tooltip = None;
        self.core_dirty = false;
    }

    /// The OS window a widget ultimately renders into, resolved through
    /// input bridges
    pub fn widget_window(&self, widget: WidgetId) -> Option<WindowId> {
        let widget = self.widgets.get(widget)?;
        self.target_window(widget.target())
    }

    /// The OS window behind a render target, resolved through input bridges
    pub fn target_window(&self, target: TargetId) -> Option<WindowId> {
        self.target_window_inner(target, 0)
    }

    fn target_window_inner(&self, target: TargetId, depth: usize) -> Option<WindowId> {
        if depth > MAX_BRIDGE_DEPTH {
            log::warn!("input bridge chain exceeds {MAX_BRIDGE_DEPTH} hops; treating as unbound");
            return None;
        }
        match self.targets.get(target)? {
            RenderTarget::Window(window) => Some(*window),
            RenderTarget::Texture { .. } => {
                let bridge = *self.input_bridges.get(&target)?;
                let owner = self.elements.get(bridge)?.widget;
                let parent = self.widgets.get(owner)?.target();
                self.target_window_inner(parent, depth + 1)
            }
        }
    }

    /// Remap a window-local position into the coordinate space of a render
    /// target, following input bridges for offscreen textures
    pub(crate) fn window_to_bridged_coords(
        &self,
        target: TargetId,
        window_pos: Vec2I,
    ) -> Option<Vec2I> {
        self.bridged_coords_inner(target, window_pos, 0)
    }

    fn bridged_coords_inner(
        &self,
        target: TargetId,
        window_pos: Vec2I,
        depth: usize,
    ) -> Option<Vec2I> {
        if depth > MAX_BRIDGE_DEPTH {
            return None;
        }
        match self.targets.get(target)? {
            RenderTarget::Window(_) => Some(window_pos),
            RenderTarget::Texture { width, height } => {
                let (width, height) = (*width, *height);
                let bridge = *self.input_bridges.get(&target)?;
                let entry = self.elements.get(bridge)?;
                let parent = self.widgets.get(entry.widget)?;
                let parent_pos =
                    self.bridged_coords_inner(parent.target(), window_pos, depth + 1)?;
                let inverse = parent.world_transform().try_inverse()?;
                let parent_local = transform_point(&inverse, parent_pos);

                let bounds = entry.element.bounds();
                if bounds.width <= 0 || bounds.height <= 0 {
                    return None;
                }
                let rel = parent_local - Vec2I::new(bounds.x, bounds.y);
                Some(Vec2I::new(
                    rel.x * width as i32 / bounds.width,
                    rel.y * height as i32 / bounds.height,
                ))
            }
        }
    }

    /// Convert a screen position into a widget's local coordinate space
    pub fn widget_relative_pos(
        &self,
        widget: WidgetId,
        screen_pos: Vec2I,
        platform: &dyn PlatformWindows,
    ) -> Option<Vec2I> {
        let widget_ref = self.widgets.get(widget)?;
        let window = self.target_window(widget_ref.target())?;
        let window_pos = platform.screen_to_window_pos(window, screen_pos);
        let bridged = self.window_to_bridged_coords(widget_ref.target(), window_pos)?;
        let inverse = widget_ref.world_transform().try_inverse()?;
        Some(transform_point(&inverse, bridged))
    }

    // ---- dispatch plumbing ----

    pub(crate) fn make_mouse_event(&self, kind: GuiMouseEventKind) -> GuiMouseEvent {
        GuiMouseEvent::new(kind, self.last_button_states, self.last_modifiers)
    }

    pub(crate) fn dispatch_mouse(&mut self, target: ElementId, event: &GuiMouseEvent) -> bool {
        let Some(entry) = self.elements.get_mut(target) else {
            return false;
        };
        if entry.destroyed {
            return false;
        }
        self.actions.current_element = target;
        let consumed = entry.element.mouse_event(event, &mut self.actions);
        self.absorb_actions();
        consumed
    }

    pub(crate) fn dispatch_command(&mut self, target: ElementId, event: GuiCommandEvent) -> bool {
        let Some(entry) = self.elements.get_mut(target) else {
            return false;
        };
        if entry.destroyed {
            return false;
        }
        self.actions.current_element = target;
        let consumed = entry.element.command_event(event, &mut self.actions);
        self.absorb_actions();
        consumed
    }

    fn dispatch_text(&mut self, target: ElementId, event: &GuiTextInputEvent) -> bool {
        let Some(entry) = self.elements.get_mut(target) else {
            return false;
        };
        if entry.destroyed {
            return false;
        }
        self.actions.current_element = target;
        let consumed = entry.element.text_event(event, &mut self.actions);
        self.absorb_actions();
        consumed
    }

    fn dispatch_virtual_button(
        &mut self,
        target: ElementId,
        event: &GuiVirtualButtonEvent,
    ) -> bool {
        let Some(entry) = self.elements.get_mut(target) else {
            return false;
        };
        if entry.destroyed {
            return false;
        }
        self.actions.current_element = target;
        let consumed = entry.element.virtual_button_event(event, &mut self.actions);
        self.absorb_actions();
        consumed
    }

    /// Move queued side effects from the action queue into manager state
    pub(crate) fn absorb_actions(&mut self) {
        for id in mem::take(&mut self.actions.destroy) {
            if let Some(entry) = self.elements.get_mut(id) {
                if !entry.destroyed {
                    entry.destroyed = true;
                    self.destroy_queue.push(id);
                }
            }
        }
        let focus_changes = mem::take(&mut self.actions.focus_changes);
        self.forced_focus.extend(focus_changes);
        for widget in mem::take(&mut self.actions.dirty_widgets) {
            if let Some(widget) = self.widgets.get_mut(widget) {
                widget.dirty = true;
            }
        }
        if let Some((type_id, payload, needs_target)) = self.actions.pending_drag.take() {
            self.drag_and_drop.start_drag(type_id, payload, needs_target);
        }
    }

    /// Drain the destruction queue once; returns whether anything died
    ///
    /// `on_destroyed` handlers may queue further destruction, which lands in
    /// the queue for the next drain.
    pub(crate) fn process_destroy_queue(&mut self) -> bool {
        let queue = mem::take(&mut self.destroy_queue);
        if queue.is_empty() {
            return false;
        }
        let mut any = false;
        for id in queue {
            let Some(entry) = self.elements.get_mut(id) else {
                continue;
            };
            entry.destroyed = true;
            let widget_id = entry.widget;
            self.actions.current_element = id;
            entry.element.on_destroyed(&mut self.actions);
            self.absorb_actions();

            self.elements_under_pointer.retain(|h| h.element != id);
            self.elements_in_focus.retain(|f| f.element != id);
            self.active_elements.retain(|a| a.element != id);
            if self.active_elements.is_empty() {
                self.active_mouse_button = None;
            }
            if self.tooltip.map_or(false, |t| t.element == id) {
                if self.tooltip.map_or(false, |t| t.shown) {
                    self.tooltip_hide_pending = true;
                }
                self.tooltip = None;
            }
            if let Some(widget) = self.widgets.get_mut(widget_id) {
                widget.elements.retain(|&e| e != id);
                widget.dirty = true;
            }
            self.elements.remove(id);
            any = true;
        }
        any
    }

    /// Apply queued focus changes; returns whether any element was notified
    fn apply_forced_focus(&mut self) -> bool {
        let requests = mem::take(&mut self.forced_focus);
        if requests.is_empty() {
            return false;
        }
        let mut any = false;
        for (element, enable) in requests {
            let already = self.elements_in_focus.iter().any(|f| f.element == element);
            if enable && !already {
                let Some(entry) = self.elements.get(element) else {
                    continue;
                };
                if entry.destroyed {
                    continue;
                }
                let widget = entry.widget;
                let uses_focus = self.dispatch_command(element, GuiCommandEvent::FocusGained);
                self.elements_in_focus.insert(
                    0,
                    FocusInfo {
                        element,
                        widget,
                        uses_focus,
                    },
                );
                any = true;
            } else if !enable && already {
                self.elements_in_focus.retain(|f| f.element != element);
                self.dispatch_command(element, GuiCommandEvent::FocusLost);
                any = true;
            }
        }
        any
    }

    /// Condense cached batches into per-camera draw lists
    pub(crate) fn build_snapshot(&self) -> GuiRenderSnapshot {
        let mut snapshot = GuiRenderSnapshot::default();
        for data in self.render_data.values() {
            for (idx, mesh) in data.cached_meshes.iter().enumerate() {
                let Some(mesh) = *mesh else { continue };
                let material = data.cached_materials[idx];
                let Some(texture) = material.texture else {
                    continue;
                };
                // batches spanning widgets are pre-transformed to window space
                let (widget_id, world) = match data.cached_widgets_per_mesh[idx] {
                    Some(widget) => (Some(widget), None),
                    None => (data.widgets.first().copied(), Some(Mat4::identity())),
                };
                let Some(widget_id) = widget_id else { continue };
                let Some(widget) = self.widgets.get(widget_id) else {
                    continue;
                };
                let Some(camera) = widget.camera() else {
                    continue;
                };
                let world_transform = world.unwrap_or_else(|| *widget.world_transform());
                snapshot
                    .per_camera
                    .entry(camera)
                    .or_default()
                    .push(GuiDrawEntry {
                        material: material.kind,
                        texture,
                        tint: material.tint,
                        mesh,
                        world_transform,
                    });
            }
        }
        snapshot
    }
}
