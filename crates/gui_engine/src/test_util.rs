//! Shared fixtures for manager, router and batching tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::element::{GuiActions, GuiElement};
use crate::events::{
    CursorType, GuiCommandEvent, GuiMouseEvent, GuiMouseEventKind, GuiTextInputEvent,
    GuiVirtualButtonEvent, PointerEvent,
};
use crate::foundation::collections::{ElementId, TargetId, WidgetId};
use crate::foundation::math::{RectI, Vec2I};
use crate::manager::{GuiIo, GuiManager};
use crate::platform::{CursorHost, PlatformWindows, TooltipHost, WindowId};
use crate::render::{CameraId, GuiVertex, MeshData, MeshHandle, MeshPool, SpriteMaterialInfo};
use crate::widget::{GuiWidget, RenderTarget};

pub(crate) type EventLog = Rc<RefCell<Vec<String>>>;

/// Behavior knobs for a scripted test element
#[derive(Default, Clone)]
pub(crate) struct ElementScript {
    pub consume_mouse: bool,
    pub consume_down: bool,
    pub consume_focus: bool,
    pub consume_commands: bool,
    pub consume_text: bool,
    pub consume_virtual: bool,
    pub accept_drop_type: Option<u32>,
    pub cursor: Option<CursorType>,
    pub tooltip: Option<String>,
    pub destroy_on_mouse_down: bool,
    pub destroy_on_death: Vec<ElementId>,
    /// Render sub-elements as (depth, material, quad count)
    pub render: Vec<(u32, SpriteMaterialInfo, u32)>,
}

/// Scripted element that records every event it receives
pub(crate) struct TestElement {
    pub label: &'static str,
    pub depth: u32,
    pub bounds: RectI,
    pub visible: bool,
    pub script: ElementScript,
    pub log: EventLog,
}

impl TestElement {
    pub fn new(label: &'static str, depth: u32, bounds: RectI, log: &EventLog) -> Self {
        Self {
            label,
            depth,
            bounds,
            visible: true,
            script: ElementScript::default(),
            log: Rc::clone(log),
        }
    }

    fn record(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.label, what));
    }
}

fn mouse_event_name(kind: &GuiMouseEventKind) -> &'static str {
    match kind {
        GuiMouseEventKind::MouseOver { .. } => "MouseOver",
        GuiMouseEventKind::MouseOut { .. } => "MouseOut",
        GuiMouseEventKind::MouseMove { .. } => "MouseMove",
        GuiMouseEventKind::MouseWheel { .. } => "MouseWheel",
        GuiMouseEventKind::MouseDown { .. } => "MouseDown",
        GuiMouseEventKind::MouseUp { .. } => "MouseUp",
        GuiMouseEventKind::MouseDoubleClick { .. } => "MouseDoubleClick",
        GuiMouseEventKind::MouseDragStart { .. } => "MouseDragStart",
        GuiMouseEventKind::MouseDrag { .. } => "MouseDrag",
        GuiMouseEventKind::MouseDragEnd { .. } => "MouseDragEnd",
        GuiMouseEventKind::DragAndDropDragged { .. } => "DragAndDropDragged",
        GuiMouseEventKind::DragAndDropDropped { .. } => "DragAndDropDropped",
        GuiMouseEventKind::DragAndDropLeft { .. } => "DragAndDropLeft",
    }
}

impl GuiElement for TestElement {
    fn depth(&self) -> u32 {
        self.depth
    }

    fn bounds(&self) -> RectI {
        self.bounds
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn num_render_elements(&self) -> u32 {
        self.script.render.len() as u32
    }

    fn render_element_depth(&self, render_element: u32) -> u32 {
        self.script.render[render_element as usize].0
    }

    fn num_quads(&self, render_element: u32) -> u32 {
        self.script.render[render_element as usize].2
    }

    fn material(&self, render_element: u32) -> SpriteMaterialInfo {
        self.script.render[render_element as usize].1
    }

    fn fill_buffer(
        &self,
        vertices: &mut [GuiVertex],
        indices: &mut [u32],
        quad_offset: u32,
        _total_quads: u32,
        render_element: u32,
    ) {
        let num_quads = self.num_quads(render_element);
        for quad in 0..num_quads {
            let vert_base = ((quad_offset + quad) * 4) as usize;
            for corner in 0..4u32 {
                vertices[vert_base + corner as usize] = GuiVertex {
                    position: [self.bounds.x as f32 + quad as f32, corner as f32],
                    uv: [0.0, 0.0],
                };
            }
            // indices local to this element's first vertex
            let local_base = quad * 4;
            let index_base = ((quad_offset + quad) * 6) as usize;
            let pattern = [0, 1, 2, 2, 1, 3];
            for (slot, offset) in pattern.iter().enumerate() {
                indices[index_base + slot] = local_base + offset;
            }
        }
    }

    fn mouse_event(&mut self, event: &GuiMouseEvent, actions: &mut GuiActions) -> bool {
        if let GuiMouseEventKind::MouseDrag { drag_amount, .. } = event.kind {
            self.record(&format!("MouseDrag({},{})", drag_amount.x, drag_amount.y));
        } else {
            self.record(mouse_event_name(&event.kind));
        }
        if self.script.destroy_on_mouse_down {
            if let GuiMouseEventKind::MouseDown { .. } = event.kind {
                actions.queue_destroy_self();
            }
        }
        if let GuiMouseEventKind::MouseDown { .. } = event.kind {
            return self.script.consume_mouse || self.script.consume_down;
        }
        self.script.consume_mouse
    }

    fn command_event(&mut self, event: GuiCommandEvent, _actions: &mut GuiActions) -> bool {
        self.record(&format!("{event:?}"));
        match event {
            GuiCommandEvent::FocusGained => self.script.consume_focus,
            GuiCommandEvent::FocusLost => false,
            _ => self.script.consume_commands,
        }
    }

    fn text_event(&mut self, event: &GuiTextInputEvent, _actions: &mut GuiActions) -> bool {
        self.record(&format!("Text({})", event.character));
        self.script.consume_text
    }

    fn virtual_button_event(
        &mut self,
        event: &GuiVirtualButtonEvent,
        _actions: &mut GuiActions,
    ) -> bool {
        self.record(&format!("VirtualButton({})", event.button.0));
        self.script.consume_virtual
    }

    fn accept_drag_and_drop(&self, _local_pos: Vec2I, type_id: u32) -> bool {
        self.script.accept_drop_type == Some(type_id)
    }

    fn custom_cursor(&self, _local_pos: Vec2I) -> Option<CursorType> {
        self.script.cursor
    }

    fn tooltip(&self) -> Option<String> {
        self.script.tooltip.clone()
    }

    fn on_destroyed(&mut self, actions: &mut GuiActions) {
        self.record("Destroyed");
        for &other in &self.script.destroy_on_death {
            actions.queue_destroy(other);
        }
    }
}

/// Platform stub mapping windows to screen rectangles
#[derive(Default)]
pub(crate) struct TestPlatform {
    pub windows: Vec<(WindowId, RectI)>,
}

impl PlatformWindows for TestPlatform {
    fn is_point_over_window(&self, window: WindowId, screen_pos: Vec2I) -> bool {
        self.windows
            .iter()
            .any(|(w, rect)| *w == window && rect.contains(screen_pos))
    }

    fn screen_to_window_pos(&self, window: WindowId, screen_pos: Vec2I) -> Vec2I {
        self.windows
            .iter()
            .find(|(w, _)| *w == window)
            .map_or(screen_pos, |(_, rect)| {
                screen_pos - Vec2I::new(rect.x, rect.y)
            })
    }

    fn window_exists(&self, window: WindowId) -> bool {
        self.windows.iter().any(|(w, _)| *w == window)
    }
}

#[derive(Default)]
pub(crate) struct RecordingCursor {
    pub changes: Vec<CursorType>,
}

impl CursorHost for RecordingCursor {
    fn set_cursor(&mut self, cursor: CursorType) {
        self.changes.push(cursor);
    }
}

#[derive(Default)]
pub(crate) struct RecordingTooltip {
    pub shown: Vec<(WidgetId, Vec2I, String)>,
    pub hides: usize,
}

impl TooltipHost for RecordingTooltip {
    fn show(&mut self, widget: WidgetId, window_pos: Vec2I, text: &str) {
        self.shown.push((widget, window_pos, text.to_string()));
    }

    fn hide(&mut self) {
        self.hides += 1;
    }
}

/// Mesh pool stub tracking live handles and keeping uploaded data
#[derive(Default)]
pub(crate) struct CountingMeshPool {
    next: u64,
    pub live: HashSet<u64>,
    pub released: Vec<u64>,
    pub fail_next: bool,
    pub uploads: HashMap<u64, MeshData>,
}

impl MeshPool for CountingMeshPool {
    fn allocate(&mut self, data: MeshData) -> Option<MeshHandle> {
        if self.fail_next {
            self.fail_next = false;
            return None;
        }
        self.next += 1;
        self.live.insert(self.next);
        self.uploads.insert(self.next, data);
        Some(MeshHandle(self.next))
    }

    fn release(&mut self, handle: MeshHandle) {
        self.live.remove(&handle.0);
        self.released.push(handle.0);
    }
}

/// Manager plus stub collaborators wired together
pub(crate) struct Harness {
    pub manager: GuiManager,
    pub platform: TestPlatform,
    pub cursor: RecordingCursor,
    pub tooltip: RecordingTooltip,
    pub pool: CountingMeshPool,
    pub log: EventLog,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            manager: GuiManager::new(),
            platform: TestPlatform::default(),
            cursor: RecordingCursor::default(),
            tooltip: RecordingTooltip::default(),
            pool: CountingMeshPool::default(),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register a window target covering the given screen rectangle
    pub fn add_window(&mut self, window: WindowId, screen_rect: RectI) -> TargetId {
        self.platform.windows.push((window, screen_rect));
        self.manager.add_target(RenderTarget::Window(window))
    }

    /// Register a widget with a camera, spanning the given window-space bounds
    pub fn add_widget(&mut self, target: TargetId, bounds: RectI) -> WidgetId {
        self.manager
            .register_widget(
                GuiWidget::new(target)
                    .with_camera(CameraId(1))
                    .with_bounds(bounds),
            )
            .expect("target registered")
    }

    /// Add a plain recording element
    pub fn add_element(
        &mut self,
        widget: WidgetId,
        label: &'static str,
        depth: u32,
        bounds: RectI,
    ) -> ElementId {
        let element = TestElement::new(label, depth, bounds, &self.log);
        self.add_scripted(widget, element)
    }

    /// Add a pre-configured element
    pub fn add_scripted(&mut self, widget: WidgetId, element: TestElement) -> ElementId {
        self.manager
            .add_element(widget, Box::new(element))
            .expect("widget registered")
    }

    pub fn route_move(&mut self, event: &PointerEvent) -> bool {
        let mut io = GuiIo {
            platform: &self.platform,
            cursor: &mut self.cursor,
            tooltip: &mut self.tooltip,
            mesh_pool: &mut self.pool,
        };
        self.manager.route_move(event, &mut io)
    }

    pub fn route_press(&mut self, event: &PointerEvent) -> bool {
        let mut io = GuiIo {
            platform: &self.platform,
            cursor: &mut self.cursor,
            tooltip: &mut self.tooltip,
            mesh_pool: &mut self.pool,
        };
        self.manager.route_press(event, &mut io).expect("button supported")
    }

    pub fn route_release(&mut self, event: &PointerEvent) -> bool {
        let mut io = GuiIo {
            platform: &self.platform,
            cursor: &mut self.cursor,
            tooltip: &mut self.tooltip,
            mesh_pool: &mut self.pool,
        };
        self.manager
            .route_release(event, &mut io)
            .expect("button supported")
    }

    pub fn route_double_click(&mut self, event: &PointerEvent) -> bool {
        let mut io = GuiIo {
            platform: &self.platform,
            cursor: &mut self.cursor,
            tooltip: &mut self.tooltip,
            mesh_pool: &mut self.pool,
        };
        self.manager
            .route_double_click(event, &mut io)
            .expect("button supported")
    }

    pub fn update(&mut self, delta_time: f32) -> Option<crate::render::GuiRenderSnapshot> {
        let mut io = GuiIo {
            platform: &self.platform,
            cursor: &mut self.cursor,
            tooltip: &mut self.tooltip,
            mesh_pool: &mut self.pool,
        };
        self.manager.update(delta_time, &mut io)
    }

    pub fn mouse_left_window(&mut self, window: WindowId) {
        let mut io = GuiIo {
            platform: &self.platform,
            cursor: &mut self.cursor,
            tooltip: &mut self.tooltip,
            mesh_pool: &mut self.pool,
        };
        self.manager.notify_mouse_left_window(window, &mut io);
    }

    /// Drain and return the event log
    pub fn take_log(&mut self) -> Vec<String> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

/// One window at the screen origin with one full-window widget
pub(crate) fn single_window_harness() -> (Harness, WidgetId) {
    let mut harness = Harness::new();
    let target = harness.add_window(WindowId(1), RectI::new(0, 0, 800, 600));
    let widget = harness.add_widget(target, RectI::new(0, 0, 800, 600));
    (harness, widget)
}
