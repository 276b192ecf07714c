//! Pointer event routing
//!
//! Translates raw pointer events into the synthetic GUI event stream:
//! hover enter/leave diffing, press/release with per-button active element
//! tracking, the drag threshold state machine and drag-and-drop payload
//! feedback. All routing entry points return whether the GUI consumed the
//! event so the embedding application can withhold it from gameplay input.

use crate::dragdrop::DragState;
use crate::error::{GuiError, GuiResult};
use crate::events::{
    CursorType, GuiCommandEvent, GuiMouseButton, GuiMouseEventKind, PointerButton, PointerEvent,
};
use crate::foundation::math::{manhattan_dist, transform_point, Vec2I};
use crate::manager::{ActiveInfo, FocusInfo, GuiIo, GuiManager, HoverInfo, TooltipState};
use crate::platform::WindowId;

fn gui_button(button: PointerButton) -> GuiResult<GuiMouseButton> {
    match button {
        PointerButton::Left => Ok(GuiMouseButton::Left),
        PointerButton::Middle => Ok(GuiMouseButton::Middle),
        PointerButton::Right => Ok(GuiMouseButton::Right),
        PointerButton::Extra(_) => Err(GuiError::UnsupportedPointerButton(button)),
    }
}

impl GuiManager {
    /// Route a pointer move, driving hover, drag and cursor state
    pub fn route_move(&mut self, event: &PointerEvent, io: &mut GuiIo<'_>) -> bool {
        self.refresh_elements_under_pointer(event, io);
        let mut consumed = false;

        if !self.active_elements.is_empty() && self.drag_state == DragState::HeldWithoutDrag {
            let dist = manhattan_dist(event.screen_pos, self.last_pointer_click_pos);
            if dist > self.config.drag_distance {
                log::debug!("pointer drag started after {dist} px of travel");
                let active = self.active_elements.clone();
                for info in &active {
                    let Some(local) =
                        self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                    else {
                        continue;
                    };
                    let Some(start_local) = self.widget_relative_pos(
                        info.widget,
                        self.last_pointer_click_pos,
                        io.platform,
                    ) else {
                        continue;
                    };
                    let start = self.make_mouse_event(GuiMouseEventKind::MouseDragStart {
                        local_pos: local,
                        drag_start_pos: start_local,
                    });
                    if self.dispatch_mouse(info.element, &start) {
                        consumed = true;
                    }
                }
                self.drag_state = DragState::Dragging;
                self.drag_start_pos = event.screen_pos;
            }
        }

        if self.drag_state == DragState::Dragging {
            if event.screen_pos != self.last_pointer_screen_pos {
                // drag amounts accumulate from where the threshold was
                // crossed, not from the previous move
                let drag_amount = event.screen_pos - self.drag_start_pos;
                let active = self.active_elements.clone();
                for info in &active {
                    let Some(local) =
                        self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                    else {
                        continue;
                    };
                    let drag = self.make_mouse_event(GuiMouseEventKind::MouseDrag {
                        local_pos: local,
                        drag_amount,
                    });
                    if self.dispatch_mouse(info.element, &drag) {
                        consumed = true;
                    }
                }
            }

            if self.drag_and_drop.is_drag_in_progress() {
                let needs_valid = self.drag_and_drop.needs_valid_drop_target();
                let type_id = self.drag_and_drop.drag_type_id().unwrap_or(0);
                let mut any_accepts = false;
                let hovered = self.elements_under_pointer.clone();
                for info in &hovered {
                    let Some(local) =
                        self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                    else {
                        continue;
                    };
                    let accepts = !needs_valid
                        || self.elements.get(info.element).map_or(false, |e| {
                            !e.destroyed && e.element.accept_drag_and_drop(local, type_id)
                        });
                    if !accepts {
                        continue;
                    }
                    any_accepts = true;
                    let Some(payload) = self.drag_and_drop.payload().cloned() else {
                        break;
                    };
                    let dragged = self.make_mouse_event(GuiMouseEventKind::DragAndDropDragged {
                        local_pos: local,
                        type_id,
                        payload,
                    });
                    if self.dispatch_mouse(info.element, &dragged) {
                        consumed = true;
                        break;
                    }
                }
                let cursor = if any_accepts || !needs_valid {
                    CursorType::ArrowDrag
                } else {
                    CursorType::Deny
                };
                self.set_cursor(cursor, io);
            }
        } else if event.screen_pos != self.last_pointer_screen_pos {
            let hovered = self.elements_under_pointer.clone();
            let mut has_custom_cursor = false;
            for info in &hovered {
                let Some(local) =
                    self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                else {
                    continue;
                };
                if self.drag_state == DragState::NoDrag && !has_custom_cursor {
                    if let Some(entry) = self.elements.get(info.element) {
                        if let Some(custom) = entry.element.custom_cursor(local) {
                            self.set_cursor(custom, io);
                            has_custom_cursor = true;
                        }
                    }
                }
                let mv = self.make_mouse_event(GuiMouseEventKind::MouseMove { local_pos: local });
                if self.dispatch_mouse(info.element, &mv) {
                    consumed = true;
                    break;
                }
            }

            if self.drag_state == DragState::NoDrag && !has_custom_cursor {
                self.set_cursor(CursorType::Arrow, io);
            }
        }

        self.last_pointer_screen_pos = event.screen_pos;
        consumed
    }

    /// Route a wheel scroll to the elements under the pointer
    pub fn route_wheel(&mut self, event: &PointerEvent, io: &mut GuiIo<'_>) -> bool {
        self.refresh_elements_under_pointer(event, io);

        let mut consumed = false;
        let hovered = self.elements_under_pointer.clone();
        for info in &hovered {
            let wheel = self.make_mouse_event(GuiMouseEventKind::MouseWheel {
                amount: event.scroll_amount,
            });
            if self.dispatch_mouse(info.element, &wheel) {
                consumed = true;
                break;
            }
        }

        self.last_pointer_screen_pos = event.screen_pos;
        consumed
    }

    /// Route a button press
    ///
    /// Fills the active element set when no button is already held, then
    /// moves focus to the elements under the pointer.
    pub fn route_press(&mut self, event: &PointerEvent, io: &mut GuiIo<'_>) -> GuiResult<bool> {
        let button = gui_button(event.button)?;
        self.refresh_elements_under_pointer(event, io);

        if let Some(state) = self.tooltip.take() {
            if state.shown {
                io.tooltip.hide();
            }
        }

        let mut consumed = false;

        if self.active_elements.is_empty() {
            let hovered = self.elements_under_pointer.clone();
            for info in &hovered {
                let Some(local) =
                    self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                else {
                    continue;
                };
                self.active_elements.push(ActiveInfo {
                    element: info.element,
                    widget: info.widget,
                });
                self.active_mouse_button = Some(button);
                // only the left button arms the drag threshold
                if button == GuiMouseButton::Left {
                    self.drag_state = DragState::HeldWithoutDrag;
                    self.last_pointer_click_pos = event.screen_pos;
                }
                let down = self.make_mouse_event(GuiMouseEventKind::MouseDown {
                    local_pos: local,
                    button,
                });
                if self.dispatch_mouse(info.element, &down) {
                    consumed = true;
                    break;
                }
            }
        }

        self.move_focus_to_pointer();

        self.last_pointer_screen_pos = event.screen_pos;
        consumed |= !self.elements_under_pointer.is_empty();
        Ok(consumed)
    }

    /// Route a button release
    ///
    /// Ends a left-button pointer drag and delivers an active drag-and-drop
    /// payload to the accepting hovered elements, front to back, until one
    /// consumes it.
    pub fn route_release(&mut self, event: &PointerEvent, io: &mut GuiIo<'_>) -> GuiResult<bool> {
        let button = gui_button(event.button)?;
        self.refresh_elements_under_pointer(event, io);

        let mut consumed = false;

        if self.active_mouse_button == Some(button) {
            let hovered = self.elements_under_pointer.clone();
            for info in &hovered {
                if !self.active_elements.iter().any(|a| a.element == info.element) {
                    continue;
                }
                let Some(local) =
                    self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                else {
                    continue;
                };
                let up = self.make_mouse_event(GuiMouseEventKind::MouseUp {
                    local_pos: local,
                    button,
                });
                if self.dispatch_mouse(info.element, &up) {
                    consumed = true;
                    break;
                }
            }
        }

        // only a left release can end a pointer drag
        let ends_drag = matches!(
            self.drag_state,
            DragState::Dragging | DragState::HeldWithoutDrag
        ) && self.active_mouse_button == Some(button)
            && button == GuiMouseButton::Left;
        if ends_drag {
            if self.drag_state == DragState::Dragging {
                let active = self.active_elements.clone();
                for info in &active {
                    let Some(local) =
                        self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                    else {
                        continue;
                    };
                    let end =
                        self.make_mouse_event(GuiMouseEventKind::MouseDragEnd { local_pos: local });
                    if self.dispatch_mouse(info.element, &end) {
                        consumed = true;
                    }
                }
            }
            self.drag_state = DragState::NoDrag;
        }

        if self.active_mouse_button == Some(button) {
            self.active_elements.clear();
            self.active_mouse_button = None;
        }
        self.set_cursor(CursorType::Arrow, io);

        if self.drag_and_drop.is_drag_in_progress() && button == GuiMouseButton::Left {
            let needs_valid = self.drag_and_drop.needs_valid_drop_target();
            let hovered = self.elements_under_pointer.clone();
            if let Some(session) = self.drag_and_drop.end_drag() {
                for info in &hovered {
                    let Some(local) =
                        self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                    else {
                        continue;
                    };
                    let accepts = !needs_valid
                        || self.elements.get(info.element).map_or(false, |e| {
                            !e.destroyed
                                && e.element.accept_drag_and_drop(local, session.type_id)
                        });
                    if !accepts {
                        continue;
                    }
                    let dropped = self.make_mouse_event(GuiMouseEventKind::DragAndDropDropped {
                        local_pos: local,
                        type_id: session.type_id,
                        payload: session.payload.clone(),
                    });
                    if self.dispatch_mouse(info.element, &dropped) {
                        consumed = true;
                        break;
                    }
                }
            }
        }

        self.last_pointer_screen_pos = event.screen_pos;
        consumed |= !self.elements_under_pointer.is_empty();
        Ok(consumed)
    }

    /// Route a double click to the elements under the pointer
    pub fn route_double_click(
        &mut self,
        event: &PointerEvent,
        io: &mut GuiIo<'_>,
    ) -> GuiResult<bool> {
        let button = gui_button(event.button)?;
        self.refresh_elements_under_pointer(event, io);

        let mut consumed = false;
        let hovered = self.elements_under_pointer.clone();
        for info in &hovered {
            let Some(local) = self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
            else {
                continue;
            };
            let click = self.make_mouse_event(GuiMouseEventKind::MouseDoubleClick {
                local_pos: local,
                button,
            });
            if self.dispatch_mouse(info.element, &click) {
                consumed = true;
                break;
            }
        }

        self.last_pointer_screen_pos = event.screen_pos;
        consumed |= !self.elements_under_pointer.is_empty();
        Ok(consumed)
    }

    /// Recompute the set of elements under the pointer and emit the
    /// hover-enter/leave event diff
    pub(crate) fn refresh_elements_under_pointer(
        &mut self,
        event: &PointerEvent,
        io: &mut GuiIo<'_>,
    ) {
        self.last_button_states = event.button_states;
        self.last_modifiers = event.modifiers;

        let pointer_window = self.find_pointer_window(event.screen_pos, io);

        // collect hit elements, front-most (lowest depth) first
        let mut new_hover: Vec<HoverInfo> = Vec::new();
        if let Some(window) = pointer_window {
            let window_pos = io.platform.screen_to_window_pos(window, event.screen_pos);
            for &widget_id in &self.widget_order {
                let Some(widget) = self.widgets.get(widget_id) else {
                    continue;
                };
                if self.target_window(widget.target()) != Some(window) {
                    continue;
                }
                let Some(bridged) = self.window_to_bridged_coords(widget.target(), window_pos)
                else {
                    continue;
                };
                if !widget.in_bounds(bridged) {
                    continue;
                }
                let Some(inverse) = widget.world_transform().try_inverse() else {
                    continue;
                };
                let local = transform_point(&inverse, bridged);
                for &element_id in widget.elements() {
                    let Some(entry) = self.elements.get(element_id) else {
                        continue;
                    };
                    if entry.destroyed || !entry.element.is_visible() {
                        continue;
                    }
                    if entry.element.in_bounds(local) {
                        new_hover.push(HoverInfo {
                            element: element_id,
                            widget: widget_id,
                            depth: entry.element.depth(),
                            received_mouse_over: false,
                            uses_mouse_over: false,
                            is_hovering: false,
                        });
                    }
                }
            }
        }
        new_hover.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.element.cmp(&b.element)));

        // carry hover flags across generations
        for info in &mut new_hover {
            if let Some(prev) = self
                .elements_under_pointer
                .iter()
                .find(|p| p.element == info.element)
            {
                info.received_mouse_over = prev.received_mouse_over;
                info.uses_mouse_over = prev.uses_mouse_over;
            }
        }

        // hover-enter: while a press is held only active elements may gain
        // hover, so a button released off-element does not click it. An
        // element that consumes the enter keeps the ones behind it from
        // hovering at all.
        for i in 0..new_hover.len() {
            let info = new_hover[i];
            if info.received_mouse_over {
                new_hover[i].is_hovering = true;
                if info.uses_mouse_over {
                    break;
                }
                continue;
            }
            let allowed = self.active_elements.is_empty()
                || self.active_elements.iter().any(|a| a.element == info.element);
            if !allowed {
                continue;
            }
            let Some(local) = self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
            else {
                continue;
            };
            new_hover[i].received_mouse_over = true;
            new_hover[i].is_hovering = true;
            let over = self.make_mouse_event(GuiMouseEventKind::MouseOver { local_pos: local });
            if self.dispatch_mouse(info.element, &over) {
                new_hover[i].uses_mouse_over = true;
                break;
            }
        }

        let old_hover = self.elements_under_pointer.clone();

        if self.drag_and_drop.is_drag_in_progress() {
            let type_id = self.drag_and_drop.drag_type_id().unwrap_or(0);
            for info in &old_hover {
                if new_hover.iter().any(|n| n.element == info.element) {
                    continue;
                }
                let Some(payload) = self.drag_and_drop.payload().cloned() else {
                    break;
                };
                let Some(local) =
                    self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
                else {
                    continue;
                };
                let left = self.make_mouse_event(GuiMouseEventKind::DragAndDropLeft {
                    local_pos: local,
                    type_id,
                    payload,
                });
                if self.dispatch_mouse(info.element, &left) {
                    break;
                }
            }
        }

        // hover-leave: fires for elements that left the hover set or fell
        // behind a consuming one, but never for elements outside the active
        // set while a press is held
        for info in &old_hover {
            if !info.received_mouse_over {
                continue;
            }
            let still_hovering = new_hover
                .iter()
                .find(|n| n.element == info.element)
                .map_or(false, |n| n.is_hovering);
            if still_hovering {
                continue;
            }
            let allowed = self.active_elements.is_empty()
                || self.active_elements.iter().any(|a| a.element == info.element);
            if !allowed {
                continue;
            }
            let Some(local) = self.widget_relative_pos(info.widget, event.screen_pos, io.platform)
            else {
                continue;
            };
            let out = self.make_mouse_event(GuiMouseEventKind::MouseOut { local_pos: local });
            if self.dispatch_mouse(info.element, &out) {
                break;
            }
        }

        self.elements_under_pointer = new_hover;
        self.refresh_tooltip_candidate(pointer_window, event.screen_pos, io);
    }

    /// First registered window found under the pointer
    fn find_pointer_window(&self, screen_pos: Vec2I, io: &GuiIo<'_>) -> Option<WindowId> {
        let mut seen: Vec<WindowId> = Vec::new();
        for &widget_id in &self.widget_order {
            let Some(widget) = self.widgets.get(widget_id) else {
                continue;
            };
            let Some(window) = self.target_window(widget.target()) else {
                continue;
            };
            if seen.contains(&window) {
                continue;
            }
            seen.push(window);
            debug_assert!(
                io.platform.window_exists(window),
                "widget bound to a window the platform no longer knows"
            );
            if io.platform.is_point_over_window(window, screen_pos) {
                return Some(window);
            }
        }
        None
    }

    /// Track which element's tooltip is pending, restarting the hover timer
    /// whenever the front-most hovered element changes
    fn refresh_tooltip_candidate(
        &mut self,
        pointer_window: Option<WindowId>,
        screen_pos: Vec2I,
        io: &mut GuiIo<'_>,
    ) {
        let front = self.elements_under_pointer.first().map(|h| h.element);
        let changed = match (&self.tooltip, front) {
            (Some(state), Some(element)) => state.element != element,
            (None, None) => false,
            _ => true,
        };
        let window_pos = pointer_window
            .map(|w| io.platform.screen_to_window_pos(w, screen_pos))
            .unwrap_or_else(Vec2I::zeros);

        if changed {
            if self.tooltip.map_or(false, |t| t.shown) || self.tooltip_hide_pending {
                io.tooltip.hide();
                self.tooltip_hide_pending = false;
            }
            self.tooltip = front.map(|element| TooltipState {
                element,
                hover_start: self.clock.total_time(),
                shown: false,
                window_pos,
            });
        } else if let Some(state) = &mut self.tooltip {
            state.window_pos = window_pos;
        }
    }

    /// Focus transition run on every press: elements under the pointer gain
    /// focus front-to-back until one claims it, everything else loses focus
    fn move_focus_to_pointer(&mut self) {
        let hovered = self.elements_under_pointer.clone();
        let mut new_focus: Vec<FocusInfo> = Vec::new();
        for info in &hovered {
            let previous = self
                .elements_in_focus
                .iter()
                .find(|f| f.element == info.element)
                .copied();
            let uses_focus = match previous {
                Some(prev) => prev.uses_focus,
                None => self.dispatch_command(info.element, GuiCommandEvent::FocusGained),
            };
            new_focus.push(FocusInfo {
                element: info.element,
                widget: info.widget,
                uses_focus,
            });
            if uses_focus {
                break;
            }
        }

        let old_focus = std::mem::take(&mut self.elements_in_focus);
        for info in old_focus {
            if !new_focus.iter().any(|f| f.element == info.element) {
                self.dispatch_command(info.element, GuiCommandEvent::FocusLost);
            }
        }
        self.elements_in_focus = new_focus;
    }

    fn set_cursor(&mut self, cursor: CursorType, io: &mut GuiIo<'_>) {
        if cursor != self.active_cursor {
            io.cursor.set_cursor(cursor);
            self.active_cursor = cursor;
        }
    }
}
