//! GUI event types
//!
//! Platform input arrives as [`PointerEvent`]s and is translated by the
//! router into synthetic GUI events. Every element handler returns a bool:
//! `true` means the event was consumed and stops forwarding to elements
//! further back in the hit-test order.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::foundation::math::Vec2I;

bitflags::bitflags! {
    /// Keyboard modifier state carried on pointer events
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GuiModifiers: u8 {
        /// Shift is held
        const SHIFT = 0b001;
        /// Control is held
        const CTRL = 0b010;
        /// Alt is held
        const ALT = 0b100;
    }
}

/// Pointer button as reported by the platform layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button
    Left,
    /// Middle button
    Middle,
    /// Right button
    Right,
    /// Any additional button (thumb buttons etc.)
    Extra(u32),
}

/// Mouse button identifier used by GUI events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuiMouseButton {
    /// Left mouse button
    Left,
    /// Middle mouse button
    Middle,
    /// Right mouse button
    Right,
}

impl GuiMouseButton {
    /// Index into per-button state arrays
    pub fn index(self) -> usize {
        match self {
            GuiMouseButton::Left => 0,
            GuiMouseButton::Middle => 1,
            GuiMouseButton::Right => 2,
        }
    }
}

/// Raw pointer event handed to the router by the platform layer
#[derive(Debug, Clone)]
pub struct PointerEvent {
    /// Pointer position in screen coordinates
    pub screen_pos: Vec2I,
    /// Pressed state of the left/middle/right buttons
    pub button_states: [bool; 3],
    /// The button that triggered a press/release/double-click event
    pub button: PointerButton,
    /// Keyboard modifier state
    pub modifiers: GuiModifiers,
    /// Wheel scroll delta carried by move events
    pub scroll_amount: f32,
}

impl PointerEvent {
    /// Create a pointer event at a screen position with no buttons held
    pub fn at(screen_pos: Vec2I) -> Self {
        Self {
            screen_pos,
            button_states: [false; 3],
            button: PointerButton::Left,
            modifiers: GuiModifiers::empty(),
            scroll_amount: 0.0,
        }
    }

    /// Set the triggering button and mark it held
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        if let PointerButton::Left = button {
            self.button_states[0] = true;
        } else if let PointerButton::Middle = button {
            self.button_states[1] = true;
        } else if let PointerButton::Right = button {
            self.button_states[2] = true;
        }
        self
    }

    /// Set the wheel scroll delta
    pub fn with_scroll(mut self, amount: f32) -> Self {
        self.scroll_amount = amount;
        self
    }
}

/// Opaque, cheaply cloneable drag-and-drop payload
///
/// The payload's concrete type is private to the drag source and drop target;
/// the router only moves it around.
#[derive(Clone)]
pub struct DragPayload(Rc<dyn Any>);

impl DragPayload {
    /// Wrap a payload value
    pub fn new<T: 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Downcast the payload to a concrete type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for DragPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DragPayload")
    }
}

/// The synthetic mouse event variants the router dispatches to elements
#[derive(Debug, Clone)]
pub enum GuiMouseEventKind {
    /// Pointer entered the element's bounds
    MouseOver {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
    },
    /// Pointer left the element's bounds
    MouseOut {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
    },
    /// Pointer moved while hovering the element
    MouseMove {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
    },
    /// Wheel scrolled while hovering the element
    MouseWheel {
        /// Scroll delta
        amount: f32,
    },
    /// Button pressed over the element
    MouseDown {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
        /// Button that was pressed
        button: GuiMouseButton,
    },
    /// Button released over the element
    MouseUp {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
        /// Button that was released
        button: GuiMouseButton,
    },
    /// Button double-clicked over the element
    MouseDoubleClick {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
        /// Button that was double-clicked
        button: GuiMouseButton,
    },
    /// A held press crossed the drag threshold
    MouseDragStart {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
        /// Position of the initiating press in widget-local coordinates
        drag_start_pos: Vec2I,
    },
    /// Pointer moved while a drag session is active
    MouseDrag {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
        /// Screen-space delta from where the drag started
        drag_amount: Vec2I,
    },
    /// The dragging button was released
    MouseDragEnd {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
    },
    /// A drag-and-drop payload is hovering the element
    DragAndDropDragged {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
        /// Payload type tag
        type_id: u32,
        /// The payload itself
        payload: DragPayload,
    },
    /// A drag-and-drop payload was dropped on the element
    DragAndDropDropped {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
        /// Payload type tag
        type_id: u32,
        /// The payload itself
        payload: DragPayload,
    },
    /// A drag-and-drop payload left the element's bounds
    DragAndDropLeft {
        /// Pointer position in widget-local coordinates
        local_pos: Vec2I,
        /// Payload type tag
        type_id: u32,
        /// The payload itself
        payload: DragPayload,
    },
}

/// Synthetic mouse event dispatched to elements
#[derive(Debug, Clone)]
pub struct GuiMouseEvent {
    /// The event variant
    pub kind: GuiMouseEventKind,
    /// Pressed state of the left/middle/right buttons
    pub button_states: [bool; 3],
    /// Keyboard modifier state
    pub modifiers: GuiModifiers,
}

impl GuiMouseEvent {
    /// Create a new mouse event
    pub fn new(kind: GuiMouseEventKind, button_states: [bool; 3], modifiers: GuiModifiers) -> Self {
        Self {
            kind,
            button_states,
            modifiers,
        }
    }
}

/// Command events dispatched to focused elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiCommandEvent {
    /// The element gained input focus
    FocusGained,
    /// The element lost input focus
    FocusLost,
    /// The element should repaint (caret blink)
    Redraw,
    /// Delete the character before the caret
    Backspace,
    /// Delete the character after the caret
    Delete,
    /// Insert a line break
    Return,
    /// Confirm the current input
    Confirm,
    /// Cancel the current input
    Escape,
    /// Move the caret left
    MoveLeft,
    /// Move the caret right
    MoveRight,
    /// Move the caret up
    MoveUp,
    /// Move the caret down
    MoveDown,
    /// Extend the selection left
    SelectLeft,
    /// Extend the selection right
    SelectRight,
    /// Extend the selection up
    SelectUp,
    /// Extend the selection down
    SelectDown,
}

/// Editing and navigation commands produced by the platform input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Return key
    Return,
    /// Confirm shortcut
    Confirm,
    /// Escape key
    Escape,
    /// Caret left
    CursorMoveLeft,
    /// Caret right
    CursorMoveRight,
    /// Caret up
    CursorMoveUp,
    /// Caret down
    CursorMoveDown,
    /// Selection left
    SelectLeft,
    /// Selection right
    SelectRight,
    /// Selection up
    SelectUp,
    /// Selection down
    SelectDown,
}

impl From<InputCommand> for GuiCommandEvent {
    fn from(command: InputCommand) -> Self {
        match command {
            InputCommand::Backspace => GuiCommandEvent::Backspace,
            InputCommand::Delete => GuiCommandEvent::Delete,
            InputCommand::Return => GuiCommandEvent::Return,
            InputCommand::Confirm => GuiCommandEvent::Confirm,
            InputCommand::Escape => GuiCommandEvent::Escape,
            InputCommand::CursorMoveLeft => GuiCommandEvent::MoveLeft,
            InputCommand::CursorMoveRight => GuiCommandEvent::MoveRight,
            InputCommand::CursorMoveUp => GuiCommandEvent::MoveUp,
            InputCommand::CursorMoveDown => GuiCommandEvent::MoveDown,
            InputCommand::SelectLeft => GuiCommandEvent::SelectLeft,
            InputCommand::SelectRight => GuiCommandEvent::SelectRight,
            InputCommand::SelectUp => GuiCommandEvent::SelectUp,
            InputCommand::SelectDown => GuiCommandEvent::SelectDown,
        }
    }
}

/// Character input event dispatched to focused elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiTextInputEvent {
    /// The character that was typed
    pub character: char,
}

/// Application-defined virtual button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualButton(pub u32);

/// Virtual button event dispatched to focused elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiVirtualButtonEvent {
    /// The virtual button that went down
    pub button: VirtualButton,
}

/// Cursor glyphs the router may request from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorType {
    /// Default arrow cursor
    Arrow,
    /// Arrow with a drag adornment, shown while a payload may be dropped
    ArrowDrag,
    /// Denied glyph, shown while a payload has no valid drop target
    Deny,
    /// Text caret
    IBeam,
    /// Horizontal resize
    SizeWE,
    /// Vertical resize
    SizeNS,
}
