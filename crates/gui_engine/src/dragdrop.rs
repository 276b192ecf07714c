//! Drag state machine and drag-and-drop payload sessions

use crate::events::DragPayload;

/// State of the pointer-drag state machine
///
/// Transitions: `NoDrag -> HeldWithoutDrag` on press, `HeldWithoutDrag ->
/// Dragging` once the pointer travels past the drag threshold, and back to
/// `NoDrag` on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No button is held
    #[default]
    NoDrag,
    /// A button is held but the pointer has not moved far enough to drag
    HeldWithoutDrag,
    /// A drag is in progress
    Dragging,
}

/// An in-flight drag-and-drop payload
#[derive(Debug, Clone)]
pub(crate) struct DragSession {
    pub(crate) type_id: u32,
    pub(crate) payload: DragPayload,
    pub(crate) needs_valid_drop_target: bool,
}

/// Tracks the single drag-and-drop session that may be active at a time
///
/// Starting a new session while one is active replaces it; the old payload is
/// dropped without notification.
#[derive(Debug, Default)]
pub struct DragAndDrop {
    session: Option<DragSession>,
}

impl DragAndDrop {
    /// Begin a payload session
    pub fn start_drag(&mut self, type_id: u32, payload: DragPayload, needs_valid_drop_target: bool) {
        self.session = Some(DragSession {
            type_id,
            payload,
            needs_valid_drop_target,
        });
    }

    /// End the session, returning its payload if one was active
    pub(crate) fn end_drag(&mut self) -> Option<DragSession> {
        self.session.take()
    }

    /// Whether a payload session is active
    pub fn is_drag_in_progress(&self) -> bool {
        self.session.is_some()
    }

    /// Type tag of the active payload, if any
    pub fn drag_type_id(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.type_id)
    }

    /// The active payload, if any
    pub fn payload(&self) -> Option<&DragPayload> {
        self.session.as_ref().map(|s| &s.payload)
    }

    /// Whether the active payload demands a valid drop target for the
    /// non-denied cursor
    pub fn needs_valid_drop_target(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |s| s.needs_valid_drop_target)
    }
}
