//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a widget registered with the GUI manager
    pub struct WidgetId;

    /// Stable handle to an element owned by the GUI manager
    pub struct ElementId;

    /// Stable handle to a render target known to the GUI manager
    pub struct TargetId;
}

/// Handle-based widget storage
pub type WidgetMap<T> = SlotMap<WidgetId, T>;

/// Handle-based element storage
pub type ElementMap<T> = SlotMap<ElementId, T>;

/// Handle-based render-target storage
pub type TargetMap<T> = SlotMap<TargetId, T>;
