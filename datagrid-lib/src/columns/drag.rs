//! Pointer-driven column resize and reorder.
//!
//! Only one drag may be active at a time. A resize holds pointer-move and
//! pointer-up subscriptions for exactly as long as the drag lasts; ending or
//! cancelling the drag drops them.

use crate::events::{ListenerKind, ListenerRegistry, Subscription};

use super::ColumnRegistry;

/// The drag currently in progress.
#[derive(Debug)]
enum ActiveDrag {
    Resize {
        field: String,
        start_x: f64,
        start_width: f64,
        _pointer_move: Subscription,
        _pointer_up: Subscription,
    },
    Reorder {
        source: String,
        target: Option<String>,
    },
}

/// Translates pointer drags into column registry mutations.
#[derive(Debug)]
pub struct DragController {
    active: Option<ActiveDrag>,
    listeners: ListenerRegistry,
}

impl DragController {
    /// Creates a controller that takes its pointer subscriptions from `listeners`.
    pub fn new(listeners: ListenerRegistry) -> Self {
        Self {
            active: None,
            listeners,
        }
    }

    /// Returns `true` while a resize or reorder is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Field being resized, if any.
    pub fn resizing(&self) -> Option<&str> {
        match &self.active {
            Some(ActiveDrag::Resize { field, .. }) => Some(field),
            _ => None,
        }
    }

    /// Source field of the reorder in progress, if any.
    pub fn reorder_source(&self) -> Option<&str> {
        match &self.active {
            Some(ActiveDrag::Reorder { source, .. }) => Some(source),
            _ => None,
        }
    }

    /// Field currently hovered by the reorder in progress, if any.
    pub fn reorder_target(&self) -> Option<&str> {
        match &self.active {
            Some(ActiveDrag::Reorder { target, .. }) => target.as_deref(),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Resize
    // -------------------------------------------------------------------------

    /// Press on a column edge. Captures the start position and width.
    ///
    /// Ignored while another drag is active or if the column is unknown.
    pub fn begin_resize(&mut self, registry: &ColumnRegistry, field: &str, x: f64) -> bool {
        if self.active.is_some() {
            log::debug!("Ignoring resize of '{}': another drag is active", field);
            return false;
        }
        let Some(column) = registry.get(field) else {
            log::debug!("Ignoring resize of unknown column '{}'", field);
            return false;
        };

        self.active = Some(ActiveDrag::Resize {
            field: field.to_string(),
            start_x: x,
            start_width: column.width,
            _pointer_move: self.listeners.attach(ListenerKind::PointerMove),
            _pointer_up: self.listeners.attach(ListenerKind::PointerUp),
        });
        log::debug!("Resize started on '{}' at x={}", field, x);
        true
    }

    /// Pointer motion during a resize. Returns the width applied.
    pub fn resize_to(&mut self, registry: &mut ColumnRegistry, x: f64) -> Option<f64> {
        let Some(ActiveDrag::Resize {
            field,
            start_x,
            start_width,
            ..
        }) = &self.active
        else {
            return None;
        };
        let width = (start_width + (x - start_x)).max(registry.min_width());
        registry.set_width(field, width).ok()
    }

    /// Pointer release ending a resize. Returns the resized field.
    pub fn end_resize(&mut self) -> Option<String> {
        match self.active.take() {
            Some(ActiveDrag::Resize { field, .. }) => {
                log::debug!("Resize ended on '{}'", field);
                Some(field)
            }
            other => {
                self.active = other;
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Reorder
    // -------------------------------------------------------------------------

    /// Drag start on a header. Marks the source field.
    pub fn begin_reorder(&mut self, registry: &ColumnRegistry, field: &str) -> bool {
        if self.active.is_some() {
            log::debug!("Ignoring reorder of '{}': another drag is active", field);
            return false;
        }
        if !registry.contains(field) {
            log::debug!("Ignoring reorder of unknown column '{}'", field);
            return false;
        }
        self.active = Some(ActiveDrag::Reorder {
            source: field.to_string(),
            target: None,
        });
        true
    }

    /// Drag over a header. Tracked only when it differs from the source.
    pub fn drag_over(&mut self, field: &str) {
        if let Some(ActiveDrag::Reorder { source, target }) = &mut self.active {
            *target = (source != field).then(|| field.to_string());
        }
    }

    /// Drop. Applies the reorder and clears both markers whether or not it
    /// succeeded. Returns `true` if the column order changed.
    pub fn drop_reorder(&mut self, registry: &mut ColumnRegistry) -> bool {
        let (source, target) = match self.active.take() {
            Some(ActiveDrag::Reorder { source, target }) => (source, target),
            other => {
                self.active = other;
                return false;
            }
        };
        let Some(target) = target else {
            return false;
        };
        match registry.reorder(&source, &target) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Reorder dropped: {}", err);
                false
            }
        }
    }

    /// Abandons any drag in progress and releases its listeners.
    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            log::debug!("Drag cancelled");
        }
    }
}
