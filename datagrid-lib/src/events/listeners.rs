//! Scoped subscriptions to host-global listeners.
//!
//! Scroll, resize and pointer listeners belong to the host window and are
//! shared by every grid on the page. The engine never assumes one is present:
//! it acquires a [`Subscription`] when it needs one and the listener stays
//! attached exactly as long as the handle lives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Kind of host-global listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Viewport scroll.
    Scroll,
    /// Viewport/window resize.
    Resize,
    /// Pointer motion while a column drag is in progress.
    PointerMove,
    /// Pointer release ending a column drag.
    PointerUp,
}

/// Unique identifier for one attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// Registry of attached listeners, shared between the engine and its host.
///
/// Cloning yields another handle to the same registry. The host inspects it
/// to decide which global listeners to wire up.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<RwLock<HashMap<SubscriptionId, ListenerKind>>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a listener. It stays attached until the handle is dropped.
    pub fn attach(&self, kind: ListenerKind) -> Subscription {
        let id = SubscriptionId::new();
        if let Ok(mut guard) = self.inner.write() {
            guard.insert(id, kind);
        }
        log::trace!("Attached {:?} listener {:?}", kind, id);
        Subscription {
            id,
            kind,
            registry: self.clone(),
        }
    }

    /// Returns `true` if at least one listener of this kind is attached.
    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.count(kind) > 0
    }

    /// Number of attached listeners of one kind.
    pub fn count(&self, kind: ListenerKind) -> usize {
        self.inner
            .read()
            .map(|g| g.values().filter(|k| **k == kind).count())
            .unwrap_or(0)
    }

    /// Total number of attached listeners.
    pub fn active_count(&self) -> usize {
        self.inner.read().map(|g| g.len()).unwrap_or(0)
    }

    fn detach(&self, id: SubscriptionId) {
        if let Ok(mut guard) = self.inner.write()
            && let Some(kind) = guard.remove(&id)
        {
            log::trace!("Detached {:?} listener {:?}", kind, id);
        }
    }
}

/// Handle to an attached listener. Dropping it detaches the listener.
#[derive(Debug)]
#[must_use = "dropping a Subscription detaches the listener immediately"]
pub struct Subscription {
    id: SubscriptionId,
    kind: ListenerKind,
    registry: ListenerRegistry,
}

impl Subscription {
    /// Returns the subscription's identifier.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the listener kind.
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.detach(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_detaches() {
        let registry = ListenerRegistry::new();
        let scroll = registry.attach(ListenerKind::Scroll);
        let moves = registry.attach(ListenerKind::PointerMove);
        assert_eq!(registry.active_count(), 2);
        assert!(registry.is_attached(ListenerKind::Scroll));
        assert_eq!(scroll.kind(), ListenerKind::Scroll);

        drop(moves);
        assert_eq!(registry.active_count(), 1);
        assert!(!registry.is_attached(ListenerKind::PointerMove));

        drop(scroll);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let registry = ListenerRegistry::new();
        let other = registry.clone();
        let _up = other.attach(ListenerKind::PointerUp);
        assert_eq!(registry.count(ListenerKind::PointerUp), 1);
    }
}
