//! Outside-click and Escape dismissal.
//!
//! Overlays (the booking popover, an open dropdown) attach a listener while
//! they are shown. Attaching returns a [`DismissGuard`]; the listener stays
//! registered exactly as long as the guard lives, so every exit path of the
//! owner detaches it.
//!
//! The registry does not call back into its owners. [`DismissListeners::route`]
//! reports which listeners an event dismisses and the caller forwards the
//! dismissal to whoever holds the matching guard.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::input::{Key, UiEvent};

/// Identifier of an attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    active: Vec<(ListenerId, &'static str)>,
}

/// Shared handle to the document-level dismiss listeners.
#[derive(Clone, Default)]
pub struct DismissListeners {
    inner: Rc<RefCell<Registry>>,
}

impl DismissListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener for `owner` (used in logs only).
    pub fn attach(&self, owner: &'static str) -> DismissGuard {
        let mut registry = self.inner.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.active.push((id, owner));
        tracing::trace!(owner, id = id.0, "dismiss listener attached");
        DismissGuard {
            id,
            owner,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Whether `event` dismisses open overlays.
    pub fn dismisses(event: &UiEvent) -> bool {
        matches!(event, UiEvent::OutsideClick | UiEvent::Key(Key::Escape))
    }

    /// Listeners dismissed by `event`, in attach order.
    pub fn route(&self, event: &UiEvent) -> Vec<ListenerId> {
        if !Self::dismisses(event) {
            return Vec::new();
        }
        let registry = self.inner.borrow();
        for (id, owner) in &registry.active {
            tracing::debug!(owner, id = id.0, ?event, "dismissing overlay");
        }
        registry.active.iter().map(|(id, _)| *id).collect()
    }

    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }
}

impl std::fmt::Debug for DismissListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissListeners")
            .field("active", &self.active_count())
            .finish()
    }
}

/// Keeps a dismiss listener attached. Detaches on drop.
#[must_use = "the listener detaches as soon as the guard is dropped"]
pub struct DismissGuard {
    id: ListenerId,
    owner: &'static str,
    registry: Weak<RefCell<Registry>>,
}

impl DismissGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl std::fmt::Debug for DismissGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissGuard")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .finish()
    }
}

impl Drop for DismissGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .active
                .retain(|(id, _)| *id != self.id);
            tracing::trace!(owner = self.owner, id = self.id.0, "dismiss listener detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_detaches_on_drop() {
        let listeners = DismissListeners::new();
        let first = listeners.attach("dropdown");
        let second = listeners.attach("booking");
        assert_eq!(listeners.active_count(), 2);

        drop(first);
        assert_eq!(listeners.active_count(), 1);
        assert_eq!(listeners.route(&UiEvent::OutsideClick), vec![second.id()]);
    }

    #[test]
    fn guard_detaches_during_unwind() {
        let listeners = DismissListeners::new();
        let handle = listeners.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = handle.attach("booking");
            panic!("render failed");
        }));
        assert!(result.is_err());
        assert_eq!(listeners.active_count(), 0);
    }

    #[test]
    fn only_escape_and_outside_clicks_dismiss() {
        let listeners = DismissListeners::new();
        let guard = listeners.attach("booking");
        assert_eq!(
            listeners.route(&UiEvent::Key(Key::Escape)),
            vec![guard.id()]
        );
        assert!(listeners.route(&UiEvent::Key(Key::Enter)).is_empty());
    }
}
