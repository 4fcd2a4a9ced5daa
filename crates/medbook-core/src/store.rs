//! Shared application state.
//!
//! [`AppStore`] owns the booking popover selection and the appointment list.
//! Consumers receive it as an `Rc<AppStore>` handle instead of reaching for a
//! global. Every mutator is expressed as one [`Action`]; the reducer applies
//! it in full before any listener runs, so listeners never observe a partial
//! update.
//!
//! # Reentrancy
//!
//! A listener may call mutators on the store it is subscribed to. Such
//! actions are queued and applied once the current notification round has
//! finished; each queued action then triggers its own round.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use medbook_model::{Appointment, Doctor, Slot};
use serde::Serialize;

/// Pixel coordinates of the booking popover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PopoverPosition {
    pub top: f64,
    pub left: f64,
}

impl PopoverPosition {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

/// Snapshot of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Whether the booking popover is open.
    pub visible: bool,
    pub selected_doctor: Option<Doctor>,
    pub popover_position: PopoverPosition,
    /// Appointments in booking order.
    pub appointments: Vec<Appointment>,
}

impl AppState {
    pub fn appointment(&self, doctor_id: &str) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|appointment| appointment.doctor_id == doctor_id)
    }

    /// Whether the doctor already has an appointment.
    pub fn is_booked(&self, doctor_id: &str) -> bool {
        self.appointment(doctor_id).is_some()
    }
}

/// A single state transition.
#[derive(Debug, Clone)]
pub enum Action {
    SetVisible(bool),
    SetSelectedDoctor(Option<Doctor>),
    SetPopoverPosition(PopoverPosition),
    /// Select a doctor, position the popover and show it.
    OpenBooking {
        doctor: Doctor,
        position: PopoverPosition,
    },
    /// Hide the popover and drop the selected doctor.
    CloseBooking,
    /// Insert or replace by `doctor_id`, then close the popover.
    UpsertAppointment(Appointment),
    CancelAppointment(String),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::SetVisible(_) => "set_visible",
            Action::SetSelectedDoctor(_) => "set_selected_doctor",
            Action::SetPopoverPosition(_) => "set_popover_position",
            Action::OpenBooking { .. } => "open_booking",
            Action::CloseBooking => "close_booking",
            Action::UpsertAppointment(_) => "upsert_appointment",
            Action::CancelAppointment(_) => "cancel_appointment",
        }
    }
}

/// Apply an action. Returns whether the state changed.
fn reduce(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::SetVisible(visible) => replace(&mut state.visible, visible),
        Action::SetSelectedDoctor(doctor) => replace(&mut state.selected_doctor, doctor),
        Action::SetPopoverPosition(position) => replace(&mut state.popover_position, position),
        Action::OpenBooking { doctor, position } => {
            state.selected_doctor = Some(doctor);
            state.popover_position = position;
            state.visible = true;
            true
        }
        Action::CloseBooking => {
            let changed = state.visible || state.selected_doctor.is_some();
            state.visible = false;
            state.selected_doctor = None;
            changed
        }
        Action::UpsertAppointment(appointment) => {
            match state
                .appointments
                .iter_mut()
                .find(|existing| existing.doctor_id == appointment.doctor_id)
            {
                Some(existing) => *existing = appointment,
                None => state.appointments.push(appointment),
            }
            state.visible = false;
            state.selected_doctor = None;
            true
        }
        Action::CancelAppointment(doctor_id) => {
            let before = state.appointments.len();
            state
                .appointments
                .retain(|appointment| appointment.doctor_id != doctor_id);
            before != state.appointments.len()
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

type Listener = Box<dyn FnMut(&AppState)>;

struct ListenerEntry {
    id: u64,
    callback: Listener,
}

/// Ends a dispatch loop, normally or while unwinding from a listener.
///
/// Actions still queued when a listener panics are dropped so that the next
/// dispatch does not apply them behind the caller's back.
struct DispatchGuard<'a>(&'a AppStore);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let store = self.0;
        if std::thread::panicking() {
            let dropped = store.pending.borrow_mut().drain(..).count();
            if dropped > 0 {
                tracing::warn!(dropped, "listener panicked, queued actions discarded");
            }
        }
        store.removed.borrow_mut().clear();
        store.dispatching.set(false);
    }
}

/// Listeners taken out of the store for one notification round.
///
/// Dropping the round puts them back, minus the ones unsubscribed while it
/// ran, even if a listener panicked.
struct NotifyRound<'a> {
    store: &'a AppStore,
    active: Vec<ListenerEntry>,
}

impl Drop for NotifyRound<'_> {
    fn drop(&mut self) {
        let mut active = std::mem::take(&mut self.active);
        let mut listeners = self.store.listeners.borrow_mut();
        active.append(&mut listeners);
        let removed = self.store.removed.borrow();
        active.retain(|entry| !removed.contains(&entry.id));
        *listeners = active;
    }
}

/// Observable application state.
#[derive(Default)]
pub struct AppStore {
    state: RefCell<AppState>,
    listeners: RefCell<Vec<ListenerEntry>>,
    /// Ids unsubscribed while a notification round was running.
    removed: RefCell<Vec<u64>>,
    pending: RefCell<VecDeque<Action>>,
    dispatching: Cell<bool>,
    next_id: Cell<u64>,
}

impl AppStore {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Read the current state without cloning it.
    ///
    /// The closure must not dispatch; use [`AppStore::state`] when a
    /// snapshot needs to outlive the call.
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn set_visible(&self, visible: bool) {
        self.dispatch(Action::SetVisible(visible));
    }

    pub fn set_selected_doctor(&self, doctor: Option<Doctor>) {
        self.dispatch(Action::SetSelectedDoctor(doctor));
    }

    pub fn set_popover_position(&self, position: PopoverPosition) {
        self.dispatch(Action::SetPopoverPosition(position));
    }

    pub fn open_booking(&self, doctor: Doctor, position: PopoverPosition) {
        self.dispatch(Action::OpenBooking { doctor, position });
    }

    pub fn close_booking(&self) {
        self.dispatch(Action::CloseBooking);
    }

    /// Book `slot` with `doctor`, replacing any appointment the doctor
    /// already has while keeping its position in the list.
    pub fn upsert_appointment(&self, doctor: &Doctor, slot: &Slot) {
        self.dispatch(Action::UpsertAppointment(Appointment::new(doctor, slot)));
    }

    /// Remove the doctor's appointment. Unknown ids are ignored.
    pub fn cancel_appointment(&self, doctor_id: &str) {
        self.dispatch(Action::CancelAppointment(doctor_id.to_string()));
    }

    /// Apply an action and notify listeners if the state changed.
    pub fn dispatch(&self, action: Action) {
        self.pending.borrow_mut().push_back(action);
        if self.dispatching.get() {
            tracing::trace!("store busy, action queued");
            return;
        }

        self.dispatching.set(true);
        let _guard = DispatchGuard(self);
        loop {
            let Some(action) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            let name = action.name();
            let changed = reduce(&mut self.state.borrow_mut(), action);
            tracing::debug!(action = name, changed, "store action applied");
            if changed {
                self.notify();
            }
        }
    }

    /// Register a listener called after every state change.
    ///
    /// The listener stays attached until the returned [`Subscription`] is
    /// dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe(self: &Rc<Self>, listener: impl FnMut(&AppState) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push(ListenerEntry {
            id,
            callback: Box::new(listener),
        });
        tracing::trace!(id, "listener subscribed");
        Subscription {
            id,
            store: Rc::downgrade(self),
        }
    }

    pub fn listener_count(&self) -> usize {
        let removed = self.removed.borrow();
        self.listeners
            .borrow()
            .iter()
            .filter(|entry| !removed.contains(&entry.id))
            .count()
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners.borrow_mut().retain(|entry| entry.id != id);
        if self.dispatching.get() {
            self.removed.borrow_mut().push(id);
        }
        tracing::trace!(id, "listener unsubscribed");
    }

    fn notify(&self) {
        let snapshot = self.state.borrow().clone();
        // Listeners are moved out while they run so they can subscribe or
        // unsubscribe without hitting a live borrow.
        let mut round = NotifyRound {
            store: self,
            active: std::mem::take(&mut *self.listeners.borrow_mut()),
        };
        for entry in &mut round.active {
            if self.removed.borrow().contains(&entry.id) {
                continue;
            }
            (entry.callback)(&snapshot);
        }
    }
}

/// Handle returned by [`AppStore::subscribe`]. Detaches on drop.
#[must_use = "dropping a subscription detaches the listener"]
pub struct Subscription {
    id: u64,
    store: Weak<AppStore>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    fn doctor(id: &str) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: format!("Dr. {id}"),
            image: String::new(),
            rate: 4.0,
            available: true,
            location: "Boston".to_string(),
            specialty: "Cardiology".to_string(),
            tags: vec![],
            availability: vec![
                Slot::new("10:00 AM", "Apr 23"),
                Slot::new("1:00 PM", "Apr 24"),
            ],
        }
    }

    #[test]
    fn upsert_replaces_in_place() {
        let store = AppStore::new();
        let a = doctor("a");
        let b = doctor("b");
        store.upsert_appointment(&a, &a.availability[0]);
        store.upsert_appointment(&b, &b.availability[0]);
        store.upsert_appointment(&a, &a.availability[1]);

        let state = store.state();
        let ids: Vec<_> = state.appointments.iter().map(|x| x.doctor_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(state.appointments[0].date, "Apr 24, 1:00 PM");
    }

    #[test]
    fn upsert_closes_popover() {
        let store = AppStore::new();
        let a = doctor("a");
        store.open_booking(a.clone(), PopoverPosition::new(100.0, 20.0));
        assert!(store.state().visible);

        store.upsert_appointment(&a, &a.availability[0]);
        let state = store.state();
        assert!(!state.visible);
        assert!(state.selected_doctor.is_none());
    }

    #[test]
    fn cancel_unknown_is_silent() {
        let store = AppStore::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = store.subscribe(move |_| counter.set(counter.get() + 1));

        store.cancel_appointment("missing");
        assert_eq!(calls.get(), 0);
        assert!(store.state().appointments.is_empty());
    }

    #[test]
    fn unchanged_setter_does_not_notify() {
        let store = AppStore::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = store.subscribe(move |_| counter.set(counter.get() + 1));

        store.set_visible(false);
        assert_eq!(calls.get(), 0);
        store.set_visible(true);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn dropping_subscription_detaches() {
        let store = AppStore::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let sub = store.subscribe(move |_| counter.set(counter.get() + 1));
        assert_eq!(store.listener_count(), 1);

        sub.unsubscribe();
        assert_eq!(store.listener_count(), 0);
        store.set_visible(true);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn listener_sees_whole_transition() {
        let store = AppStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _sub = store.subscribe(move |state| {
            log.borrow_mut().push((
                state.visible,
                state.selected_doctor.as_ref().map(|d| d.id.clone()),
                state.popover_position,
            ));
        });

        store.open_booking(doctor("a"), PopoverPosition::new(60.0, 8.0));
        assert_eq!(
            *seen.borrow(),
            vec![(true, Some("a".to_string()), PopoverPosition::new(60.0, 8.0))]
        );
    }

    #[test]
    fn writes_from_listener_are_queued() {
        let store = AppStore::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let handle = Rc::downgrade(&store);
        let log = Rc::clone(&order);
        let _closer = store.subscribe(move |state| {
            log.borrow_mut().push(state.visible);
            if state.visible {
                if let Some(store) = handle.upgrade() {
                    store.set_visible(false);
                }
            }
        });

        store.set_visible(true);
        assert_eq!(*order.borrow(), vec![true, false]);
        assert!(!store.state().visible);
    }

    #[test]
    fn panicking_listener_keeps_others_attached() {
        let store = AppStore::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _healthy = store.subscribe(move |_| counter.set(counter.get() + 1));
        let armed = Rc::new(Cell::new(true));
        let trigger = Rc::clone(&armed);
        let _faulty = store.subscribe(move |_| {
            if trigger.replace(false) {
                panic!("listener failed");
            }
        });

        let result = panic::catch_unwind(AssertUnwindSafe(|| store.set_visible(true)));
        assert!(result.is_err());
        assert_eq!(store.listener_count(), 2);
        assert_eq!(calls.get(), 1);

        store.set_visible(false);
        assert_eq!(calls.get(), 2);
        assert!(!store.state().visible);
    }

    #[test]
    fn writes_queued_before_a_panic_are_discarded() {
        let store = AppStore::new();
        let handle = Rc::downgrade(&store);
        let armed = Rc::new(Cell::new(true));
        let trigger = Rc::clone(&armed);
        let _faulty = store.subscribe(move |_| {
            if trigger.replace(false) {
                if let Some(store) = handle.upgrade() {
                    store.set_popover_position(PopoverPosition::new(9.0, 9.0));
                }
                panic!("listener failed");
            }
        });

        let result = panic::catch_unwind(AssertUnwindSafe(|| store.set_visible(true)));
        assert!(result.is_err());
        assert_eq!(store.state().popover_position, PopoverPosition::default());

        store.set_selected_doctor(None);
        store.set_visible(false);
        let state = store.state();
        assert_eq!(state.popover_position, PopoverPosition::default());
        assert!(!state.visible);
    }

    #[test]
    fn listener_can_unsubscribe_itself() {
        let store = AppStore::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let inner = Rc::clone(&slot);
        let counter = Rc::clone(&calls);
        let sub = store.subscribe(move |_| {
            counter.set(counter.get() + 1);
            inner.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        store.set_visible(true);
        store.set_visible(false);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.listener_count(), 0);
    }
}
