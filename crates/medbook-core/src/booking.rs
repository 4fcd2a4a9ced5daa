//! Booking popover controller.
//!
//! [`BookingFlow`] sits between a doctor's "Book Now" trigger and the
//! [`AppStore`]. The chosen slot is local to the flow and only reaches the
//! store when the booking is submitted.

use medbook_model::{Appointment, Doctor, Slot};

use crate::dismiss::{DismissGuard, DismissListeners, ListenerId};
use crate::input::Key;
use crate::store::{AppState, AppStore, PopoverPosition};

/// Distance between the top of the trigger row and the popover.
pub const POPOVER_OFFSET: f64 = 60.0;

/// Viewport rectangle of the element that opened the popover.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnchorRect {
    pub top: f64,
    pub left: f64,
}

/// Current document scroll offset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl PopoverPosition {
    /// Position the popover just below `anchor`, in document coordinates.
    pub fn below(anchor: AnchorRect, scroll: ScrollOffset) -> Self {
        Self {
            top: anchor.top + scroll.y + POPOVER_OFFSET,
            left: anchor.left + scroll.x,
        }
    }
}

/// Result of activating a doctor's booking trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// Unavailable doctors have no booking trigger.
    Unavailable,
    /// The trigger is disabled once the doctor has an appointment.
    AlreadyBooked,
}

/// One row of the popover's time list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOption {
    pub time: String,
    pub date: String,
    pub selected: bool,
}

/// Everything the view needs to draw the popover.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingView {
    pub doctor_name: String,
    pub status: &'static str,
    pub slots: Vec<SlotOption>,
    /// Confirm is disabled until a slot is picked.
    pub can_confirm: bool,
    pub visible: bool,
    pub position: PopoverPosition,
}

#[derive(Debug)]
pub struct BookingFlow {
    selected_slot: Option<Slot>,
    listeners: DismissListeners,
    dismiss: Option<DismissGuard>,
}

impl BookingFlow {
    pub fn new(listeners: DismissListeners) -> Self {
        Self {
            selected_slot: None,
            listeners,
            dismiss: None,
        }
    }

    pub fn selected_slot(&self) -> Option<&Slot> {
        self.selected_slot.as_ref()
    }

    pub fn can_submit(&self) -> bool {
        self.selected_slot.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.dismiss.is_some()
    }

    pub fn listens_on(&self, id: ListenerId) -> bool {
        self.dismiss.as_ref().is_some_and(|guard| guard.id() == id)
    }

    /// Handle activation of `doctor`'s "Book Now" trigger.
    pub fn open(
        &mut self,
        store: &AppStore,
        doctor: &Doctor,
        anchor: AnchorRect,
        scroll: ScrollOffset,
    ) -> OpenOutcome {
        if !doctor.available {
            return OpenOutcome::Unavailable;
        }
        if store.with_state(|state| state.is_booked(&doctor.id)) {
            return OpenOutcome::AlreadyBooked;
        }

        self.selected_slot = None;
        self.dismiss = Some(self.listeners.attach("booking"));
        store.open_booking(doctor.clone(), PopoverPosition::below(anchor, scroll));
        tracing::info!(doctor = %doctor.id, "booking opened");
        OpenOutcome::Opened
    }

    /// Pick the selected doctor's slot at `time`.
    ///
    /// Returns `false` when the popover is closed or the doctor has no such
    /// slot.
    pub fn select_slot(&mut self, state: &AppState, time: &str) -> bool {
        if !state.visible {
            return false;
        }
        let Some(slot) = state
            .selected_doctor
            .as_ref()
            .and_then(|doctor| doctor.slot(time))
        else {
            return false;
        };
        self.selected_slot = Some(slot.clone());
        tracing::debug!(time, "slot selected");
        true
    }

    /// Key pressed on a slot row: Enter and Space pick it.
    pub fn slot_key(&mut self, state: &AppState, time: &str, key: Key) -> bool {
        key.is_activation() && self.select_slot(state, time)
    }

    /// Book the selected slot. No-op while no slot is selected.
    pub fn submit(&mut self, store: &AppStore) -> Option<Appointment> {
        let slot = self.selected_slot.as_ref()?;
        let doctor = store.with_state(|state| state.selected_doctor.clone())?;

        store.upsert_appointment(&doctor, slot);
        tracing::info!(doctor = %doctor.id, slot = %slot, "appointment booked");
        let appointment = Appointment::new(&doctor, slot);
        self.selected_slot = None;
        self.dismiss = None;
        Some(appointment)
    }

    /// Key pressed on the confirm control.
    pub fn confirm_key(&mut self, store: &AppStore, key: Key) -> Option<Appointment> {
        if key.is_activation() && self.can_submit() {
            self.submit(store)
        } else {
            None
        }
    }

    /// Close the popover without booking.
    pub fn dismiss(&mut self, store: &AppStore) {
        self.selected_slot = None;
        self.dismiss = None;
        store.close_booking();
        tracing::debug!("booking dismissed");
    }

    /// Popover contents, or `None` when no doctor is selected.
    pub fn view(&self, state: &AppState) -> Option<BookingView> {
        let doctor = state.selected_doctor.as_ref()?;
        let selected_time = self.selected_slot.as_ref().map(|slot| slot.time.as_str());
        Some(BookingView {
            doctor_name: doctor.name.clone(),
            status: doctor.availability_label(),
            slots: doctor
                .availability
                .iter()
                .map(|slot| SlotOption {
                    time: slot.time.clone(),
                    date: slot.date.clone(),
                    selected: selected_time == Some(slot.time.as_str()),
                })
                .collect(),
            can_confirm: self.can_submit(),
            visible: state.visible,
            position: state.popover_position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor() -> Doctor {
        Doctor {
            id: "d".to_string(),
            name: "Dr. D".to_string(),
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
    fn popover_sits_below_anchor() {
        let position = PopoverPosition::below(
            AnchorRect { top: 100.0, left: 12.0 },
            ScrollOffset { x: 3.0, y: 40.0 },
        );
        assert_eq!(position, PopoverPosition::new(200.0, 15.0));
    }

    #[test]
    fn submit_without_slot_is_noop() {
        let store = AppStore::new();
        let mut flow = BookingFlow::new(DismissListeners::new());
        flow.open(&store, &doctor(), AnchorRect::default(), ScrollOffset::default());

        assert!(flow.submit(&store).is_none());
        let state = store.state();
        assert!(state.visible);
        assert!(state.appointments.is_empty());
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let store = AppStore::new();
        let mut flow = BookingFlow::new(DismissListeners::new());
        flow.open(&store, &doctor(), AnchorRect::default(), ScrollOffset::default());
        assert!(!flow.select_slot(&store.state(), "7:00 PM"));
        assert!(!flow.can_submit());
    }

    #[test]
    fn slot_key_needs_activation() {
        let store = AppStore::new();
        let mut flow = BookingFlow::new(DismissListeners::new());
        flow.open(&store, &doctor(), AnchorRect::default(), ScrollOffset::default());
        let state = store.state();
        assert!(!flow.slot_key(&state, "1:00 PM", Key::ArrowDown));
        assert!(flow.slot_key(&state, "1:00 PM", Key::Space));
        assert_eq!(flow.selected_slot().map(|s| s.date.as_str()), Some("Apr 24"));
    }

    #[test]
    fn unavailable_and_booked_doctors_do_not_open() {
        let store = AppStore::new();
        let mut flow = BookingFlow::new(DismissListeners::new());
        let mut away = doctor();
        away.available = false;
        assert_eq!(
            flow.open(&store, &away, AnchorRect::default(), ScrollOffset::default()),
            OpenOutcome::Unavailable
        );

        let booked = doctor();
        store.upsert_appointment(&booked, &booked.availability[0]);
        assert_eq!(
            flow.open(&store, &booked, AnchorRect::default(), ScrollOffset::default()),
            OpenOutcome::AlreadyBooked
        );
        assert!(!store.state().visible);
    }

    #[test]
    fn dismiss_clears_slot_and_listener() {
        let listeners = DismissListeners::new();
        let store = AppStore::new();
        let mut flow = BookingFlow::new(listeners.clone());
        flow.open(&store, &doctor(), AnchorRect::default(), ScrollOffset::default());
        flow.select_slot(&store.state(), "10:00 AM");
        assert_eq!(listeners.active_count(), 1);

        flow.dismiss(&store);
        assert!(flow.selected_slot().is_none());
        assert_eq!(listeners.active_count(), 0);
        assert!(!store.state().visible);
        assert!(store.state().appointments.is_empty());
    }

    #[test]
    fn view_marks_selected_slot() {
        let store = AppStore::new();
        let mut flow = BookingFlow::new(DismissListeners::new());
        assert!(flow.view(&store.state()).is_none());

        flow.open(&store, &doctor(), AnchorRect::default(), ScrollOffset::default());
        flow.select_slot(&store.state(), "1:00 PM");
        let view = flow.view(&store.state()).expect("popover view");
        assert_eq!(view.doctor_name, "Dr. D");
        assert_eq!(view.status, "Available");
        assert!(view.can_confirm);
        assert_eq!(
            view.slots.iter().map(|s| s.selected).collect::<Vec<_>>(),
            vec![false, true]
        );
    }
}
