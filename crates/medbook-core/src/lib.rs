//! Core of the doctor booking application.
//!
//! The architecture separates concerns into:
//!
//! - **AppStore**: the single shared state holder (popover selection and
//!   appointments) with subscribe/notify
//! - **filter**: pure doctor filtering by specialty and availability time
//! - **BookingFlow**: slot selection and submit for the selected doctor
//! - **Dropdown**: single-select control with roving keyboard focus
//! - **DismissListeners**: scoped outside-click / Escape listeners
//! - **Boundary**: top-level render guard with a fallback notice
//!
//! Everything here is single-threaded; the store is shared as `Rc<AppStore>`.

pub mod boundary;
pub mod booking;
pub mod dismiss;
pub mod dropdown;
pub mod error;
pub mod filter;
pub mod image;
pub mod input;
pub mod memo;
pub mod store;
pub mod timing;
pub mod view;

pub use boundary::{Boundary, Fallback, Rendered};
pub use booking::{AnchorRect, BookingFlow, BookingView, OpenOutcome, ScrollOffset, SlotOption};
pub use dismiss::{DismissGuard, DismissListeners, ListenerId};
pub use dropdown::{Dropdown, DropdownEvent, DropdownInput, DropdownState, Focus};
pub use error::RenderError;
pub use filter::filter;
pub use image::LazyImage;
pub use input::{Key, UiEvent};
pub use memo::Memo;
pub use store::{Action, AppState, AppStore, PopoverPosition, Subscription};
pub use timing::{Debouncer, Throttle};
pub use view::{AppointmentCardView, CardAction, DoctorCardView, EmptyState};
