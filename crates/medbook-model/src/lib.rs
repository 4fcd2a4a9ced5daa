//! Data model for the doctor booking application.
//!
//! - [`Doctor`] and [`Slot`]: immutable reference records from the catalog
//! - [`Appointment`]: a booked slot, denormalized from its doctor
//! - [`Catalog`]: the doctor list plus the specialty and time enumerations

pub mod appointment;
pub mod catalog;
pub mod doctor;
pub mod error;

pub use appointment::Appointment;
pub use catalog::Catalog;
pub use doctor::{Doctor, Slot};
pub use error::{CatalogError, Result};
