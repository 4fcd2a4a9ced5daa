//! View models for doctor and appointment cards.

use chrono::NaiveDateTime;
use medbook_model::{Appointment, Doctor};

use crate::image::LazyImage;
use crate::store::AppState;

pub const MAX_STARS: u8 = 5;

/// Booking control shown on a doctor card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    BookNow,
    /// Already has an appointment; the control is disabled.
    Booked,
    /// Unavailable doctors get no control.
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorCardView<'a> {
    pub doctor: &'a Doctor,
    pub image: LazyImage,
    /// Filled stars out of [`MAX_STARS`].
    pub stars: u8,
    pub status: &'static str,
    pub action: CardAction,
}

impl<'a> DoctorCardView<'a> {
    pub fn new(doctor: &'a Doctor, state: &AppState) -> Self {
        let action = if !doctor.available {
            CardAction::Hidden
        } else if state.is_booked(&doctor.id) {
            CardAction::Booked
        } else {
            CardAction::BookNow
        };
        Self {
            doctor,
            image: LazyImage::new(doctor.image.clone()),
            stars: doctor.full_stars(),
            status: doctor.availability_label(),
            action,
        }
    }

    /// Star bar such as `★★★★☆`.
    pub fn star_bar(&self) -> String {
        (0..MAX_STARS)
            .map(|index| if index < self.stars { '★' } else { '☆' })
            .collect()
    }

    pub fn rating_label(&self) -> String {
        format!("Rating: {} out of {MAX_STARS}", self.doctor.rate)
    }

    pub fn action_label(&self) -> Option<&'static str> {
        match self.action {
            CardAction::BookNow => Some("Book Now"),
            CardAction::Booked => Some("Booked"),
            CardAction::Hidden => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentCardView {
    pub doctor_id: String,
    pub name: String,
    /// `"<date>, <time>"` as booked.
    pub date: String,
    /// Long form such as `April 23, 2026 10:00 AM`, when the date parses.
    pub long_date: Option<String>,
    pub tags: String,
    pub location: String,
}

impl AppointmentCardView {
    /// Build the card; a missing appointment renders nothing.
    pub fn new(appointment: Option<&Appointment>, year: i32) -> Option<Self> {
        let appointment = appointment?;
        Some(Self {
            doctor_id: appointment.doctor_id.clone(),
            name: appointment.name().to_string(),
            date: appointment.date.clone(),
            long_date: long_date(&appointment.date, year),
            tags: appointment.tags().join(", "),
            location: appointment.location().to_string(),
        })
    }

    /// Display date, preferring the long form.
    pub fn display_date(&self) -> &str {
        self.long_date.as_deref().unwrap_or(&self.date)
    }
}

/// Expand a `"Apr 23, 10:00 AM"` label into `"April 23, 2026 10:00 AM"`.
///
/// Catalog dates carry no year, so the caller supplies one.
pub fn long_date(label: &str, year: i32) -> Option<String> {
    let parsed =
        NaiveDateTime::parse_from_str(&format!("{label} {year}"), "%b %d, %I:%M %p %Y").ok()?;
    Some(parsed.format("%B %-d, %Y %-I:%M %p").to_string())
}

/// Placeholder shown when a list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoDoctors,
    NoAppointments,
}

impl EmptyState {
    pub fn title(self) -> &'static str {
        match self {
            EmptyState::NoDoctors => "No Doctors Yet",
            EmptyState::NoAppointments => "No Appointments Yet",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoDoctors => {
                "We couldn't find any doctors match your criteria. Try changing the Filters \
                 or check back later."
            }
            EmptyState::NoAppointments => {
                "You don't have any upcoming appointments. Book a doctor to get started."
            }
        }
    }
}
