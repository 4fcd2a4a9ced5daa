//! Booked appointments.

use serde::{Deserialize, Serialize};

use crate::doctor::{Doctor, Slot};

/// A booked slot.
///
/// Carries a full copy of the doctor record so the appointment list renders
/// without looking the doctor up again. `doctor_id` is the upsert key: an
/// appointment list never holds two entries with the same `doctor_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub doctor_id: String,
    /// `"<date>, <time>"` of the booked slot.
    pub date: String,
}

impl Appointment {
    pub fn new(doctor: &Doctor, slot: &Slot) -> Self {
        Self {
            doctor: doctor.clone(),
            doctor_id: doctor.id.clone(),
            date: slot.label(),
        }
    }

    pub fn name(&self) -> &str {
        &self.doctor.name
    }

    pub fn location(&self) -> &str {
        &self.doctor.location
    }

    pub fn tags(&self) -> &[String] {
        &self.doctor.tags
    }
}
