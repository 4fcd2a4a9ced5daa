//! Doctor filtering by specialty and availability time.
//!
//! Filters are plain `Option<&str>` values coming from the filter dropdowns.
//! A value counts as "no filter" when it is absent, empty, or one of the
//! dropdown placeholders ("Filter by specialty", ...). Whitespace is a real
//! criterion and matches nothing.

use medbook_model::Doctor;

/// Substring identifying a dropdown placeholder label.
pub const PLACEHOLDER_MARKER: &str = "Filter";

/// Minimum number of slots a doctor needs to match an availability filter.
pub const MIN_AVAILABLE_SLOTS: usize = 2;

/// Normalize a raw filter value: `None` means "no filter".
pub fn criterion(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty() && !value.contains(PLACEHOLDER_MARKER))
}

/// Keep the doctors matching both filters, preserving catalog order.
///
/// With no active filter every doctor is returned.
pub fn filter<'a>(
    doctors: &'a [Doctor],
    specialty: Option<&str>,
    availability: Option<&str>,
) -> Vec<&'a Doctor> {
    let specialty = criterion(specialty);
    let availability = criterion(availability);

    if specialty.is_none() && availability.is_none() {
        return doctors.iter().collect();
    }

    doctors
        .iter()
        .filter(|doctor| specialty.is_none_or(|value| matches_specialty(doctor, value)))
        .filter(|doctor| availability.is_none_or(|value| matches_availability(doctor, value)))
        .collect()
}

pub fn matches_specialty(doctor: &Doctor, specialty: &str) -> bool {
    doctor.specialty == specialty
}

/// Whether an available doctor offers `time`.
///
/// Slots are only counted for available doctors, and a doctor must have at
/// least [`MIN_AVAILABLE_SLOTS`] slots to match: a doctor whose single slot
/// is the requested time is excluded. Kept as-is pending product review.
pub fn matches_availability(doctor: &Doctor, time: &str) -> bool {
    let mut counted = 0;
    let mut found = false;

    for slot in &doctor.availability {
        if !doctor.available {
            continue;
        }
        counted += 1;
        if slot.time == time {
            found = true;
        }
        if found && counted >= MIN_AVAILABLE_SLOTS {
            break;
        }
    }

    found && counted >= MIN_AVAILABLE_SLOTS
}
