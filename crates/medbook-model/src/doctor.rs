//! Doctor reference records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest rating a doctor can carry.
pub const MAX_RATE: f64 = 5.0;

/// One bookable `{time, date}` pair belonging to a doctor.
///
/// Both fields are display strings taken verbatim from the catalog
/// (e.g. `"10:00 AM"` and `"Apr 23"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub time: String,
    pub date: String,
}

impl Slot {
    pub fn new(time: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            date: date.into(),
        }
    }

    /// Display label used for a booked appointment: `"<date>, <time>"`.
    pub fn label(&self) -> String {
        format!("{}, {}", self.date, self.time)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.date, self.time)
    }
}

/// A doctor as listed in the catalog. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    /// Portrait URL.
    pub image: String,
    /// Rating between 0 and [`MAX_RATE`].
    pub rate: f64,
    pub available: bool,
    pub location: String,
    pub specialty: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Bookable slots in catalog order.
    #[serde(default)]
    pub availability: Vec<Slot>,
}

impl Doctor {
    /// Find a slot by its time label.
    pub fn slot(&self, time: &str) -> Option<&Slot> {
        self.availability.iter().find(|slot| slot.time == time)
    }

    /// Number of filled rating stars (the rating rounded down).
    pub fn full_stars(&self) -> u8 {
        self.rate.clamp(0.0, MAX_RATE).floor() as u8
    }

    /// Label shown under the doctor's name.
    pub fn availability_label(&self) -> &'static str {
        if self.available {
            "Available"
        } else {
            "Unavailable"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(rate: f64) -> Doctor {
        Doctor {
            id: "d1".to_string(),
            name: "Dr. Sarah Johnson".to_string(),
            image: "https://example.com/sarah.jpg".to_string(),
            rate,
            available: true,
            location: "Boston".to_string(),
            specialty: "Cardiology".to_string(),
            tags: vec!["Heart".to_string()],
            availability: vec![Slot::new("10:00 AM", "Apr 23")],
        }
    }

    #[test]
    fn slot_label_puts_date_first() {
        let slot = Slot::new("10:00 AM", "Apr 23");
        assert_eq!(slot.label(), "Apr 23, 10:00 AM");
        assert_eq!(slot.to_string(), slot.label());
    }

    #[test]
    fn full_stars_rounds_down() {
        assert_eq!(doctor(4.7).full_stars(), 4);
        assert_eq!(doctor(5.0).full_stars(), 5);
        assert_eq!(doctor(0.4).full_stars(), 0);
    }

    #[test]
    fn finds_slot_by_time() {
        let doctor = doctor(4.0);
        assert_eq!(doctor.slot("10:00 AM").map(|s| s.date.as_str()), Some("Apr 23"));
        assert!(doctor.slot("1:00 PM").is_none());
    }
}
