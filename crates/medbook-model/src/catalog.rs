//! Doctor catalog loading and validation.
//!
//! The catalog is read-only reference data: the doctor list plus the two
//! enumerations the filter dropdowns offer (specialties and availability
//! times). It is loaded once at startup and never mutated afterwards.
//!
//! # Format
//!
//! ```json
//! {
//!   "specialties": ["Cardiology"],
//!   "availabilityTimes": ["10:00 AM"],
//!   "doctors": [{ "id": "1", "name": "...", "specialty": "Cardiology", ... }]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::doctor::{Doctor, MAX_RATE};
use crate::error::{CatalogError, Result};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Doctor list and filter enumerations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Valid specialty values, in dropdown order.
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Valid availability times, in dropdown order.
    #[serde(default)]
    pub availability_times: Vec<String>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

impl Catalog {
    /// Parse and validate a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read, parse and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            doctors = catalog.doctors.len(),
            "loaded doctor catalog"
        );
        Ok(catalog)
    }

    /// The sample catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn doctor(&self, id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|doctor| doctor.id == id)
    }

    /// Check catalog invariants.
    ///
    /// Ids must be non-empty and unique, ratings within `0..=5`, and
    /// specialties members of [`Catalog::specialties`] when that list is
    /// given. Slot times outside [`Catalog::availability_times`] are only
    /// logged, they stay bookable.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let known_times: HashSet<&str> = self
            .availability_times
            .iter()
            .map(String::as_str)
            .collect();

        for (index, doctor) in self.doctors.iter().enumerate() {
            if doctor.id.trim().is_empty() {
                return Err(CatalogError::EmptyId { index });
            }
            if !seen.insert(doctor.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: doctor.id.clone(),
                });
            }
            if !(0.0..=MAX_RATE).contains(&doctor.rate) {
                return Err(CatalogError::RateOutOfRange {
                    id: doctor.id.clone(),
                    rate: doctor.rate,
                });
            }
            if !self.specialties.is_empty() && !self.specialties.contains(&doctor.specialty) {
                return Err(CatalogError::UnknownSpecialty {
                    id: doctor.id.clone(),
                    specialty: doctor.specialty.clone(),
                });
            }
            if !known_times.is_empty() {
                for slot in &doctor.availability {
                    if !known_times.contains(slot.time.as_str()) {
                        tracing::warn!(
                            doctor = %doctor.id,
                            time = %slot.time,
                            "slot time is not one of the catalog availability times"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
