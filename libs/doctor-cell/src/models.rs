use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::Doctor;

/// Free hours of one doctor on one date, in clinic slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorSlots {
    pub doctor_name: String,
    pub specialty: String,
    pub free_slots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorAvailability {
    pub date: NaiveDate,
    /// Roster order, after any name filter.
    pub doctors: Vec<DoctorSlots>,
}

impl DoctorAvailability {
    pub fn is_fully_booked(&self) -> bool {
        self.doctors.iter().all(|doctor| doctor.free_slots.is_empty())
    }

    pub fn with_free_slots(&self) -> impl Iterator<Item = &DoctorSlots> {
        self.doctors.iter().filter(|doctor| !doctor.free_slots.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityOutcome {
    Resolved(DoctorAvailability),
    /// The name filter matched nobody. Carries the whole roster so the caller
    /// can be offered alternatives.
    DoctorNotFound { requested: String, roster: Vec<String> },
}

/// Result of looking a spoken doctor name up on the roster.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterMatch {
    Unique(Doctor),
    Ambiguous(Vec<Doctor>),
    NotFound { roster: Vec<String> },
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Doctor roster is empty")]
    EmptyRoster,
}
