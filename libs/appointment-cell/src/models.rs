use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use doctor_cell::DoctorError;
use shared_database::StoreError;
use shared_models::Appointment;

// ==============================================================================
// BOOKING REQUESTS
// ==============================================================================

/// A validated booking request. `time` is always one of the clinic slot
/// labels by the time it gets here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_name: String,
    pub patient_phone: Option<String>,
    pub doctor: String,
    pub date: NaiveDate,
    pub time: String,
}

// ==============================================================================
// OUTCOMES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BookingOutcome {
    Confirmed(Appointment),
    /// An active appointment already holds the slot.
    SlotTaken {
        doctor: String,
        date: NaiveDate,
        time: String,
    },
    DoctorNotFound {
        requested: String,
        roster: Vec<String>,
    },
}

/// An active appointment that blocks a requested slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotConflict {
    pub existing: Appointment,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DoctorError> for BookingError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::Store(store) => BookingError::Store(store),
            DoctorError::EmptyRoster => {
                BookingError::Store(StoreError::Unavailable("doctor roster is empty".to_string()))
            }
        }
    }
}
