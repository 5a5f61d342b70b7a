use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use shared_database::SlotStore;
use shared_models::{name_contains, Appointment, Doctor, SLOT_LABELS};

use crate::models::{AvailabilityOutcome, DoctorAvailability, DoctorError, DoctorSlots};
use crate::services::doctor::DoctorService;

pub struct AvailabilityService {
    store: Arc<dyn SlotStore>,
    doctors: DoctorService,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            doctors: DoctorService::new(store.clone()),
            store,
        }
    }

    /// Free slots on `date`, optionally narrowed to doctors whose name
    /// contains `doctor_filter`.
    pub async fn check_availability(
        &self,
        date: NaiveDate,
        doctor_filter: Option<&str>,
    ) -> Result<AvailabilityOutcome, DoctorError> {
        debug!("Checking availability on {} (doctor filter: {:?})", date, doctor_filter);

        let roster = self.doctors.get_roster().await?;
        let appointments = self.store.list_appointments(date).await?;

        Ok(resolve_availability(date, doctor_filter, &roster, &appointments))
    }
}

/// Core availability computation. Pure, so identical inputs always give
/// identical results.
pub fn resolve_availability(
    date: NaiveDate,
    doctor_filter: Option<&str>,
    roster: &[Doctor],
    appointments: &[Appointment],
) -> AvailabilityOutcome {
    let filter = doctor_filter.map(str::trim).filter(|f| !f.is_empty());

    let candidates: Vec<&Doctor> = match filter {
        Some(f) => roster.iter().filter(|doctor| doctor.name_matches(f)).collect(),
        None => roster.iter().collect(),
    };

    if let (Some(requested), true) = (filter, candidates.is_empty()) {
        debug!("No doctor on the roster matches '{}'", requested);
        return AvailabilityOutcome::DoctorNotFound {
            requested: requested.to_string(),
            roster: roster.iter().map(|doctor| doctor.name.clone()).collect(),
        };
    }

    let doctors = candidates
        .into_iter()
        .map(|doctor| DoctorSlots {
            doctor_name: doctor.name.clone(),
            specialty: doctor.specialty.clone(),
            free_slots: free_slots(&doctor.name, appointments),
        })
        .collect();

    AvailabilityOutcome::Resolved(DoctorAvailability { date, doctors })
}

/// The clinic slot labels minus those held by an active appointment whose
/// doctor field contains `doctor_name`. Substring attribution means a
/// booking under "Dr. Sara Malik" also occupies "Sara" if both were on the
/// roster.
pub fn free_slots(doctor_name: &str, appointments: &[Appointment]) -> Vec<String> {
    let booked: HashSet<&str> = appointments
        .iter()
        .filter(|appointment| appointment.status.is_active())
        .filter(|appointment| name_contains(&appointment.doctor, doctor_name))
        .map(|appointment| appointment.time.as_str())
        .collect();

    SLOT_LABELS
        .iter()
        .filter(|label| !booked.contains(*label))
        .map(|label| label.to_string())
        .collect()
}
