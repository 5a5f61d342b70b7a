use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use shared_database::{SlotStore, StoreError};
use shared_models::{name_contains, Appointment};

use crate::models::SlotConflict;

/// Re-reads the appointment book right before an insert. The read and the
/// following insert are separate store calls, so two bookings for the same
/// slot can both pass here; see `SlotLocks` for the in-process mitigation.
pub struct ConflictGuard {
    store: Arc<dyn SlotStore>,
}

impl ConflictGuard {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Check for an active appointment with `doctor` at `time` on `date`.
    pub async fn check_slot(
        &self,
        doctor: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<SlotConflict>, StoreError> {
        debug!("Checking conflicts for {} on {} at {}", doctor, date, time);

        let appointments = self.store.list_appointments(date).await?;
        let conflict = find_conflict(doctor, time, &appointments).cloned();

        if let Some(existing) = &conflict {
            warn!("Conflict detected for {} on {} at {} (held by {})",
                  doctor, date, time, existing.doctor);
        }

        Ok(conflict.map(|existing| SlotConflict { existing }))
    }
}

/// First appointment that is not cancelled, sits at exactly `time`, and whose
/// doctor field contains `doctor` ignoring case.
pub fn find_conflict<'a>(doctor: &str, time: &str, appointments: &'a [Appointment]) -> Option<&'a Appointment> {
    appointments.iter().find(|appointment| {
        appointment.status.is_active()
            && appointment.time == time
            && name_contains(&appointment.doctor, doctor)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::AppointmentStatus;
    use shared_utils::test_utils::{appointment, clinic_date};

    #[test]
    fn active_booking_at_same_time_conflicts() {
        let booked = vec![appointment("Dr. Ahmed Khan", clinic_date(), "10:00 AM", AppointmentStatus::Confirmed)];
        assert!(find_conflict("ahmed", "10:00 AM", &booked).is_some());
    }

    #[test]
    fn cancelled_booking_does_not_conflict() {
        let booked = vec![appointment("Dr. Ahmed Khan", clinic_date(), "10:00 AM", AppointmentStatus::Cancelled)];
        assert!(find_conflict("Ahmed", "10:00 AM", &booked).is_none());
    }

    #[test]
    fn other_doctor_or_time_does_not_conflict() {
        let booked = vec![appointment("Dr. Ahmed Khan", clinic_date(), "10:00 AM", AppointmentStatus::Confirmed)];
        assert!(find_conflict("Sara", "10:00 AM", &booked).is_none());
        assert!(find_conflict("Ahmed", "11:00 AM", &booked).is_none());
    }
}
