use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use doctor_cell::{DoctorError, DoctorService, RosterMatch};
use shared_database::SlotStore;
use shared_models::NewAppointment;

use crate::models::{BookAppointmentRequest, BookingError, BookingOutcome};
use crate::services::conflict::ConflictGuard;

type SlotKey = (String, NaiveDate, String);

enum DoctorResolution {
    Name(String),
    NotFound(Vec<String>),
}

/// Per-slot async locks. Serializes check-then-insert for the same
/// (doctor, date, time) inside one process; other processes can still race.
#[derive(Default)]
pub struct SlotLocks {
    entries: Mutex<HashMap<SlotKey, SlotEntry>>,
}

#[derive(Default)]
struct SlotEntry {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

/// Holds one slot until dropped. The map entry goes away with the last
/// lease, including leases dropped while still waiting.
pub struct SlotLease<'a> {
    locks: &'a SlotLocks,
    key: SlotKey,
    held: Option<OwnedMutexGuard<()>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(doctor: &str, date: NaiveDate, time: &str) -> SlotKey {
        (doctor.trim().to_lowercase(), date, time.to_string())
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<SlotKey, SlotEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn acquire(&self, doctor: &str, date: NaiveDate, time: &str) -> SlotLease<'_> {
        let key = Self::key(doctor, date, time);
        let lock = {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_default();
            entry.users += 1;
            entry.lock.clone()
        };

        let mut lease = SlotLease { locks: self, key, held: None };
        lease.held = Some(lock.lock_owned().await);
        lease
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for SlotLease<'_> {
    fn drop(&mut self) {
        self.held.take();

        let mut entries = self.locks.entries();
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.users = entry.users.saturating_sub(1);
            if entry.users == 0 {
                entries.remove(&self.key);
            }
        }
    }
}

pub struct BookingService {
    store: Arc<dyn SlotStore>,
    doctors: DoctorService,
    guard: ConflictGuard,
    locks: Option<Arc<SlotLocks>>,
}

impl BookingService {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            doctors: DoctorService::new(store.clone()),
            guard: ConflictGuard::new(store.clone()),
            store,
            locks: None,
        }
    }

    pub fn with_slot_locks(mut self, locks: Arc<SlotLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    pub async fn book_appointment(&self, request: BookAppointmentRequest) -> Result<BookingOutcome, BookingError> {
        debug!("Booking {} with {} on {} at {}",
               request.patient_name, request.doctor, request.date, request.time);

        let stored_doctor = match self.resolve_doctor_name(&request.doctor).await? {
            DoctorResolution::Name(name) => name,
            DoctorResolution::NotFound(roster) => {
                return Ok(BookingOutcome::DoctorNotFound {
                    requested: request.doctor.clone(),
                    roster,
                });
            }
        };

        let _lease = match &self.locks {
            Some(locks) => Some(locks.acquire(&stored_doctor, request.date, &request.time).await),
            None => None,
        };

        self.check_and_insert(&request, stored_doctor).await
    }

    /// Name to store the appointment under: the roster entry on a unique
    /// match, the caller's words otherwise.
    async fn resolve_doctor_name(&self, requested: &str) -> Result<DoctorResolution, BookingError> {
        match self.doctors.find_doctor(requested).await {
            Ok(RosterMatch::Unique(doctor)) => Ok(DoctorResolution::Name(doctor.name)),
            Ok(RosterMatch::Ambiguous(matches)) => {
                debug!("'{}' matches {} doctors, storing as spoken", requested, matches.len());
                Ok(DoctorResolution::Name(requested.trim().to_string()))
            }
            Ok(RosterMatch::NotFound { roster }) => Ok(DoctorResolution::NotFound(roster)),
            Err(DoctorError::EmptyRoster) => {
                warn!("Roster unavailable, booking '{}' as spoken", requested);
                Ok(DoctorResolution::Name(requested.trim().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn check_and_insert(
        &self,
        request: &BookAppointmentRequest,
        stored_doctor: String,
    ) -> Result<BookingOutcome, BookingError> {
        // Fresh read; earlier availability answers are not reused.
        if self.guard.check_slot(&request.doctor, request.date, &request.time).await?.is_some() {
            return Ok(BookingOutcome::SlotTaken {
                doctor: stored_doctor,
                date: request.date,
                time: request.time.clone(),
            });
        }

        let appointment = self.store
            .create_appointment(NewAppointment::confirmed(
                request.patient_name.trim(),
                request.patient_phone.clone(),
                stored_doctor,
                request.date,
                request.time.clone(),
            ))
            .await?;

        info!("Appointment confirmed for {} with {} on {} at {}",
              appointment.patient_name, appointment.doctor, appointment.date, appointment.time);

        Ok(BookingOutcome::Confirmed(appointment))
    }
}
