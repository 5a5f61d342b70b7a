use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use shared_config::{AppConfig, DateStyle};
use shared_database::{SlotStore, StoreError};
use shared_models::{Appointment, AppointmentStatus, Doctor, NewAppointment};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub webhook_secret: Option<String>,
    pub date_style: DateStyle,
    pub booking_slot_lock: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            webhook_secret: None,
            date_style: DateStyle::Long,
            booking_slot_lock: false,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            webhook_secret: self.webhook_secret.clone(),
            date_style: self.date_style,
            booking_slot_lock: self.booking_slot_lock,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub fn doctor(name: &str, specialty: &str) -> Doctor {
    Doctor {
        name: name.to_string(),
        specialty: specialty.to_string(),
        available_days: None,
        available_hours: None,
    }
}

pub fn appointment(doctor: &str, date: NaiveDate, time: &str, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: None,
        patient_name: "Existing Patient".to_string(),
        patient_phone: None,
        doctor: doctor.to_string(),
        date,
        time: time.to_string(),
        status,
    }
}

pub fn clinic_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

/// Slot store held in memory, with switches for latency and outages.
#[derive(Default)]
pub struct InMemorySlotStore {
    doctors: Mutex<Vec<Doctor>>,
    appointments: Mutex<Vec<Appointment>>,
    read_delay: Option<Duration>,
    unavailable: AtomicBool,
    appointment_reads: AtomicUsize,
}

impl InMemorySlotStore {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self {
            doctors: Mutex::new(doctors),
            ..Self::default()
        }
    }

    /// Roster of Dr. Ahmed Khan (General) and Dr. Sara Malik (Cosmetic),
    /// with Ahmed already booked at 10:00 AM on [`clinic_date`].
    pub fn clinic() -> Self {
        Self::new(vec![
            doctor("Dr. Ahmed Khan", "General Dentistry"),
            doctor("Dr. Sara Malik", "Cosmetic Dentistry"),
        ])
        .with_appointments(vec![appointment(
            "Dr. Ahmed Khan",
            clinic_date(),
            "10:00 AM",
            AppointmentStatus::Confirmed,
        )])
    }

    pub fn with_appointments(self, appointments: Vec<Appointment>) -> Self {
        *self.appointments.lock().unwrap() = appointments;
        self
    }

    /// Every appointment read sleeps this long before answering.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.appointments.lock().unwrap().clone()
    }

    pub fn appointment_reads(&self) -> usize {
        self.appointment_reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        self.check_available()?;
        Ok(self.doctors.lock().unwrap().clone())
    }

    async fn list_appointments(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        self.check_available()?;
        self.appointment_reads.fetch_add(1, Ordering::SeqCst);

        let snapshot: Vec<Appointment> = self.appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|appointment| appointment.date == date)
            .cloned()
            .collect();

        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(snapshot)
    }

    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        self.check_available()?;

        let mut stored = appointment.into_appointment();
        let mut appointments = self.appointments.lock().unwrap();
        stored.id = Some(json!(appointments.len() + 1));
        appointments.push(stored.clone());

        Ok(stored)
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_response(name: &str, specialty: &str) -> serde_json::Value {
        json!({
            "name": name,
            "specialty": specialty,
            "availableDays": "Monday - Friday",
            "availableHours": "9:00 AM - 5:00 PM"
        })
    }

    pub fn appointment_response(patient_name: &str, doctor: &str, date: &str, time: &str, status: &str) -> serde_json::Value {
        json!({
            "patientName": patient_name,
            "patientPhone": "not provided",
            "doctor": doctor,
            "date": date,
            "time": time,
            "status": status
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert_eq!(app_config.doctors_table, "doctors");
        assert!(app_config.webhook_secret.is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemorySlotStore::clinic();
        assert_eq!(store.list_doctors().await.unwrap().len(), 2);

        let other_day = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        assert!(store.list_appointments(other_day).await.unwrap().is_empty());

        store
            .create_appointment(NewAppointment::confirmed("Jane", None, "Dr. Sara Malik", clinic_date(), "11:00 AM"))
            .await
            .unwrap();
        assert_eq!(store.list_appointments(clinic_date()).await.unwrap().len(), 2);
        assert_eq!(store.appointment_reads(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_store_outage() {
        let store = InMemorySlotStore::clinic();
        store.set_unavailable(true);

        assert_matches!(store.list_doctors().await, Err(StoreError::Unavailable(_)));
    }
}
