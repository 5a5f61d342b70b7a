use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header::{HeaderMap, HeaderValue}, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_models::{Appointment, Doctor, NewAppointment};

use crate::supabase::SupabaseClient;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Slot store unavailable: {0}")]
    Unavailable(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Doctor roster and appointment book. Reads always return the complete
/// result set; there is no caching and no retry.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError>;

    /// Appointments on exactly `date`.
    async fn list_appointments(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError>;

    /// Unconditional insert. The store enforces no uniqueness.
    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment, StoreError>;
}

pub struct SupabaseSlotStore {
    supabase: SupabaseClient,
    doctors_table: String,
    appointments_table: String,
    page_size: usize,
    order: String,
}

impl SupabaseSlotStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors_table: config.doctors_table.clone(),
            appointments_table: config.appointments_table.clone(),
            page_size: config.store_page_size,
            order: format!("{}.asc", config.store_order_column),
        }
    }
}

#[async_trait]
impl SlotStore for SupabaseSlotStore {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let doctors: Vec<Doctor> = self.supabase
            .fetch_all(&self.doctors_table, &[], &self.order, self.page_size)
            .await
            .map_err(|e| {
                error!("Failed to list doctors: {}", e);
                StoreError::from(e)
            })?;

        debug!("Loaded roster of {} doctors", doctors.len());
        Ok(doctors)
    }

    async fn list_appointments(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        let filters = [("date", format!("eq.{}", date.format("%Y-%m-%d")))];

        let mut appointments: Vec<Appointment> = self.supabase
            .fetch_all(&self.appointments_table, &filters, &self.order, self.page_size)
            .await
            .map_err(|e| {
                error!("Failed to list appointments for {}: {}", date, e);
                StoreError::from(e)
            })?;

        appointments.retain(|appointment| appointment.date == date);
        debug!("Loaded {} appointments for {}", appointments.len(), date);
        Ok(appointments)
    }

    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let body = serde_json::to_value(&appointment)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/{}", self.appointments_table);
        let result: Vec<Value> = self.supabase
            .request_with_headers(Method::POST, &path, None, Some(body), Some(headers))
            .await
            .map_err(|e| {
                error!("Failed to create appointment: {}", e);
                StoreError::from(e)
            })?;

        let created = match result.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map_err(|e| StoreError::Unavailable(format!("unexpected appointment echo: {}", e)))?,
            None => appointment.into_appointment(),
        };

        info!("Appointment stored for {} with {} on {} at {}",
              created.patient_name, created.doctor, created.date, created.time);
        Ok(created)
    }
}
