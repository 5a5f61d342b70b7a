use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The bookable hours of a clinic day, in order. Fixed business rule; doctor
/// hours on the roster are advisory and never narrow this set.
pub const SLOT_LABELS: [&str; 9] = [
    "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "01:00 PM",
    "02:00 PM", "03:00 PM", "04:00 PM", "05:00 PM",
];

pub const PHONE_NOT_PROVIDED: &str = "not provided";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_days: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_hours: Option<String>,
}

impl Doctor {
    /// Case-insensitive substring match used for every doctor lookup.
    pub fn name_matches(&self, query: &str) -> bool {
        name_contains(&self.name, query)
    }
}

/// `haystack` contains `needle`, ignoring case.
pub fn name_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(alias = "confirmed")]
    Confirmed,
    #[serde(alias = "cancelled", alias = "Canceled", alias = "canceled")]
    Cancelled,
    /// Anything the store holds that this service never writes.
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    pub fn is_active(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Confirmed => write!(f, "Confirmed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
            AppointmentStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub patient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_phone: Option<String>,
    pub doctor: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
}

/// Insert payload. Status is always `Confirmed`; nothing in this service
/// cancels or updates a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_name: String,
    pub patient_phone: String,
    pub doctor: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
}

impl NewAppointment {
    pub fn confirmed(
        patient_name: impl Into<String>,
        patient_phone: Option<String>,
        doctor: impl Into<String>,
        date: NaiveDate,
        time: impl Into<String>,
    ) -> Self {
        Self {
            patient_name: patient_name.into(),
            patient_phone: patient_phone
                .filter(|phone| !phone.trim().is_empty())
                .unwrap_or_else(|| PHONE_NOT_PROVIDED.to_string()),
            doctor: doctor.into(),
            date,
            time: time.into(),
            status: AppointmentStatus::Confirmed,
        }
    }

    pub fn into_appointment(self) -> Appointment {
        Appointment {
            id: None,
            patient_name: self.patient_name,
            patient_phone: Some(self.patient_phone),
            doctor: self.doctor,
            date: self.date,
            time: self.time,
            status: self.status,
        }
    }
}
