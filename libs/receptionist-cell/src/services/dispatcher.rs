use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use appointment_cell::{BookAppointmentRequest, BookingError, BookingOutcome, BookingService, SlotLocks};
use doctor_cell::{AvailabilityOutcome, AvailabilityService, DoctorError};
use shared_config::AppConfig;
use shared_database::SlotStore;

use crate::models::{ToolCall, ToolError, ToolName, ToolResult};
use crate::services::arguments::{normalize_time, optional_arg, parse_date, required_arg};
use crate::services::formatter::ResponseFormatter;
use crate::services::phrasing::GenerativePhraser;

/// Routes tool calls to the scheduling services and turns every result,
/// good or bad, into something the caller can hear.
pub struct ToolDispatcher {
    availability: AvailabilityService,
    booking: BookingService,
    formatter: ResponseFormatter,
    phraser: Option<GenerativePhraser>,
}

impl ToolDispatcher {
    pub fn new(config: &AppConfig, store: Arc<dyn SlotStore>) -> Self {
        let mut booking = BookingService::new(store.clone());
        if config.booking_slot_lock {
            booking = booking.with_slot_locks(Arc::new(SlotLocks::new()));
        }

        Self {
            availability: AvailabilityService::new(store),
            booking,
            formatter: ResponseFormatter::new(config.date_style),
            phraser: GenerativePhraser::from_config(config),
        }
    }

    /// Calls run concurrently; results keep the order of `calls`.
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.dispatch(call))).await
    }

    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let tool = ToolName::from(call.name.as_str());
        debug!("Dispatching tool call {:?} ({})", call.id, tool);

        let content = match self.execute(&tool, &call.arguments).await {
            Ok(text) => self.phrase(text).await,
            Err(e) => {
                match &e {
                    ToolError::StoreUnavailable => error!("Tool {} failed: slot store unavailable", tool),
                    ToolError::UnknownTool(name) => warn!("Unknown tool invoked: {}", name),
                    other => info!("Tool {} ended without success: {}", tool, other),
                }

                let text = self.formatter.error(&e);
                if e.is_operational() {
                    text
                } else {
                    self.phrase(text).await
                }
            }
        };

        ToolResult {
            id: call.id.clone(),
            name: call.name.clone(),
            content,
        }
    }

    async fn execute(&self, tool: &ToolName, args: &Map<String, Value>) -> Result<String, ToolError> {
        match tool {
            ToolName::CheckAvailability => self.check_availability(args).await,
            ToolName::BookAppointment => self.book_appointment(args).await,
            ToolName::Unknown(name) => Err(ToolError::UnknownTool(name.clone())),
        }
    }

    async fn check_availability(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
        let date = parse_date(&required_arg(args, &["date"], "date")?)?;
        let doctor = optional_arg(args, &["doctor", "doctor_name"]);

        let outcome = self.availability
            .check_availability(date, doctor.as_deref())
            .await
            .map_err(store_failure_from_doctor)?;

        match outcome {
            AvailabilityOutcome::Resolved(availability) => Ok(self.formatter.availability(&availability)),
            AvailabilityOutcome::DoctorNotFound { requested, roster } => {
                Err(ToolError::DoctorNotFound { requested, roster })
            }
        }
    }

    async fn book_appointment(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
        let patient_name = required_arg(args, &["patient_name", "patientName", "name"], "patient_name")?;
        let doctor = required_arg(args, &["doctor", "doctor_name"], "doctor")?;
        let date = parse_date(&required_arg(args, &["date"], "date")?)?;
        let time = normalize_time(&required_arg(args, &["time"], "time")?)?;
        let patient_phone = optional_arg(args, &["patient_phone", "patientPhone", "phone"]);

        let request = BookAppointmentRequest {
            patient_name,
            patient_phone,
            doctor,
            date,
            time,
        };

        let outcome = self.booking
            .book_appointment(request)
            .await
            .map_err(store_failure_from_booking)?;

        match outcome {
            BookingOutcome::Confirmed(appointment) => Ok(self.formatter.booking_confirmed(&appointment)),
            BookingOutcome::SlotTaken { doctor, date, time } => {
                Err(ToolError::SlotUnavailable { doctor, date, time })
            }
            BookingOutcome::DoctorNotFound { requested, roster } => {
                Err(ToolError::DoctorNotFound { requested, roster })
            }
        }
    }

    async fn phrase(&self, text: String) -> String {
        match &self.phraser {
            Some(phraser) => phraser.phrase(&text).await,
            None => text,
        }
    }
}

fn store_failure_from_doctor(e: DoctorError) -> ToolError {
    error!("Availability lookup failed: {}", e);
    ToolError::StoreUnavailable
}

fn store_failure_from_booking(e: BookingError) -> ToolError {
    error!("Booking failed: {}", e);
    ToolError::StoreUnavailable
}
