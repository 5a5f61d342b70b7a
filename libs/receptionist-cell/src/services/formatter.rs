use chrono::NaiveDate;

use doctor_cell::DoctorAvailability;
use shared_config::DateStyle;
use shared_models::Appointment;

use crate::models::ToolError;

/// Slots read out per doctor. More than this is hard to follow by ear.
pub const MAX_SPOKEN_SLOTS: usize = 5;

/// Deterministic speech templates. Everything here is pure.
#[derive(Debug, Clone, Copy)]
pub struct ResponseFormatter {
    date_style: DateStyle,
}

impl ResponseFormatter {
    pub fn new(date_style: DateStyle) -> Self {
        Self { date_style }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        match self.date_style {
            DateStyle::Long => date.format("%A, %B %-d, %Y").to_string(),
            DateStyle::Brief => date.format("%A, %B %-d").to_string(),
        }
    }

    pub fn availability(&self, availability: &DoctorAvailability) -> String {
        let date = self.format_date(availability.date);

        if availability.is_fully_booked() {
            return format!(
                "I'm sorry, there are no available slots on {}. Would you like to try a different date?",
                date
            );
        }

        let doctors = availability
            .with_free_slots()
            .map(|doctor| {
                let slots = doctor
                    .free_slots
                    .iter()
                    .take(MAX_SPOKEN_SLOTS)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} at {}", doctor.doctor_name, slots)
            })
            .collect::<Vec<_>>()
            .join(". ");

        format!("On {} we have: {}. Which time works best for you?", date, doctors)
    }

    pub fn doctor_not_found(&self, requested: &str, roster: &[String]) -> String {
        format!(
            "I'm sorry, I couldn't find a doctor named {}. Our available doctors are: {}. Would you like to book with one of them?",
            requested,
            roster.join(", ")
        )
    }

    pub fn booking_confirmed(&self, appointment: &Appointment) -> String {
        format!(
            "Your appointment is confirmed! {}, you're booked with {} on {} at {}. We look forward to seeing you!",
            appointment.patient_name,
            appointment.doctor,
            self.format_date(appointment.date),
            appointment.time
        )
    }

    pub fn slot_taken(&self, doctor: &str, date: NaiveDate, time: &str) -> String {
        format!(
            "I'm sorry, the {} slot with {} on {} was just taken. Would you like to choose a different time?",
            time,
            doctor,
            self.format_date(date)
        )
    }

    pub fn error(&self, error: &ToolError) -> String {
        match error {
            ToolError::MissingArgument(field) => missing_argument_prompt(field).to_string(),
            ToolError::InvalidDate(_) => {
                "I'm sorry, I didn't catch that date. Could you tell me the date again, including the month and day?".to_string()
            }
            ToolError::InvalidTime(_) => {
                "I'm sorry, we book appointments on the hour from 9 AM to 5 PM. Which of those times would you like?".to_string()
            }
            ToolError::DoctorNotFound { requested, roster } => self.doctor_not_found(requested, roster),
            ToolError::SlotUnavailable { doctor, date, time } => self.slot_taken(doctor, *date, time),
            ToolError::StoreUnavailable => {
                "I'm sorry, I'm having a technical issue right now. Let me transfer you to our staff who can help you.".to_string()
            }
            ToolError::UnknownTool(_) => "I'm sorry, I could not process that request.".to_string(),
        }
    }
}

fn missing_argument_prompt(field: &str) -> &'static str {
    match field {
        "date" => "What date would you like to come in?",
        "patient_name" => "May I have your full name for the appointment?",
        "doctor" => "Which doctor would you like to see?",
        "time" => "What time would you like? We have appointments every hour from 9 AM to 5 PM.",
        _ => "I'm missing some details for that request. Could you tell me a bit more?",
    }
}
