use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ==============================================================================
// NORMALIZED INBOUND EVENTS
// ==============================================================================

/// What every provider adapter turns a webhook body into.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    ToolInvocation(ToolInvocation),
    CallLifecycle(CallLifecycleEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub calls: Vec<ToolCall>,
    pub reply_form: ReplyForm,
}

/// Whether the provider expects one answer or a list keyed by call id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyForm {
    Single,
    Batch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id from the provider, echoed back unchanged.
    pub id: Option<String>,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(id: Option<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id,
            name: name.into(),
            arguments: arguments_map(arguments),
        }
    }
}

/// Tool arguments arrive either as an object or as a JSON-encoded string.
/// Anything else yields no arguments, which later surfaces as a prompt for
/// the missing field.
pub fn arguments_map(arguments: Value) -> Map<String, Value> {
    match arguments {
        Value::Object(map) => map,
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub id: Option<String>,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLifecycleEvent {
    pub provider: String,
    pub kind: String,
    pub call_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolName {
    CheckAvailability,
    BookAppointment,
    Unknown(String),
}

impl From<&str> for ToolName {
    fn from(name: &str) -> Self {
        match name.trim() {
            "check_availability" => ToolName::CheckAvailability,
            "book_appointment" => ToolName::BookAppointment,
            other => ToolName::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolName::CheckAvailability => write!(f, "check_availability"),
            ToolName::BookAppointment => write!(f, "book_appointment"),
            ToolName::Unknown(name) => write!(f, "{}", name),
        }
    }
}

// ==============================================================================
// TOOL ERRORS
// ==============================================================================

/// Every way a tool call can fall short of its happy path. None of these
/// reach the provider as a transport failure; each is spoken to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Unparseable date: {0}")]
    InvalidDate(String),

    #[error("Time is not a bookable slot: {0}")]
    InvalidTime(String),

    #[error("No doctor matching {requested}")]
    DoctorNotFound { requested: String, roster: Vec<String> },

    #[error("Slot {time} with {doctor} on {date} is taken")]
    SlotUnavailable { doctor: String, date: NaiveDate, time: String },

    #[error("Slot store unavailable")]
    StoreUnavailable,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Fixed operational messages that are never handed to the generative
    /// phrasing path.
    pub fn is_operational(&self) -> bool {
        matches!(self, ToolError::StoreUnavailable | ToolError::UnknownTool(_))
    }
}
