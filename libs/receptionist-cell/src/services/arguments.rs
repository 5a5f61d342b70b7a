use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

use shared_models::SLOT_LABELS;

use crate::models::ToolError;

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%A, %B %d, %Y",
];

fn ordinal_suffix() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").ok()).as_ref()
}

fn twelve_hour() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\.?$").ok())
        .as_ref()
}

fn twenty_four_hour() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})(?::(\d{2}))?$").ok()).as_ref()
}

/// First non-blank string under any of `keys`. Numbers are accepted and
/// rendered as text (phone numbers often arrive that way).
pub fn optional_arg(args: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| args.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

pub fn required_arg(args: &Map<String, Value>, keys: &[&str], field: &'static str) -> Result<String, ToolError> {
    optional_arg(args, keys).ok_or(ToolError::MissingArgument(field))
}

/// ISO dates plus the few spoken forms callers' assistants tend to send.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ToolError> {
    let trimmed = raw.trim();
    let cleaned = match ordinal_suffix() {
        Some(re) => re.replace_all(trimmed, "$1"),
        None => trimmed.into(),
    };

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .ok_or_else(|| ToolError::InvalidDate(raw.to_string()))
}

/// Map a spoken or typed time onto one of the clinic slot labels.
pub fn normalize_time(raw: &str) -> Result<String, ToolError> {
    let trimmed = raw.trim();
    let invalid = || ToolError::InvalidTime(raw.to_string());

    if SLOT_LABELS.contains(&trimmed) {
        return Ok(trimmed.to_string());
    }

    let hour24 = if let Some(caps) = twelve_hour().and_then(|re| re.captures(trimmed)) {
        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        check_on_the_hour(caps.get(2).map(|m| m.as_str())).ok_or_else(invalid)?;
        if !(1..=12).contains(&hour) {
            return Err(invalid());
        }
        let pm = caps[3].eq_ignore_ascii_case("p");
        hour % 12 + if pm { 12 } else { 0 }
    } else if let Some(caps) = twenty_four_hour().and_then(|re| re.captures(trimmed)) {
        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        check_on_the_hour(caps.get(2).map(|m| m.as_str())).ok_or_else(invalid)?;
        match (hour, caps.get(2)) {
            // A bare "3" on the phone means the afternoon.
            (1..=5, None) => hour + 12,
            _ => hour,
        }
    } else {
        return Err(invalid());
    };

    let label = slot_label(hour24);
    if SLOT_LABELS.contains(&label.as_str()) {
        Ok(label)
    } else {
        Err(invalid())
    }
}

fn check_on_the_hour(minutes: Option<&str>) -> Option<()> {
    match minutes {
        None | Some("00") => Some(()),
        _ => None,
    }
}

fn slot_label(hour24: u32) -> String {
    let suffix = if hour24 >= 12 { "PM" } else { "AM" };
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{:02}:00 {}", hour12, suffix)
}
