//! Per-provider translation between webhook wire shapes and
//! [`InboundEvent`](crate::models::InboundEvent). Scheduling logic never
//! sees a provider-specific type.

pub mod normalized;
pub mod retell;
pub mod vapi;

use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{InboundEvent, ReplyForm, ToolResult};

pub use normalized::NormalizedAdapter;
pub use retell::RetellAdapter;
pub use vapi::VapiAdapter;

pub trait ProviderAdapter {
    const NAME: &'static str;

    /// Fails only when the body has no recognizable dispatch envelope.
    fn parse(body: &Value) -> Result<InboundEvent, AppError>;

    fn render(form: ReplyForm, results: Vec<ToolResult>) -> Value;

    fn acknowledge() -> Value {
        json!({ "received": true })
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn first_content(results: Vec<ToolResult>) -> String {
    results.into_iter().next().map(|result| result.content).unwrap_or_default()
}
