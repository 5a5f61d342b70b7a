use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{InboundEvent, ReplyForm, ToolCall, ToolInvocation, ToolResult};
use crate::providers::{first_content, string_field, ProviderAdapter};

/// Provider-neutral `{ "toolName", "arguments" }` form, for internal tools
/// and smoke tests.
pub struct NormalizedAdapter;

impl ProviderAdapter for NormalizedAdapter {
    const NAME: &'static str = "normalized";

    fn parse(body: &Value) -> Result<InboundEvent, AppError> {
        let name = string_field(body, "toolName")
            .ok_or_else(|| AppError::BadRequest("Missing toolName".to_string()))?;
        let arguments = body.get("arguments").cloned().unwrap_or(Value::Null);

        Ok(InboundEvent::ToolInvocation(ToolInvocation {
            calls: vec![ToolCall::new(string_field(body, "id"), name, arguments)],
            reply_form: ReplyForm::Single,
        }))
    }

    fn render(_form: ReplyForm, results: Vec<ToolResult>) -> Value {
        json!({ "content": first_content(results) })
    }
}
