use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{CallLifecycleEvent, InboundEvent, ReplyForm, ToolCall, ToolInvocation, ToolResult};
use crate::providers::{first_content, string_field, ProviderAdapter};

/// Custom-function calls (`name` + `args`) and call events (`event`).
pub struct RetellAdapter;

impl ProviderAdapter for RetellAdapter {
    const NAME: &'static str = "retell";

    fn parse(body: &Value) -> Result<InboundEvent, AppError> {
        let call_id = body.get("call").and_then(|call| string_field(call, "call_id"));

        if let Some(name) = string_field(body, "name") {
            let arguments = body
                .get("args")
                .or_else(|| body.get("arguments"))
                .cloned()
                .unwrap_or(Value::Null);

            return Ok(InboundEvent::ToolInvocation(ToolInvocation {
                calls: vec![ToolCall::new(call_id, name, arguments)],
                reply_form: ReplyForm::Single,
            }));
        }

        if let Some(kind) = string_field(body, "event") {
            return Ok(InboundEvent::CallLifecycle(CallLifecycleEvent {
                provider: Self::NAME.to_string(),
                kind,
                call_id,
            }));
        }

        Err(AppError::BadRequest("Expected a function name or call event".to_string()))
    }

    fn render(_form: ReplyForm, results: Vec<ToolResult>) -> Value {
        json!({ "content": first_content(results) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn function_call_is_single_invocation() {
        let body = json!({
            "name": "book_appointment",
            "call": {"call_id": "call_77"},
            "args": {"patient_name": "Jane", "doctor": "Sara", "date": "2026-03-02", "time": "10:00 AM"}
        });

        let invocation = assert_matches!(RetellAdapter::parse(&body), Ok(InboundEvent::ToolInvocation(i)) => i);
        assert_eq!(invocation.reply_form, ReplyForm::Single);
        assert_eq!(invocation.calls[0].id.as_deref(), Some("call_77"));
        assert_eq!(invocation.calls[0].arguments.len(), 4);
    }

    #[test]
    fn call_events_are_lifecycle() {
        let body = json!({"event": "call_started", "call": {"call_id": "call_77"}});

        assert_matches!(
            RetellAdapter::parse(&body),
            Ok(InboundEvent::CallLifecycle(event)) if event.kind == "call_started"
        );
    }

    #[test]
    fn body_without_name_or_event_is_rejected() {
        assert_matches!(RetellAdapter::parse(&json!({"args": {}})), Err(AppError::BadRequest(_)));
    }
}
