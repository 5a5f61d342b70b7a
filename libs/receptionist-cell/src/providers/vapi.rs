use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{CallLifecycleEvent, InboundEvent, ReplyForm, ToolCall, ToolInvocation, ToolResult};
use crate::providers::{first_content, string_field, ProviderAdapter};

/// Server messages wrapped in `{ "message": { "type": ... } }`.
pub struct VapiAdapter;

impl ProviderAdapter for VapiAdapter {
    const NAME: &'static str = "vapi";

    fn parse(body: &Value) -> Result<InboundEvent, AppError> {
        let message = body
            .get("message")
            .filter(|message| message.is_object())
            .ok_or_else(|| AppError::BadRequest("Missing message envelope".to_string()))?;

        let kind = string_field(message, "type").unwrap_or_default();

        match kind.as_str() {
            "tool-calls" => {
                let entries = message
                    .get("toolCallList")
                    .or_else(|| message.get("toolCalls"))
                    .and_then(Value::as_array)
                    .ok_or_else(|| AppError::BadRequest("Missing toolCallList".to_string()))?;

                let calls = entries.iter().map(parse_tool_call).collect();

                Ok(InboundEvent::ToolInvocation(ToolInvocation {
                    calls,
                    reply_form: ReplyForm::Batch,
                }))
            }
            "function-call" => {
                let function = message
                    .get("functionCall")
                    .ok_or_else(|| AppError::BadRequest("Missing functionCall".to_string()))?;
                let name = string_field(function, "name")
                    .ok_or_else(|| AppError::BadRequest("Missing function name".to_string()))?;
                let arguments = function.get("parameters").cloned().unwrap_or(Value::Null);

                Ok(InboundEvent::ToolInvocation(ToolInvocation {
                    calls: vec![ToolCall::new(None, name, arguments)],
                    reply_form: ReplyForm::Single,
                }))
            }
            _ => Ok(InboundEvent::CallLifecycle(CallLifecycleEvent {
                provider: Self::NAME.to_string(),
                kind: if kind.is_empty() { "unknown".to_string() } else { kind.clone() },
                call_id: message.get("call").and_then(|call| string_field(call, "id")),
            })),
        }
    }

    fn render(form: ReplyForm, results: Vec<ToolResult>) -> Value {
        match form {
            ReplyForm::Batch => json!({
                "results": results
                    .into_iter()
                    .map(|result| json!({
                        "toolCallId": result.id,
                        "name": result.name,
                        "result": result.content,
                    }))
                    .collect::<Vec<_>>()
            }),
            ReplyForm::Single => json!({ "result": first_content(results) }),
        }
    }
}

/// Every entry yields a call so its id is echoed back. A nameless entry
/// dispatches as an unknown tool.
fn parse_tool_call(entry: &Value) -> ToolCall {
    let function = entry.get("function");
    let name = function
        .and_then(|function| string_field(function, "name"))
        .unwrap_or_default();
    let arguments = function
        .and_then(|function| function.get("arguments"))
        .cloned()
        .unwrap_or(Value::Null);

    ToolCall::new(string_field(entry, "id"), name, arguments)
}
