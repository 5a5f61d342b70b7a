use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_models::error::AppError;

use crate::models::InboundEvent;
use crate::providers::{NormalizedAdapter, ProviderAdapter, RetellAdapter, VapiAdapter};
use crate::state::ReceptionistState;

#[axum::debug_handler]
pub async fn health_check(
    State(state): State<Arc<ReceptionistState>>,
) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store_configured": state.config.is_configured()
    }))
}

#[axum::debug_handler]
pub async fn vapi_webhook(
    State(state): State<Arc<ReceptionistState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    handle_webhook::<VapiAdapter>(&state, &body).await
}

#[axum::debug_handler]
pub async fn retell_webhook(
    State(state): State<Arc<ReceptionistState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    handle_webhook::<RetellAdapter>(&state, &body).await
}

#[axum::debug_handler]
pub async fn invoke_tool(
    State(state): State<Arc<ReceptionistState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    handle_webhook::<NormalizedAdapter>(&state, &body).await
}

/// Shared path for every provider: decode, normalize, dispatch, render.
/// Only a missing or unreadable envelope becomes an HTTP error.
async fn handle_webhook<P: ProviderAdapter>(
    state: &ReceptionistState,
    body: &[u8],
) -> Result<Json<Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("Empty request body".to_string()));
    }

    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    match P::parse(&payload)? {
        InboundEvent::ToolInvocation(invocation) => {
            debug!("{} webhook carried {} tool call(s)", P::NAME, invocation.calls.len());
            let results = state.dispatcher.dispatch_all(&invocation.calls).await;
            Ok(Json(P::render(invocation.reply_form, results)))
        }
        InboundEvent::CallLifecycle(event) => {
            info!("{} call event '{}' (call {})",
                  event.provider, event.kind, event.call_id.as_deref().unwrap_or("unknown"));
            Ok(Json(P::acknowledge()))
        }
    }
}
