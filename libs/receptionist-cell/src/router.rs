use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_utils::extractor::webhook_secret_middleware;

use crate::handlers;
use crate::state::ReceptionistState;

pub fn receptionist_routes(state: Arc<ReceptionistState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check));

    // Provider callbacks; guarded by the shared secret when one is configured
    let webhook_routes = Router::new()
        .route("/webhooks/vapi", post(handlers::vapi_webhook))
        .route("/webhooks/retell", post(handlers::retell_webhook))
        .route("/tools/invoke", post(handlers::invoke_tool))
        .layer(middleware::from_fn_with_state(state.config.clone(), webhook_secret_middleware));

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .with_state(state)
}
