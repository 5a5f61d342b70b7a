use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use receptionist_cell::router::receptionist_routes;
use receptionist_cell::ReceptionistState;

pub fn create_router(state: Arc<ReceptionistState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic receptionist webhook API is running!" }))
        .merge(receptionist_routes(state))
}
