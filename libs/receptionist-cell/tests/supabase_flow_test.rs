use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use receptionist_cell::router::receptionist_routes;
use receptionist_cell::ReceptionistState;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

async fn supabase_app(mock_server: &MockServer) -> Router {
    let config = TestConfig {
        supabase_url: mock_server.uri(),
        ..TestConfig::default()
    };
    receptionist_routes(Arc::new(ReceptionistState::from_config(config.to_arc())))
}

async fn mount_clinic(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("order", "id.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response("Dr. Ahmed Khan", "General Dentistry"),
            MockSupabaseResponses::doctor_response("Dr. Sara Malik", "Cosmetic Dentistry"),
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("date", "eq.2026-03-02"))
        .and(query_param("order", "id.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response("Ali", "Dr. Ahmed Khan", "2026-03-02", "10:00 AM", "Confirmed"),
        ])))
        .mount(mock_server)
        .await;
}

async fn invoke(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/tools/invoke")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_availability_against_hosted_store() {
    let mock_server = MockServer::start().await;
    mount_clinic(&mock_server).await;

    let (status, body) = invoke(supabase_app(&mock_server).await, json!({
        "toolName": "check_availability",
        "arguments": {"date": "2026-03-02", "doctor": "ahmed"}
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["content"],
        json!("On Monday, March 2, 2026 we have: \
               Dr. Ahmed Khan at 09:00 AM, 11:00 AM, 12:00 PM, 01:00 PM, 02:00 PM. \
               Which time works best for you?")
    );
}

#[tokio::test]
async fn test_booking_inserts_into_hosted_store() {
    let mock_server = MockServer::start().await;
    mount_clinic(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "patientName": "Jane",
            "doctor": "Dr. Sara Malik",
            "time": "10:00 AM",
            "status": "Confirmed"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response("Jane", "Dr. Sara Malik", "2026-03-02", "10:00 AM", "Confirmed"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = invoke(supabase_app(&mock_server).await, json!({
        "toolName": "book_appointment",
        "arguments": {"patient_name": "Jane", "doctor": "Sara", "date": "2026-03-02", "time": "10 AM"}
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["content"],
        json!("Your appointment is confirmed! Jane, you're booked with Dr. Sara Malik on Monday, March 2, 2026 at 10:00 AM. \
               We look forward to seeing you!")
    );
}

#[tokio::test]
async fn test_store_error_body_is_not_spoken() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(MockSupabaseResponses::error_response("upstream timeout", "PGRST000")),
        )
        .mount(&mock_server)
        .await;

    let (status, body) = invoke(supabase_app(&mock_server).await, json!({
        "toolName": "check_availability",
        "arguments": {"date": "2026-03-02"}
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    let content = body["content"].as_str().unwrap();
    assert!(content.contains("technical issue"));
    assert!(!content.contains("PGRST000"));
}
