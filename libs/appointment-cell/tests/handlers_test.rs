// libs/appointment-cell/tests/handlers_test.rs

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::router::appointment_routes;
use doctor_cell::models::CreateAvailabilityRequest;
use doctor_cell::services::AvailabilityService;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
use shared_utils::AppState;

struct TestApp {
    config: TestConfig,
    state: Arc<AppState>,
}

impl TestApp {
    async fn with_availability(doctor_id: &str) -> Self {
        let config = TestConfig::default();
        let state = config.to_state();

        AvailabilityService::new(&state.repositories)
            .create_availability(doctor_id, CreateAvailabilityRequest {
                date: Some("2025-03-10".to_string()),
                start_time: Some("09:00".to_string()),
                end_time: Some("10:00".to_string()),
                slot_duration_minutes: Some(30),
            })
            .await
            .unwrap();

        Self { config, state }
    }

    fn token_for(&self, user: &TestUser) -> String {
        JwtTestUtils::create_test_token(user, &self.config.jwt_secret, Some(1))
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = appointment_routes(self.state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

fn booking(doctor_id: &str, time: &str) -> Value {
    json!({ "doctor_id": doctor_id, "date": "2025-03-10", "time": time })
}

#[tokio::test]
async fn test_patient_books_and_second_booking_conflicts() {
    let doctor = TestUser::doctor("doc@example.com");
    let app = TestApp::with_availability(&doctor.id).await;
    let first = TestUser::patient("first@example.com");
    let second = TestUser::patient("second@example.com");

    let (status, body) = app.send(Method::POST, "/", Some(&app.token_for(&first)), Some(booking(&doctor.id, "09:00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patient_id"], first.id);
    assert_eq!(body["status"], "Pending");

    let (status, body) = app.send(Method::POST, "/", Some(&app.token_for(&second)), Some(booking(&doctor.id, "09:00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
    assert_eq!(body["error"], "An appointment at this time already exists");
}

#[tokio::test]
async fn test_unavailable_time_is_bad_request() {
    let doctor = TestUser::doctor("doc@example.com");
    let app = TestApp::with_availability(&doctor.id).await;
    let patient = TestUser::patient("p@example.com");

    let (status, body) = app.send(Method::POST, "/", Some(&app.token_for(&patient)), Some(booking(&doctor.id, "11:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_booking_requires_token() {
    let doctor = TestUser::doctor("doc@example.com");
    let app = TestApp::with_availability(&doctor.id).await;

    let (status, _) = app.send(Method::POST, "/", None, Some(booking(&doctor.id, "09:00"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = JwtTestUtils::create_invalid_signature_token(&TestUser::patient("p@example.com"));
    let (status, _) = app.send(Method::POST, "/", Some(&forged), Some(booking(&doctor.id, "09:00"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_read_and_cancel_are_limited_to_participants() {
    let doctor = TestUser::doctor("doc@example.com");
    let app = TestApp::with_availability(&doctor.id).await;
    let patient = TestUser::patient("p@example.com");
    let stranger = TestUser::patient("s@example.com");

    let (_, created) = app.send(Method::POST, "/", Some(&app.token_for(&patient)), Some(booking(&doctor.id, "09:30"))).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = app.send(Method::GET, &format!("/{}", id), Some(&app.token_for(&doctor)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["time"], "09:30");

    let (status, _) = app.send(Method::GET, &format!("/{}", id), Some(&app.token_for(&stranger)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::POST, &format!("/{}/cancel", id), Some(&app.token_for(&stranger)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::POST, &format!("/{}/cancel", id), Some(&app.token_for(&patient)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Cancelled");

    let (status, body) = app.send(Method::POST, &format!("/{}/cancel", id), Some(&app.token_for(&patient)), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_unknown_appointment_is_not_found() {
    let doctor = TestUser::doctor("doc@example.com");
    let app = TestApp::with_availability(&doctor.id).await;

    let (status, body) = app.send(
        Method::GET,
        &format!("/{}", uuid::Uuid::new_v4()),
        Some(&app.token_for(&doctor)),
        None,
    ).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_malformed_appointment_id_is_validation_error() {
    let doctor = TestUser::doctor("doc@example.com");
    let app = TestApp::with_availability(&doctor.id).await;
    let token = app.token_for(&doctor);

    let (status, body) = app.send(Method::GET, "/12345", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, body) = app.send(Method::POST, "/12345/cancel", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}
