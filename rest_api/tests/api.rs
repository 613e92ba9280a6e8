use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use models::{credentials, NewAppointment};
use notifications_service::Mailer;
use rest_api::{router, AppState};
use storage::{ClinicStore, MemoryStore};

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        mailer: Arc::new(Mailer::disabled()),
    };
    (router(state), store)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_response(response).await
}

async fn send_get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    read_response(response).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn patient_payload(email: &str, cni: &str) -> Value {
    json!({
        "fullName": "Amina Berrada",
        "cni": cni,
        "email": email,
        "phoneNumber": "0612345678",
        "healthProblem": 3,
        "doctorName": "Dr. Alaoui",
        "city": "Rabat",
        "age": 34,
        "gender": "Female",
        "password": "Str0ng!pass",
    })
}

fn booking(patient_id: i32, doctor_id: i32, date: &str) -> NewAppointment {
    NewAppointment {
        patient_id,
        doctor_id,
        appointment_date: date.parse().unwrap(),
    }
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (app, _) = test_app();
    let (status, body) = send_get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn patient_registration_round_trip() {
    let (app, _) = test_app();

    let (status, body) =
        send_json(&app, "POST", "/patient", patient_payload("amina@example.com", "AB123456")).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send_get(&app, &format!("/patient/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullName"], "Amina Berrada");
    assert_eq!(body["data"]["email"], "amina@example.com");
    // The stored hash must never leave the server.
    assert!(body["data"].get("password").is_none());

    let (status, body) = send_get(&app, "/patients").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn submit_alias_also_registers() {
    let (app, _) = test_app();
    let (status, _) =
        send_json(&app, "POST", "/submit", patient_payload("amina@example.com", "AB123456")).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn blank_fields_reject_registration_without_persisting() {
    let (app, _) = test_app();

    let mut payload = patient_payload("amina@example.com", "AB123456");
    payload["city"] = json!("   ");
    let (status, body) = send_json(&app, "POST", "/patient", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (_, body) = send_get(&app, "/patients").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (app, _) = test_app();
    let (status, _) =
        send_json(&app, "POST", "/patient", patient_payload("amina@example.com", "AB123456")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        send_json(&app, "POST", "/patient", patient_payload("amina@example.com", "CD654321")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn patient_login_checks_credentials() {
    let (app, _) = test_app();
    send_json(&app, "POST", "/patient", patient_payload("amina@example.com", "AB123456")).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/login",
        json!({"email": "amina@example.com", "password": "Str0ng!pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["userId"].as_i64().is_some());

    let (status, body) = send_json(
        &app,
        "POST",
        "/login",
        json!({"email": "amina@example.com", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send_json(
        &app,
        "POST",
        "/login",
        json!({"email": "nobody@example.com", "password": "Str0ng!pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
        send_json(&app, "POST", "/login", json!({"email": "amina@example.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn missing_patient_returns_not_found() {
    let (app, _) = test_app();
    let (status, body) = send_get(&app, "/patient/404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn doctor_crud_round_trip() {
    let (app, _) = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/doctor",
        json!({"name": "Dr. Alaoui", "specialization": "Cardiology", "contactInfo": "dr.alaoui@clinic.ma"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send_get(&app, "/doctor").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/doctor/{id}"),
        json!({"name": "Dr. Alaoui", "specialization": "Neurology", "contactInfo": "dr.alaoui@clinic.ma"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["specialization"], "Neurology");

    let (status, _) = send_json(
        &app,
        "PUT",
        "/doctor/9999",
        json!({"name": "x", "specialization": "y", "contactInfo": "z"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app,
        "POST",
        "/doctor",
        json!({"name": "Dr. Incomplete", "specialization": "Cardiology"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/doctor/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Second delete of the same id must 404 and change nothing.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/doctor/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assistant_crud_round_trip() {
    let (app, _) = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/assistant",
        json!({"name": "Salma", "password": "reception1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/assistant/{id}"),
        json!({"name": "Salma B.", "password": "reception2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Salma B.");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/assistant/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disease_listing_joins_doctor_names() {
    let (app, _) = test_app();

    let (_, body) = send_json(
        &app,
        "POST",
        "/doctor",
        json!({"name": "Dr. Alaoui", "specialization": "Pulmonology", "contactInfo": "dr.alaoui@clinic.ma"}),
    )
    .await;
    let doctor_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send_json(
        &app,
        "POST",
        "/disease",
        json!({"name": "Asthma", "doctorId": doctor_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_get(&app, "/diseases").await;
    assert_eq!(status, StatusCode::OK);
    let diseases = body["data"].as_array().unwrap();
    assert_eq!(diseases.len(), 1);
    assert_eq!(diseases[0]["name"], "Asthma");
    assert_eq!(diseases[0]["doctorName"], "Dr. Alaoui");

    let (status, _) = send_json(&app, "PUT", "/disease/9999", json!({"name": "Asthma", "doctorId": doctor_id})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/disease/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_happy_path_and_validation() {
    let (app, _) = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/appointments",
        json!({"patientId": 1, "doctorId": 2, "appointmentDate": "2024-06-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "Pending");
    assert_eq!(body["data"]["appointmentDate"], "2024-06-01");

    let (status, body) = send_json(
        &app,
        "POST",
        "/appointments",
        json!({"patientId": 1, "doctorId": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (status, body) = send_json(
        &app,
        "POST",
        "/appointments",
        json!({"patientId": 1, "doctorId": 2, "appointmentDate": "not-a-date"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn patient_cannot_book_two_doctors_on_one_date() {
    let (app, _) = test_app();

    let (status, _) = send_json(
        &app,
        "POST",
        "/appointments",
        json!({"patientId": 7, "doctorId": 1, "appointmentDate": "2024-06-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &app,
        "POST",
        "/appointments",
        json!({"patientId": 7, "doctorId": 2, "appointmentDate": "2024-06-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_BOOKING");
}

#[tokio::test]
async fn tenth_slot_books_and_eleventh_is_rejected() {
    let (app, store) = test_app();

    // Doctor 5 already holds nine appointments on the date.
    for patient_id in 1..=9 {
        store
            .book_appointment(booking(patient_id, 5, "2024-06-01"))
            .await
            .unwrap();
    }

    let (status, _) = send_json(
        &app,
        "POST",
        "/appointments",
        json!({"patientId": 100, "doctorId": 5, "appointmentDate": "2024-06-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &app,
        "POST",
        "/appointments",
        json!({"patientId": 101, "doctorId": 5, "appointmentDate": "2024-06-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "SLOTS_EXHAUSTED");

    // The rejection must not have grown the day's count.
    let counts = store
        .appointment_counts(5, "2024-06-01".parse().unwrap(), "2024-06-01".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(counts.get(&"2024-06-01".parse().unwrap()), Some(&10));
}

#[tokio::test]
async fn appointment_counts_are_sparse_over_the_range() {
    let (app, store) = test_app();

    store.book_appointment(booking(1, 7, "2024-06-01")).await.unwrap();
    store.book_appointment(booking(2, 7, "2024-06-01")).await.unwrap();
    store.book_appointment(booking(3, 7, "2024-06-03")).await.unwrap();
    store.book_appointment(booking(4, 7, "2024-06-20")).await.unwrap();

    let (status, body) = send_get(
        &app,
        "/appointments/count?doctorId=7&startDate=2024-06-01&endDate=2024-06-07",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let counts = body["data"].as_object().unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["2024-06-01"], 2);
    assert_eq!(counts["2024-06-03"], 1);

    let (status, body) = send_get(&app, "/appointments/count?doctorId=7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn admin_login_requires_a_matching_password() {
    let (app, store) = test_app();
    let hashed = credentials::hash_password("Adm1n!pass").unwrap();
    store.upsert_admin("admin", &hashed).await.unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        "/admin",
        json!({"username": "admin", "password": "Adm1n!pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["userId"].as_i64().is_some());

    let (status, _) = send_json(
        &app,
        "POST",
        "/admin",
        json!({"username": "admin", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &app,
        "POST",
        "/admin",
        json!({"username": "ghost", "password": "Adm1n!pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&app, "POST", "/admin", json!({"username": "admin"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
