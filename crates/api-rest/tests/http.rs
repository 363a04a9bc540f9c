//! End-to-end tests driving the router directly, bypassing any client-side
//! convenience checks: the server interface is the authority on conflicts and
//! scheduling rules.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use api_rest::{router, AppState};
use clinic_core::model::{AssistantProfile, Patient, PractitionerProfile, User};
use clinic_core::store::MemoryStore;
use clinic_core::{AppointmentService, CoreConfig};
use clinic_session::{CredentialVerifier, SessionService, TokenSigner};
use clinic_types::{
    AssistantProfileId, DoctorProfileId, PatientId, Role, UserId, Username,
};

/// Plaintext comparison so tests do not pay PBKDF2 cost.
struct PlainVerifier;

impl CredentialVerifier for PlainVerifier {
    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        plaintext == stored_hash
    }
}

struct TestClinic {
    app: Router,
    doctor_a: DoctorProfileId,
    doctor_b: DoctorProfileId,
    patient: PatientId,
}

fn seed_user(store: &MemoryStore, username: &str, role: Role) -> UserId {
    let user = User {
        id: UserId::new(),
        username: Username::new(username).unwrap(),
        credential_hash: "pw".into(),
        role,
        revocation_counter: 0,
        deleted: false,
    };
    let id = user.id;
    store.seed_user(user);
    id
}

fn clinic() -> TestClinic {
    let store = Arc::new(MemoryStore::new());

    seed_user(&store, "frontdesk", Role::Receptionist);
    seed_user(&store, "pharma", Role::Pharmacist);
    let doctor_user = seed_user(&store, "dr.ade", Role::Doctor);
    let assistant_user = seed_user(&store, "asst.bola", Role::Assistant);

    let doctor_a = DoctorProfileId::new();
    store.seed_doctor_profile(PractitionerProfile {
        id: doctor_a,
        owner_user_id: doctor_user,
        name: "Dr. Ade".into(),
        specialization: "General".into(),
        contact: "ext. 12".into(),
        deleted: false,
    });
    let doctor_b = DoctorProfileId::new();
    store.seed_doctor_profile(PractitionerProfile {
        id: doctor_b,
        owner_user_id: UserId::new(),
        name: "Dr. Brook".into(),
        specialization: "Paediatrics".into(),
        contact: "ext. 13".into(),
        deleted: false,
    });
    store.seed_assistant_profile(AssistantProfile {
        id: AssistantProfileId::new(),
        owner_user_id: assistant_user,
        affiliated_doctor_id: doctor_b,
        deleted: false,
    });

    let patient = PatientId::new();
    store.seed_patient(Patient {
        id: patient,
        name: "Amara Osei".into(),
        date_of_birth: NaiveDate::from_ymd_opt(1988, 4, 12).unwrap(),
        contact_phone: None,
        address: None,
        deleted: false,
    });

    let sessions = Arc::new(SessionService::new(
        store.clone(),
        TokenSigner::new(b"integration-test-secret".to_vec()),
        Arc::new(PlainVerifier),
        Duration::hours(8),
    ));
    let appointments = Arc::new(AppointmentService::new(store, CoreConfig::default()));

    TestClinic {
        app: router(AppState {
            sessions,
            appointments,
        }),
        doctor_a,
        doctor_b,
        patient,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("request handled");
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

fn post_json(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(path).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_with(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/login",
            None,
            json!({"username": username, "credential": "pw"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("token in response").to_owned()
}

fn in_hours(h: i64) -> String {
    (Utc::now() + Duration::hours(h)).to_rfc3339()
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let clinic = clinic();
    let (status, body) = send(
        &clinic.app,
        post_json(
            "/auth/login",
            None,
            json!({"username": "frontdesk", "credential": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "invalid_credentials");
}

#[tokio::test]
async fn test_endpoints_require_bearer_token() {
    let clinic = clinic();
    let (status, _) = send(&clinic.app, get_with("/appointments", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &clinic.app,
        get_with("/appointments", Some("not-a-real-token")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_booking_conflict_and_clear_slot() {
    let clinic = clinic();
    let token = login(&clinic.app, "frontdesk").await;

    let base = Utc::now() + Duration::hours(24);
    let booking = |offset_minutes: i64| {
        json!({
            "patient_id": clinic.patient,
            "doctor_id": clinic.doctor_a,
            "scheduled_at": (base + Duration::minutes(offset_minutes)).to_rfc3339(),
        })
    };

    let (status, body) = send(
        &clinic.app,
        post_json("/appointments", Some(&token), booking(0)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "first booking: {body}");
    assert_eq!(body["effective_status"], "scheduled");

    // 8 minutes later: inside the 10-minute window.
    let (status, body) = send(
        &clinic.app,
        post_json("/appointments", Some(&token), booking(8)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "doctor_conflict");
    assert!(body["conflicting_time"].is_string());

    // 11 minutes later: clear.
    let (status, _) = send(
        &clinic.app,
        post_json("/appointments", Some(&token), booking(11)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_past_booking_rejected_but_past_reschedule_allowed() {
    let clinic = clinic();
    let token = login(&clinic.app, "frontdesk").await;

    let (status, body) = send(
        &clinic.app,
        post_json(
            "/appointments",
            Some(&token),
            json!({
                "patient_id": clinic.patient,
                "doctor_id": clinic.doctor_a,
                "scheduled_at": in_hours(-2),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "past_scheduling");

    // Book in the future, then reschedule into the past: the update path is
    // exempt from the future-time rule by documented policy.
    let (status, created) = send(
        &clinic.app,
        post_json(
            "/appointments",
            Some(&token),
            json!({
                "patient_id": clinic.patient,
                "doctor_id": clinic.doctor_a,
                "scheduled_at": in_hours(24),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_owned();

    let patch = Request::patch(format!("/appointments/{id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({"scheduled_at": in_hours(-5)}).to_string(),
        ))
        .unwrap();
    let (status, updated) = send(&clinic.app, patch).await;
    assert_eq!(status, StatusCode::OK, "reschedule into past: {updated}");
    // A scheduled appointment now in the past reads as missed.
    assert_eq!(updated["effective_status"], "missed");
}

#[tokio::test]
async fn test_soft_delete_hides_from_list_but_audit_lookup_survives() {
    let clinic = clinic();
    let token = login(&clinic.app, "frontdesk").await;

    let (_, created) = send(
        &clinic.app,
        post_json(
            "/appointments",
            Some(&token),
            json!({
                "patient_id": clinic.patient,
                "doctor_id": clinic.doctor_a,
                "scheduled_at": in_hours(24),
            }),
        ),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_owned();

    let delete = Request::delete(format!("/appointments/{id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&clinic.app, delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, listed) = send(&clinic.app, get_with("/appointments", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 0);

    let (status, audited) = send(
        &clinic.app,
        get_with(&format!("/appointments/{id}"), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audited["deleted"], true);
}

#[tokio::test]
async fn test_assistant_sees_only_affiliated_doctor_and_cannot_mutate() {
    let clinic = clinic();
    let frontdesk = login(&clinic.app, "frontdesk").await;

    for (doctor, offset) in [(clinic.doctor_a, 0), (clinic.doctor_b, 30)] {
        let (status, _) = send(
            &clinic.app,
            post_json(
                "/appointments",
                Some(&frontdesk),
                json!({
                    "patient_id": clinic.patient,
                    "doctor_id": doctor,
                    "scheduled_at": (Utc::now() + Duration::hours(24) + Duration::minutes(offset)).to_rfc3339(),
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let assistant = login(&clinic.app, "asst.bola").await;
    let (status, listed) = send(&clinic.app, get_with("/appointments", Some(&assistant))).await;
    assert_eq!(status, StatusCode::OK);
    let rows = listed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["doctor_id"], json!(clinic.doctor_b));

    // View-only role: booking attempts are forbidden.
    let (status, body) = send(
        &clinic.app,
        post_json(
            "/appointments",
            Some(&assistant),
            json!({
                "patient_id": clinic.patient,
                "doctor_id": clinic.doctor_b,
                "scheduled_at": in_hours(48),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
}

#[tokio::test]
async fn test_pharmacist_has_no_appointment_visibility() {
    let clinic = clinic();
    let frontdesk = login(&clinic.app, "frontdesk").await;
    send(
        &clinic.app,
        post_json(
            "/appointments",
            Some(&frontdesk),
            json!({
                "patient_id": clinic.patient,
                "doctor_id": clinic.doctor_a,
                "scheduled_at": in_hours(24),
            }),
        ),
    )
    .await;

    let pharmacist = login(&clinic.app, "pharma").await;
    let (status, listed) = send(&clinic.app, get_with("/appointments", Some(&pharmacist))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());

    let (status, patients) = send(&clinic.app, get_with("/patients", Some(&pharmacist))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(patients.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_all_revokes_outstanding_tokens() {
    let clinic = clinic();
    let first = login(&clinic.app, "frontdesk").await;
    let second = login(&clinic.app, "frontdesk").await;

    let (status, body) = send(
        &clinic.app,
        post_json("/auth/logout-all", Some(&first), Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked"], true);

    // Both pre-revocation tokens are dead, whoever presented the request.
    for token in [&first, &second] {
        let (status, body) = send(&clinic.app, get_with("/appointments", Some(token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "revoked");
    }

    // A fresh login works again.
    let fresh = login(&clinic.app, "frontdesk").await;
    let (status, _) = send(&clinic.app, get_with("/appointments", Some(&fresh))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_patch_null_notes_clears_them_but_absent_leaves_them() {
    let clinic = clinic();
    let token = login(&clinic.app, "frontdesk").await;

    let (status, created) = send(
        &clinic.app,
        post_json(
            "/appointments",
            Some(&token),
            json!({
                "patient_id": clinic.patient,
                "doctor_id": clinic.doctor_a,
                "scheduled_at": in_hours(24),
                "notes": "fasting bloods first",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_owned();

    let patch = |body: Value| {
        Request::patch(format!("/appointments/{id}"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    // A patch that does not mention notes must leave them alone.
    let (status, updated) = send(&clinic.app, patch(json!({"stored_status": "completed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "fasting bloods first");

    // An explicit null clears them.
    let (status, updated) = send(&clinic.app, patch(json!({"notes": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], Value::Null);
}

#[tokio::test]
async fn test_unknown_appointment_is_not_found() {
    let clinic = clinic();
    let token = login(&clinic.app, "frontdesk").await;

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(
        &clinic.app,
        get_with(&format!("/appointments/{missing}"), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}
