//! REST handlers.
//!
//! Every mutating endpoint validates the bearer token before any scoping or
//! conflict logic runs; a missing header is the same 401 as an invalid or
//! revoked token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use chrono::Utc;
use clinic_core::lifecycle::AppointmentWithStatus;
use clinic_core::model::{AppointmentPatch, NewAppointment};
use clinic_core::status::effective_status;
use clinic_types::{AppointmentId, Role, SessionClaims, Username};

use crate::dto::{
    AppointmentView, CreateAppointmentRequest, DeleteResponse, HealthResponse, LoginRequest,
    LoginResponse, PatientView, RevokeResponse, UpdateAppointmentRequest,
};
use crate::error::ApiError;
use crate::AppState;

type Auth = Option<TypedHeader<Authorization<Bearer>>>;

/// Resolves the caller's claims from the bearer header, or 401.
fn authorize(state: &AppState, auth: &Auth) -> Result<SessionClaims, ApiError> {
    let header = auth
        .as_ref()
        .ok_or(clinic_session::AuthError::Unauthorized)?;
    let claims = state.sessions.validate(header.token(), Utc::now())?;
    Ok(claims)
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // A username that fails validation cannot belong to any account, so it
    // reads as unknown: same InvalidCredentials as a wrong password.
    let username = Username::new(&req.username)
        .map_err(|_| clinic_session::AuthError::InvalidCredentials)?;

    let (token, user) = state
        .sessions
        .authenticate(&username, &req.credential, Utc::now())?;

    Ok(Json(LoginResponse {
        token: token.as_str().to_owned(),
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/logout-all",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All sessions revoked", body = RevokeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
pub async fn logout_all(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<Json<RevokeResponse>, ApiError> {
    let claims = authorize(&state, &auth)?;
    state.sessions.revoke_all(claims.user_id)?;
    Ok(Json(RevokeResponse { revoked: true }))
}

#[utoipa::path(
    get,
    path = "/appointments",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Appointments visible to the caller", body = [AppointmentView]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<Json<Vec<AppointmentView>>, ApiError> {
    let claims = authorize(&state, &auth)?;
    let listed = state.appointments.list(&claims, Utc::now())?;
    Ok(Json(listed.into_iter().map(AppointmentView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/appointments",
    security(("bearer" = [])),
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentView),
        (status = 400, description = "Proposed time is in the past", body = ErrorBody),
        (status = 403, description = "Caller may not book appointments", body = ErrorBody),
        (status = 404, description = "Unknown patient or doctor", body = ErrorBody),
        (status = 409, description = "Doctor already booked near that time", body = ErrorBody)
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    auth: Auth,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentView>), ApiError> {
    let claims = authorize(&state, &auth)?;
    let now = Utc::now();

    let booked_by_receptionist_id =
        (claims.role == Role::Receptionist).then_some(claims.user_id);
    let new = NewAppointment {
        patient_id: req.patient_id,
        doctor_id: req.doctor_id,
        scheduled_at: req.scheduled_at,
        notes: req.notes,
        booked_by_receptionist_id,
    };

    let appointment = state.appointments.create(&claims, new, now)?;
    let status = effective_status(appointment.stored_status, appointment.scheduled_at, now);
    let view = AppointmentView::from(AppointmentWithStatus {
        appointment,
        effective_status: status,
    });
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Audit lookup; includes soft-deleted rows", body = AppointmentView),
        (status = 404, description = "Unknown or out-of-scope appointment", body = ErrorBody)
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<AppointmentId>,
) -> Result<Json<AppointmentView>, ApiError> {
    let claims = authorize(&state, &auth)?;
    let found = state.appointments.get(&claims, id, Utc::now())?;
    Ok(Json(found.into()))
}

#[utoipa::path(
    patch,
    path = "/appointments/{id}",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Appointment id")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentView),
        (status = 403, description = "Caller may not edit appointments", body = ErrorBody),
        (status = 404, description = "Unknown or out-of-scope appointment", body = ErrorBody),
        (status = 409, description = "New time clashes with another booking", body = ErrorBody)
    )
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<AppointmentId>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentView>, ApiError> {
    let claims = authorize(&state, &auth)?;
    let now = Utc::now();

    let patch = AppointmentPatch {
        scheduled_at: req.scheduled_at,
        stored_status: req.stored_status,
        notes: req.notes,
    };
    let appointment = state.appointments.update(&claims, id, patch, now)?;

    let status = effective_status(appointment.stored_status, appointment.scheduled_at, now);
    Ok(Json(AppointmentView::from(AppointmentWithStatus {
        appointment,
        effective_status: status,
    })))
}

#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment soft-deleted", body = DeleteResponse),
        (status = 403, description = "Caller may not delete appointments", body = ErrorBody),
        (status = 404, description = "Unknown or out-of-scope appointment", body = ErrorBody)
    )
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<AppointmentId>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let claims = authorize(&state, &auth)?;
    state.appointments.cancel(&claims, id)?;
    Ok(Json(DeleteResponse { deleted: true }))
}

#[utoipa::path(
    get,
    path = "/patients",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Patients visible to the caller", body = [PatientView]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
pub async fn list_patients(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<Json<Vec<PatientView>>, ApiError> {
    let claims = authorize(&state, &auth)?;
    let patients = state.appointments.list_patients(&claims)?;
    Ok(Json(patients.into_iter().map(PatientView::from).collect()))
}
