//! # API REST
//!
//! REST API implementation for the clinic backend.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Bearer-token authorization ahead of any scope or conflict logic
//! - OpenAPI documentation via utoipa
//!
//! Business decisions live in `clinic-core` and `clinic-session`; this crate
//! only translates between HTTP and the typed core errors.

#![warn(rust_2018_idioms)]

pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use clinic_core::AppointmentService;
use clinic_session::SessionService;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub use error::ApiError;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub appointments: Arc<AppointmentService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::login,
        handlers::logout_all,
        handlers::list_appointments,
        handlers::create_appointment,
        handlers::get_appointment,
        handlers::update_appointment,
        handlers::delete_appointment,
        handlers::list_patients,
    ),
    components(schemas(
        dto::HealthResponse,
        dto::LoginRequest,
        dto::LoginResponse,
        dto::UserSummaryDto,
        dto::AppointmentView,
        dto::CreateAppointmentRequest,
        dto::UpdateAppointmentRequest,
        dto::DeleteResponse,
        dto::RevokeResponse,
        dto::PatientView,
        error::ErrorBody,
        clinic_types::Role,
        clinic_types::StoredStatus,
        clinic_types::EffectiveStatus,
    )),
    modifiers(&BearerSecurity)
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("opaque")
                        .build(),
                ),
            );
        }
    }
}

/// Builds the REST router over the given application state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout-all", post(handlers::logout_all))
        .route("/appointments", get(handlers::list_appointments))
        .route("/appointments", post(handlers::create_appointment))
        .route("/appointments/:id", get(handlers::get_appointment))
        .route("/appointments/:id", patch(handlers::update_appointment))
        .route("/appointments/:id", delete(handlers::delete_appointment))
        .route("/patients", get(handlers::list_patients))
        .with_state(state)
}
