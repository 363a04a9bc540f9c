//! Mapping from typed core errors onto HTTP responses.
//!
//! Every response body is structured JSON so clients can branch on `kind`
//! without parsing messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use clinic_core::ClinicError;
use clinic_session::AuthError;

/// Structured error payload.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    /// Set only for booking conflicts, so the caller can pick another slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_time: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Clinic(#[from] ClinicError),
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Auth(err) => {
                let (status, kind) = match err {
                    AuthError::InvalidCredentials => {
                        (StatusCode::UNAUTHORIZED, "invalid_credentials")
                    }
                    AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
                    AuthError::Revoked => (StatusCode::UNAUTHORIZED, "revoked"),
                    AuthError::Storage(inner) if inner.is_transient() => {
                        (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable")
                    }
                    AuthError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
                };
                (
                    status,
                    ErrorBody {
                        kind,
                        message: err.to_string(),
                        conflicting_time: None,
                    },
                )
            }
            ApiError::Clinic(err) => {
                let (status, kind, conflicting_time) = match err {
                    ClinicError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", None),
                    ClinicError::PastScheduling { .. } => {
                        (StatusCode::BAD_REQUEST, "past_scheduling", None)
                    }
                    ClinicError::DoctorConflict {
                        conflicting_time, ..
                    } => (
                        StatusCode::CONFLICT,
                        "doctor_conflict",
                        Some(*conflicting_time),
                    ),
                    ClinicError::NotFound => (StatusCode::NOT_FOUND, "not_found", None),
                    ClinicError::InvalidInput(_) => {
                        (StatusCode::BAD_REQUEST, "invalid_input", None)
                    }
                    ClinicError::StorageUnavailable(_) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "storage_unavailable",
                        None,
                    ),
                    ClinicError::Storage(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
                    }
                };
                (
                    status,
                    ErrorBody {
                        kind,
                        message: err.to_string(),
                        conflicting_time,
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}
