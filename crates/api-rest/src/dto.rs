//! Request and response bodies for the REST surface.
//!
//! Appointment responses carry the computed `effective_status`, never the
//! raw stored status alone; the `deleted` flag appears only on the audit
//! lookup view.

use chrono::{DateTime, NaiveDate, Utc};
use clinic_core::lifecycle::AppointmentWithStatus;
use clinic_core::model::Patient;
use clinic_session::UserSummary;
use clinic_types::{
    AppointmentId, DoctorProfileId, EffectiveStatus, PatientId, Role, StoredStatus, UserId,
};

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub credential: String,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct UserSummaryDto {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl From<UserSummary> for UserSummaryDto {
    fn from(summary: UserSummary) -> Self {
        Self {
            id: summary.id,
            username: summary.username.to_string(),
            role: summary.role,
        }
    }
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummaryDto,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct RevokeResponse {
    pub revoked: bool,
}

#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct CreateAppointmentRequest {
    pub patient_id: PatientId,
    pub doctor_id: DoctorProfileId,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct UpdateAppointmentRequest {
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stored_status: Option<StoredStatus>,
    /// Absent leaves the notes unchanged; an explicit `null` clears them.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub notes: Option<Option<String>>,
}

/// Keeps the absent/`null` distinction for patch fields: serde only calls
/// this when the key is present, so `null` becomes `Some(None)` while a
/// missing key stays `None` via the field default.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// An appointment as shown to callers.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct AppointmentView {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorProfileId,
    pub scheduled_at: DateTime<Utc>,
    pub effective_status: EffectiveStatus,
    pub notes: Option<String>,
    /// Present (and possibly `true`) only on the audit lookup; list results
    /// never contain deleted rows.
    pub deleted: bool,
}

impl From<AppointmentWithStatus> for AppointmentView {
    fn from(value: AppointmentWithStatus) -> Self {
        let appt = value.appointment;
        Self {
            id: appt.id,
            patient_id: appt.patient_id,
            doctor_id: appt.doctor_id,
            scheduled_at: appt.scheduled_at,
            effective_status: value.effective_status,
            notes: appt.notes,
            deleted: appt.deleted,
        }
    }
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct PatientView {
    pub id: PatientId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
}

impl From<Patient> for PatientView {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            date_of_birth: patient.date_of_birth,
            contact_phone: patient.contact_phone,
            address: patient.address,
        }
    }
}
