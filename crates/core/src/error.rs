//! Core error taxonomy.
//!
//! Every failure the core can produce is a typed variant so callers branch on
//! kind rather than parsing messages. The API layer maps these one-to-one
//! onto HTTP statuses.

use chrono::{DateTime, Utc};
use clinic_types::DoctorProfileId;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    /// The caller's role may not mutate this kind of resource.
    #[error("caller is not permitted to perform this operation")]
    Forbidden,

    /// A new booking must be strictly in the future.
    #[error("proposed appointment time {proposed} is not in the future")]
    PastScheduling { proposed: DateTime<Utc> },

    /// The practitioner already has a booking too close to the proposed time.
    #[error("doctor {doctor_id} already has an appointment at {conflicting_time}")]
    DoctorConflict {
        doctor_id: DoctorProfileId,
        conflicting_time: DateTime<Utc>,
    },

    /// Target record is soft-deleted, nonexistent, or outside the caller's
    /// scope. All three cases are reported identically to avoid leaking
    /// existence.
    #[error("record not found")]
    NotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage failed transiently and bounded retries were exhausted.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StoreError),

    /// Non-transient storage failure.
    #[error("storage error: {0}")]
    Storage(#[source] StoreError),
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
