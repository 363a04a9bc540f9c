//! Storage collaborator interface.
//!
//! Persistence is out of scope for the core; everything it needs from a
//! backing store is expressed through [`ClinicStore`]. All methods are atomic
//! at the single-row level. The `_checked` mutators additionally re-run the
//! minimum-separation rule against current committed state inside the store's
//! own critical section, so a booking that raced past the lifecycle pre-check
//! still cannot silently double-book.

pub mod memory;

use chrono::Duration;
use clinic_types::{AppointmentId, DoctorProfileId, PatientId, UserId, Username};

use crate::model::{
    Appointment, AppointmentPatch, AssistantProfile, EntityKind, NewAppointment, Patient,
    PractitionerProfile, User,
};

pub use memory::MemoryStore;

/// Errors surfaced by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The commit-time separation re-check lost a race to a concurrent
    /// booking.
    #[error("doctor {doctor_id} already has an appointment at {conflicting_time}")]
    Conflict {
        doctor_id: DoctorProfileId,
        conflicting_time: chrono::DateTime<chrono::Utc>,
    },

    #[error("row not found")]
    NotFound,

    /// The backend did not answer within the caller-supplied deadline.
    /// Transient: eligible for bounded retry.
    #[error("storage call timed out")]
    Timeout,

    /// The backend is temporarily unreachable. Transient: eligible for
    /// bounded retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Only transient failures may be retried; everything else is a
    /// definitive answer.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Timeout | StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Abstract storage operations consumed by the core.
///
/// Implementations must make each method an atomic unit: a failed call leaves
/// no partial state behind.
pub trait ClinicStore: Send + Sync {
    // --- identity ---

    fn find_user_by_username(&self, username: &Username) -> StoreResult<Option<User>>;
    fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;
    fn find_doctor_profile_by_user(&self, user_id: UserId)
        -> StoreResult<Option<PractitionerProfile>>;
    fn find_assistant_profile_by_user(
        &self,
        user_id: UserId,
    ) -> StoreResult<Option<AssistantProfile>>;

    /// Atomically bumps the user's revocation counter and returns the new
    /// value. Once this returns, no token minted under the old value may
    /// validate again.
    fn increment_revocation_counter(&self, user_id: UserId) -> StoreResult<u64>;
    fn revocation_counter(&self, user_id: UserId) -> StoreResult<u64>;

    // --- appointments ---

    /// Lists appointments, optionally narrowed to one practitioner.
    /// Soft-deleted rows are excluded unless `include_deleted` is set.
    fn find_appointments(
        &self,
        doctor_id: Option<DoctorProfileId>,
        include_deleted: bool,
    ) -> StoreResult<Vec<Appointment>>;

    fn find_appointment(
        &self,
        id: AppointmentId,
        include_deleted: bool,
    ) -> StoreResult<Option<Appointment>>;

    /// Inserts a new appointment after re-checking the separation rule
    /// against committed state inside the store's critical section.
    fn insert_appointment_checked(
        &self,
        new: NewAppointment,
        min_separation: Duration,
    ) -> StoreResult<Appointment>;

    /// Applies a patch after re-checking the separation rule (excluding the
    /// patched row itself) when the scheduled time changes.
    fn update_appointment_checked(
        &self,
        id: AppointmentId,
        patch: AppointmentPatch,
        min_separation: Duration,
    ) -> StoreResult<Appointment>;

    /// Sets the soft-delete flag on a row of the given kind. The row remains
    /// addressable by id afterwards.
    fn mark_deleted(&self, kind: EntityKind, id: uuid::Uuid) -> StoreResult<()>;

    // --- patients & doctors ---

    fn find_patients(&self, include_deleted: bool) -> StoreResult<Vec<Patient>>;
    fn find_patient(&self, id: PatientId, include_deleted: bool) -> StoreResult<Option<Patient>>;
    fn find_doctor_profile(
        &self,
        id: DoctorProfileId,
    ) -> StoreResult<Option<PractitionerProfile>>;
}
