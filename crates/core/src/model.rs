//! Domain entities and the shared soft-delete capability.
//!
//! Every entity carries a `deleted` flag rather than being physically
//! removed. The [`SoftDeletable`] trait gives all read paths a single
//! not-deleted predicate to compose instead of repeating the condition
//! ad hoc per query.

use chrono::{DateTime, NaiveDate, Utc};
use clinic_types::{
    AppointmentId, AssistantProfileId, DoctorProfileId, PatientId, Role, StoredStatus,
    TreatmentId, UserId, Username,
};

/// Rows that can be marked inactive without being removed.
///
/// Soft-deleted rows stay addressable by id for audit but are excluded from
/// all list/lookup results and from conflict computation.
pub trait SoftDeletable {
    fn is_deleted(&self) -> bool;
    fn mark_deleted(&mut self);

    /// Convenience predicate for filter chains.
    fn is_active(&self) -> bool {
        !self.is_deleted()
    }
}

macro_rules! impl_soft_deletable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl SoftDeletable for $ty {
                fn is_deleted(&self) -> bool {
                    self.deleted
                }

                fn mark_deleted(&mut self) {
                    self.deleted = true;
                }
            }
        )+
    };
}

/// A staff user account.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    /// PHC-format credential hash. The hashing primitive is an external
    /// collaborator; the core only stores and compares opaque strings.
    pub credential_hash: String,
    pub role: Role,
    /// Incremented whenever credentials change or the user signs out
    /// everywhere; every token minted under an older value is dead.
    pub revocation_counter: u64,
    pub deleted: bool,
}

/// A doctor's practitioner profile, owned by exactly one user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PractitionerProfile {
    pub id: DoctorProfileId,
    pub owner_user_id: UserId,
    pub name: String,
    pub specialization: String,
    pub contact: String,
    pub deleted: bool,
}

/// An assistant's profile, permanently bound to one practitioner.
///
/// The affiliation is the sole scoping key for the Assistant role and is not
/// self-service-changeable.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AssistantProfile {
    pub id: AssistantProfileId,
    pub owner_user_id: UserId,
    pub affiliated_doctor_id: DoctorProfileId,
    pub deleted: bool,
}

/// A patient record. Patients have no owning user account.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub deleted: bool,
}

/// A single-practitioner, single-slot booking.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorProfileId,
    pub scheduled_at: DateTime<Utc>,
    pub stored_status: StoredStatus,
    pub notes: Option<String>,
    pub booked_by_receptionist_id: Option<UserId>,
    pub linked_treatment_id: Option<TreatmentId>,
    pub deleted: bool,
}

impl_soft_deletable!(User, PractitionerProfile, AssistantProfile, Patient, Appointment);

/// Fields required to insert a new appointment.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorProfileId,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub booked_by_receptionist_id: Option<UserId>,
}

/// Partial update applied to an existing appointment.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub stored_status: Option<StoredStatus>,
    pub notes: Option<Option<String>>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        self.scheduled_at.is_none() && self.stored_status.is_none() && self.notes.is_none()
    }
}

/// Entity tables addressable by the generic soft-delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Patient,
    Appointment,
    PractitionerProfile,
    AssistantProfile,
}
