//! Session claims carried from authentication into every scoped call.
//!
//! Claims are resolved once, when a session is established, and then passed
//! explicitly as an argument into scoping and lifecycle calls. Nothing in the
//! core reads a "current user" from ambient state.

use crate::ids::{DoctorProfileId, UserId};
use crate::role::Role;

/// The practice a Doctor or Assistant session is bound to.
///
/// Resolved from the caller's profile at authentication time and embedded in
/// the session token; never re-derived ad hoc per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PracticeBinding {
    /// A doctor acting on their own practitioner profile.
    Practitioner { profile_id: DoctorProfileId },
    /// An assistant permanently affiliated with one doctor's practice.
    Assistant { affiliated_doctor_id: DoctorProfileId },
}

impl PracticeBinding {
    /// The doctor whose records this binding grants visibility into.
    pub fn doctor_id(&self) -> DoctorProfileId {
        match self {
            PracticeBinding::Practitioner { profile_id } => *profile_id,
            PracticeBinding::Assistant {
                affiliated_doctor_id,
            } => *affiliated_doctor_id,
        }
    }
}

/// Identity of an authenticated caller.
///
/// `binding` is `None` for roles without a practice affiliation
/// (Admin, Receptionist, Pharmacist) and also when a Doctor or Assistant
/// account has no resolvable profile; the latter is a data inconsistency and
/// scoping fails closed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub role: Role,
    pub binding: Option<PracticeBinding>,
}

impl SessionClaims {
    /// Claims for a role that carries no practice binding.
    pub fn unbound(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            binding: None,
        }
    }
}
