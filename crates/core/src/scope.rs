//! Role-based visibility scoping and mutation permissions.
//!
//! All functions here are pure: they take explicit [`SessionClaims`] and the
//! candidate record set, and return the subset the caller may see. Mutation
//! rights are a separate, narrower check keyed on `(Role, ResourceKind)`.

use std::collections::HashSet;

use clinic_types::{DoctorProfileId, PatientId, ResourceKind, Role, SessionClaims};

use crate::model::{Appointment, Patient, SoftDeletable};

/// What slice of the appointment book a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Unfiltered view (Admin, Receptionist).
    All,
    /// Only records for one practitioner (Doctor, Assistant).
    Doctor(DoctorProfileId),
    /// No appointment visibility at all: Pharmacist, or a Doctor/Assistant
    /// whose profile could not be resolved (fail closed).
    None,
}

impl ScopeFilter {
    /// Derives the appointment visibility filter from a caller's claims.
    pub fn for_claims(claims: &SessionClaims) -> Self {
        match claims.role {
            Role::Admin | Role::Receptionist => ScopeFilter::All,
            Role::Doctor | Role::Assistant => match claims.binding {
                Some(binding) => ScopeFilter::Doctor(binding.doctor_id()),
                // Claimed a practice role but no resolvable profile: a data
                // inconsistency, never a reason to widen visibility.
                None => {
                    tracing::warn!(
                        user_id = %claims.user_id,
                        role = %claims.role,
                        "practice role without resolvable profile, scoping to empty set"
                    );
                    ScopeFilter::None
                }
            },
            Role::Pharmacist => ScopeFilter::None,
        }
    }

    /// Whether a given practitioner's records fall inside this filter.
    pub fn covers(&self, doctor_id: DoctorProfileId) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::Doctor(own) => *own == doctor_id,
            ScopeFilter::None => false,
        }
    }
}

/// Narrows `appointments` to those the caller may view.
///
/// Soft-deleted rows are excluded here as well, so callers composing this
/// with a raw store read still never observe deleted records.
pub fn scope_appointments(
    claims: &SessionClaims,
    appointments: Vec<Appointment>,
) -> Vec<Appointment> {
    let filter = ScopeFilter::for_claims(claims);
    appointments
        .into_iter()
        .filter(|appt| appt.is_active())
        .filter(|appt| filter.covers(appt.doctor_id))
        .collect()
}

/// Narrows `patients` to those the caller may view.
///
/// Doctors and assistants see only patients reachable through their scoped
/// appointments; the unfiltered roles see everyone.
pub fn scope_patients(
    claims: &SessionClaims,
    patients: Vec<Patient>,
    appointments: &[Appointment],
) -> Vec<Patient> {
    match ScopeFilter::for_claims(claims) {
        ScopeFilter::All => patients.into_iter().filter(|p| p.is_active()).collect(),
        ScopeFilter::Doctor(doctor_id) => {
            let reachable: HashSet<PatientId> = appointments
                .iter()
                .filter(|appt| appt.is_active())
                .filter(|appt| appt.doctor_id == doctor_id)
                .map(|appt| appt.patient_id)
                .collect();
            patients
                .into_iter()
                .filter(|p| p.is_active())
                .filter(|p| reachable.contains(&p.id))
                .collect()
        }
        ScopeFilter::None => Vec::new(),
    }
}

/// Whether the caller's role may mutate records of `kind`.
///
/// Viewing is governed by scoping; this is the stricter write-side table.
/// Assistants are view-only across the board.
pub fn can_mutate(claims: &SessionClaims, kind: ResourceKind) -> bool {
    match (claims.role, kind) {
        (Role::Admin, _) => true,
        (
            Role::Receptionist,
            ResourceKind::Appointment | ResourceKind::Patient | ResourceKind::Billing,
        ) => true,
        (
            Role::Doctor,
            ResourceKind::Appointment | ResourceKind::Treatment | ResourceKind::Prescription,
        ) => true,
        (Role::Pharmacist, ResourceKind::Inventory | ResourceKind::Prescription) => true,
        _ => false,
    }
}
