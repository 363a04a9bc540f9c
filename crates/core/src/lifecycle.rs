//! Appointment lifecycle orchestration.
//!
//! Ties the other components together: every operation takes explicit
//! [`SessionClaims`] and an explicit `now`, gates the write through the
//! permission table and the conflict checks, and commits through the storage
//! collaborator's atomic `_checked` mutators. Failure anywhere aborts the
//! whole operation; partial writes are never observable.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clinic_types::{AppointmentId, EffectiveStatus, ResourceKind, SessionClaims};

use crate::config::CoreConfig;
use crate::conflict;
use crate::error::{ClinicError, ClinicResult};
use crate::model::{Appointment, AppointmentPatch, EntityKind, NewAppointment, Patient};
use crate::scope::{self, ScopeFilter};
use crate::status::effective_status;
use crate::store::{ClinicStore, StoreError, StoreResult};

/// An appointment paired with its display status at a given instant.
#[derive(Debug, Clone)]
pub struct AppointmentWithStatus {
    pub appointment: Appointment,
    pub effective_status: EffectiveStatus,
}

/// Orchestrates appointment create/update/cancel with soft-delete semantics.
pub struct AppointmentService {
    store: Arc<dyn ClinicStore>,
    config: CoreConfig,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn ClinicStore>, config: CoreConfig) -> Self {
        Self { store, config }
    }

    /// Books a new appointment.
    ///
    /// Gate order: mutation permission → referenced doctor and patient exist
    /// and are active → caller's scope covers the target practitioner →
    /// future-time rule → separation rule → atomic checked insert.
    pub fn create(
        &self,
        claims: &SessionClaims,
        new: NewAppointment,
        now: DateTime<Utc>,
    ) -> ClinicResult<Appointment> {
        if !scope::can_mutate(claims, ResourceKind::Appointment) {
            return Err(ClinicError::Forbidden);
        }

        let doctor = self
            .retrying(|| self.store.find_doctor_profile(new.doctor_id))?
            .ok_or(ClinicError::NotFound)?;
        self.retrying(|| self.store.find_patient(new.patient_id, false))?
            .ok_or(ClinicError::NotFound)?;

        // A doctor may only book into their own schedule; unfiltered roles
        // may book anywhere.
        if !ScopeFilter::for_claims(claims).covers(new.doctor_id) {
            return Err(ClinicError::Forbidden);
        }

        let existing =
            self.retrying(|| self.store.find_appointments(Some(new.doctor_id), false))?;
        conflict::validate_booking(
            new.doctor_id,
            new.scheduled_at,
            &existing,
            None,
            true,
            self.config.min_separation(),
            now,
        )?;

        let appointment = self.retrying(|| {
            self.store
                .insert_appointment_checked(new.clone(), self.config.min_separation())
        })?;

        tracing::info!(
            appointment_id = %appointment.id,
            doctor = %doctor.name,
            scheduled_at = %appointment.scheduled_at,
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Updates time, stored status, or notes of an existing appointment.
    ///
    /// A changed time re-runs the separation rule (excluding the appointment
    /// itself) but not the future-time rule: rescheduling into the past is a
    /// documented, intentional allowance.
    pub fn update(
        &self,
        claims: &SessionClaims,
        id: AppointmentId,
        patch: AppointmentPatch,
        now: DateTime<Utc>,
    ) -> ClinicResult<Appointment> {
        if !scope::can_mutate(claims, ResourceKind::Appointment) {
            return Err(ClinicError::Forbidden);
        }

        let current = self.visible_appointment(claims, id)?;

        // An empty patch is a no-op, not an error.
        if patch.is_empty() {
            return Ok(current);
        }

        if let Some(new_time) = patch.scheduled_at {
            if new_time != current.scheduled_at {
                let existing = self
                    .retrying(|| self.store.find_appointments(Some(current.doctor_id), false))?;
                conflict::validate_booking(
                    current.doctor_id,
                    new_time,
                    &existing,
                    Some(id),
                    false,
                    self.config.min_separation(),
                    now,
                )?;
            }
        }

        let updated = self.retrying(|| {
            self.store
                .update_appointment_checked(id, patch.clone(), self.config.min_separation())
        })?;

        tracing::info!(appointment_id = %updated.id, "appointment updated");
        Ok(updated)
    }

    /// Soft-deletes an appointment.
    ///
    /// Sets the `deleted` flag only; the stored business status is left
    /// untouched. Distinct from setting `stored_status = Cancelled`, which
    /// keeps the row listed.
    pub fn cancel(&self, claims: &SessionClaims, id: AppointmentId) -> ClinicResult<()> {
        if !scope::can_mutate(claims, ResourceKind::Appointment) {
            return Err(ClinicError::Forbidden);
        }

        let current = self.visible_appointment(claims, id)?;

        self.retrying(|| {
            self.store
                .mark_deleted(EntityKind::Appointment, current.id.as_uuid())
        })?;

        tracing::info!(appointment_id = %id, "appointment soft-deleted");
        Ok(())
    }

    /// Lists the caller's visible appointments with their effective status at
    /// `now`.
    pub fn list(
        &self,
        claims: &SessionClaims,
        now: DateTime<Utc>,
    ) -> ClinicResult<Vec<AppointmentWithStatus>> {
        let all = self.retrying(|| self.store.find_appointments(None, false))?;
        let visible = scope::scope_appointments(claims, all);

        Ok(visible
            .into_iter()
            .map(|appointment| {
                let status =
                    effective_status(appointment.stored_status, appointment.scheduled_at, now);
                AppointmentWithStatus {
                    appointment,
                    effective_status: status,
                }
            })
            .collect())
    }

    /// Audit lookup by id: finds the row even when soft-deleted, as long as
    /// it falls inside the caller's scope.
    pub fn get(
        &self,
        claims: &SessionClaims,
        id: AppointmentId,
        now: DateTime<Utc>,
    ) -> ClinicResult<AppointmentWithStatus> {
        let appointment = self
            .retrying(|| self.store.find_appointment(id, true))?
            .ok_or(ClinicError::NotFound)?;

        if !ScopeFilter::for_claims(claims).covers(appointment.doctor_id) {
            // Out-of-scope ids read as absent; no existence leakage.
            return Err(ClinicError::NotFound);
        }

        let status = effective_status(appointment.stored_status, appointment.scheduled_at, now);
        Ok(AppointmentWithStatus {
            appointment,
            effective_status: status,
        })
    }

    /// Lists the patients visible to the caller, scoped transitively through
    /// their visible appointments.
    pub fn list_patients(&self, claims: &SessionClaims) -> ClinicResult<Vec<Patient>> {
        let patients = self.retrying(|| self.store.find_patients(false))?;
        let appointments = self.retrying(|| self.store.find_appointments(None, false))?;
        Ok(scope::scope_patients(claims, patients, &appointments))
    }

    /// Loads an appointment the caller is allowed to act on, or `NotFound`.
    fn visible_appointment(
        &self,
        claims: &SessionClaims,
        id: AppointmentId,
    ) -> ClinicResult<Appointment> {
        let appointment = self
            .retrying(|| self.store.find_appointment(id, false))?
            .ok_or(ClinicError::NotFound)?;

        if !ScopeFilter::for_claims(claims).covers(appointment.doctor_id) {
            return Err(ClinicError::NotFound);
        }

        Ok(appointment)
    }

    /// Runs a storage call with a bounded retry budget for transient
    /// failures. Conflicts reported by the commit-time backstop map to the
    /// same typed error as the pre-check so callers see one taxonomy.
    fn retrying<T>(&self, mut op: impl FnMut() -> StoreResult<T>) -> ClinicResult<T> {
        let attempts = self.config.storage_attempts();
        let mut last_transient = None;

        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    tracing::warn!(attempt, attempts, error = %err, "transient storage failure");
                    last_transient = Some(err);
                }
                Err(StoreError::Conflict {
                    doctor_id,
                    conflicting_time,
                }) => {
                    return Err(ClinicError::DoctorConflict {
                        doctor_id,
                        conflicting_time,
                    })
                }
                Err(StoreError::NotFound) => return Err(ClinicError::NotFound),
                Err(err) => return Err(ClinicError::Storage(err)),
            }
        }

        let err = last_transient.unwrap_or(StoreError::Timeout);
        tracing::error!(attempts, error = %err, "storage retries exhausted");
        Err(ClinicError::StorageUnavailable(err))
    }
}
