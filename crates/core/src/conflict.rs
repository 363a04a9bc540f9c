//! Booking conflict and validity checks.
//!
//! Pure functions: the caller supplies the practitioner's existing
//! appointments and the evaluation instant. The same check is re-run by the
//! storage layer inside its commit section so a racing request cannot
//! double-book between read and write.

use chrono::{DateTime, Duration, Utc};
use clinic_types::{AppointmentId, DoctorProfileId};

use crate::error::{ClinicError, ClinicResult};
use crate::model::{Appointment, SoftDeletable};

/// Validates a proposed (practitioner, time) pair against the practitioner's
/// existing bookings.
///
/// Rule 1 (new bookings only): `proposed_time` must be strictly after `now`,
/// else `PastScheduling`. Updates are exempt so an existing appointment can
/// be rescheduled or left at a time that has since passed.
///
/// Rule 2: every non-deleted appointment of the same doctor, except the one
/// identified by `exclude_id`, must be at least `min_separation` away from
/// `proposed_time` in either direction. The first conflicting appointment in
/// ascending-id order is reported, keeping error messages reproducible for a
/// fixed input set.
pub fn validate_booking(
    doctor_id: DoctorProfileId,
    proposed_time: DateTime<Utc>,
    existing: &[Appointment],
    exclude_id: Option<AppointmentId>,
    is_new_booking: bool,
    min_separation: Duration,
    now: DateTime<Utc>,
) -> ClinicResult<()> {
    if is_new_booking && proposed_time <= now {
        return Err(ClinicError::PastScheduling {
            proposed: proposed_time,
        });
    }

    if let Some(conflicting_time) =
        find_conflict(doctor_id, proposed_time, existing, exclude_id, min_separation)
    {
        return Err(ClinicError::DoctorConflict {
            doctor_id,
            conflicting_time,
        });
    }

    Ok(())
}

/// Returns the time of the first appointment within `min_separation` of
/// `proposed_time`, or `None` if the slot is free.
///
/// The comparison is symmetric (absolute difference), so a booking cannot be
/// squeezed in just before an existing one either. Soft-deleted rows never
/// conflict.
pub fn find_conflict(
    doctor_id: DoctorProfileId,
    proposed_time: DateTime<Utc>,
    existing: &[Appointment],
    exclude_id: Option<AppointmentId>,
    min_separation: Duration,
) -> Option<DateTime<Utc>> {
    let mut candidates: Vec<&Appointment> = existing
        .iter()
        .filter(|appt| appt.is_active())
        .filter(|appt| appt.doctor_id == doctor_id)
        .filter(|appt| Some(appt.id) != exclude_id)
        .collect();
    // Stable iteration order for deterministic conflict reporting.
    candidates.sort_by_key(|appt| appt.id);

    candidates
        .iter()
        .find(|appt| (appt.scheduled_at - proposed_time).abs() < min_separation)
        .map(|appt| appt.scheduled_at)
}
