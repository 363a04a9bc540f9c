//! In-memory reference store.
//!
//! Used by the binary for demonstration and by tests everywhere. A single
//! mutex over all tables makes every trait method a serializable unit, which
//! is exactly the transactional guarantee the lifecycle relies on.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Duration;
use clinic_types::{
    AppointmentId, AssistantProfileId, DoctorProfileId, PatientId, StoredStatus, UserId, Username,
};
use uuid::Uuid;

use crate::conflict;
use crate::model::{
    Appointment, AppointmentPatch, AssistantProfile, EntityKind, NewAppointment, Patient,
    PractitionerProfile, SoftDeletable, User,
};
use crate::store::{ClinicStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    doctor_profiles: BTreeMap<DoctorProfileId, PractitionerProfile>,
    assistant_profiles: BTreeMap<AssistantProfileId, AssistantProfile>,
    patients: BTreeMap<PatientId, Patient>,
    appointments: BTreeMap<AppointmentId, Appointment>,
}

/// A `ClinicStore` holding everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        // Lock poisoning only happens if a writer panicked mid-operation;
        // the tables are still structurally sound, so recover the guard.
        let mut guard = match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    // --- seeding helpers for the binary and tests ---

    pub fn seed_user(&self, user: User) {
        self.with_tables(|t| {
            t.users.insert(user.id, user);
        });
    }

    pub fn seed_doctor_profile(&self, profile: PractitionerProfile) {
        self.with_tables(|t| {
            t.doctor_profiles.insert(profile.id, profile);
        });
    }

    pub fn seed_assistant_profile(&self, profile: AssistantProfile) {
        self.with_tables(|t| {
            t.assistant_profiles.insert(profile.id, profile);
        });
    }

    pub fn seed_patient(&self, patient: Patient) {
        self.with_tables(|t| {
            t.patients.insert(patient.id, patient);
        });
    }
}

impl ClinicStore for MemoryStore {
    fn find_user_by_username(&self, username: &Username) -> StoreResult<Option<User>> {
        Ok(self.with_tables(|t| {
            t.users
                .values()
                .find(|u| &u.username == username)
                .cloned()
        }))
    }

    fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.with_tables(|t| t.users.get(&id).cloned()))
    }

    fn find_doctor_profile_by_user(
        &self,
        user_id: UserId,
    ) -> StoreResult<Option<PractitionerProfile>> {
        Ok(self.with_tables(|t| {
            t.doctor_profiles
                .values()
                .find(|p| p.owner_user_id == user_id && p.is_active())
                .cloned()
        }))
    }

    fn find_assistant_profile_by_user(
        &self,
        user_id: UserId,
    ) -> StoreResult<Option<AssistantProfile>> {
        Ok(self.with_tables(|t| {
            t.assistant_profiles
                .values()
                .find(|p| p.owner_user_id == user_id && p.is_active())
                .cloned()
        }))
    }

    fn increment_revocation_counter(&self, user_id: UserId) -> StoreResult<u64> {
        self.with_tables(|t| {
            let user = t.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
            user.revocation_counter += 1;
            Ok(user.revocation_counter)
        })
    }

    fn revocation_counter(&self, user_id: UserId) -> StoreResult<u64> {
        self.with_tables(|t| {
            t.users
                .get(&user_id)
                .map(|u| u.revocation_counter)
                .ok_or(StoreError::NotFound)
        })
    }

    fn find_appointments(
        &self,
        doctor_id: Option<DoctorProfileId>,
        include_deleted: bool,
    ) -> StoreResult<Vec<Appointment>> {
        Ok(self.with_tables(|t| {
            t.appointments
                .values()
                .filter(|a| include_deleted || a.is_active())
                .filter(|a| doctor_id.is_none_or(|d| a.doctor_id == d))
                .cloned()
                .collect()
        }))
    }

    fn find_appointment(
        &self,
        id: AppointmentId,
        include_deleted: bool,
    ) -> StoreResult<Option<Appointment>> {
        Ok(self.with_tables(|t| {
            t.appointments
                .get(&id)
                .filter(|a| include_deleted || a.is_active())
                .cloned()
        }))
    }

    fn insert_appointment_checked(
        &self,
        new: NewAppointment,
        min_separation: Duration,
    ) -> StoreResult<Appointment> {
        self.with_tables(|t| {
            let existing: Vec<Appointment> = t
                .appointments
                .values()
                .filter(|a| a.doctor_id == new.doctor_id)
                .cloned()
                .collect();

            // Commit-time backstop: re-check against committed state while
            // holding the lock.
            if let Some(conflicting_time) = conflict::find_conflict(
                new.doctor_id,
                new.scheduled_at,
                &existing,
                None,
                min_separation,
            ) {
                return Err(StoreError::Conflict {
                    doctor_id: new.doctor_id,
                    conflicting_time,
                });
            }

            let appointment = Appointment {
                id: AppointmentId::new(),
                patient_id: new.patient_id,
                doctor_id: new.doctor_id,
                scheduled_at: new.scheduled_at,
                stored_status: StoredStatus::Scheduled,
                notes: new.notes,
                booked_by_receptionist_id: new.booked_by_receptionist_id,
                linked_treatment_id: None,
                deleted: false,
            };
            t.appointments.insert(appointment.id, appointment.clone());
            Ok(appointment)
        })
    }

    fn update_appointment_checked(
        &self,
        id: AppointmentId,
        patch: AppointmentPatch,
        min_separation: Duration,
    ) -> StoreResult<Appointment> {
        self.with_tables(|t| {
            let current = t
                .appointments
                .get(&id)
                .filter(|a| a.is_active())
                .cloned()
                .ok_or(StoreError::NotFound)?;

            if let Some(new_time) = patch.scheduled_at {
                if new_time != current.scheduled_at {
                    let existing: Vec<Appointment> = t
                        .appointments
                        .values()
                        .filter(|a| a.doctor_id == current.doctor_id)
                        .cloned()
                        .collect();

                    if let Some(conflicting_time) = conflict::find_conflict(
                        current.doctor_id,
                        new_time,
                        &existing,
                        Some(id),
                        min_separation,
                    ) {
                        return Err(StoreError::Conflict {
                            doctor_id: current.doctor_id,
                            conflicting_time,
                        });
                    }
                }
            }

            let appointment = t
                .appointments
                .get_mut(&id)
                .expect("row existed under the same lock");
            if let Some(new_time) = patch.scheduled_at {
                appointment.scheduled_at = new_time;
            }
            if let Some(status) = patch.stored_status {
                appointment.stored_status = status;
            }
            if let Some(notes) = patch.notes {
                appointment.notes = notes;
            }
            Ok(appointment.clone())
        })
    }

    fn mark_deleted(&self, kind: EntityKind, id: Uuid) -> StoreResult<()> {
        self.with_tables(|t| {
            let found = match kind {
                EntityKind::User => t
                    .users
                    .get_mut(&UserId::from(id))
                    .map(|r| r.mark_deleted())
                    .is_some(),
                EntityKind::Patient => t
                    .patients
                    .get_mut(&PatientId::from(id))
                    .map(|r| r.mark_deleted())
                    .is_some(),
                EntityKind::Appointment => t
                    .appointments
                    .get_mut(&AppointmentId::from(id))
                    .map(|r| r.mark_deleted())
                    .is_some(),
                EntityKind::PractitionerProfile => t
                    .doctor_profiles
                    .get_mut(&DoctorProfileId::from(id))
                    .map(|r| r.mark_deleted())
                    .is_some(),
                EntityKind::AssistantProfile => t
                    .assistant_profiles
                    .get_mut(&AssistantProfileId::from(id))
                    .map(|r| r.mark_deleted())
                    .is_some(),
            };

            if found {
                Ok(())
            } else {
                Err(StoreError::NotFound)
            }
        })
    }

    fn find_patients(&self, include_deleted: bool) -> StoreResult<Vec<Patient>> {
        Ok(self.with_tables(|t| {
            t.patients
                .values()
                .filter(|p| include_deleted || p.is_active())
                .cloned()
                .collect()
        }))
    }

    fn find_patient(&self, id: PatientId, include_deleted: bool) -> StoreResult<Option<Patient>> {
        Ok(self.with_tables(|t| {
            t.patients
                .get(&id)
                .filter(|p| include_deleted || p.is_active())
                .cloned()
        }))
    }

    fn find_doctor_profile(
        &self,
        id: DoctorProfileId,
    ) -> StoreResult<Option<PractitionerProfile>> {
        Ok(self.with_tables(|t| {
            t.doctor_profiles
                .get(&id)
                .filter(|p| p.is_active())
                .cloned()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, min: u32) -> chrono::DateTime<chrono::Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, h, min, 0).unwrap()
    }

    fn new_appointment(
        doctor_id: DoctorProfileId,
        scheduled_at: chrono::DateTime<chrono::Utc>,
    ) -> NewAppointment {
        NewAppointment {
            patient_id: PatientId::new(),
            doctor_id,
            scheduled_at,
            notes: None,
            booked_by_receptionist_id: None,
        }
    }

    #[test]
    fn test_checked_insert_rejects_racing_double_booking() {
        let store = MemoryStore::new();
        let doctor = DoctorProfileId::new();
        let sep = Duration::minutes(10);

        store
            .insert_appointment_checked(new_appointment(doctor, at(9, 0)), sep)
            .expect("first booking commits");

        let err = store
            .insert_appointment_checked(new_appointment(doctor, at(9, 8)), sep)
            .expect_err("second booking inside the window must fail");
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[test]
    fn test_checked_update_excludes_own_row() {
        let store = MemoryStore::new();
        let doctor = DoctorProfileId::new();
        let sep = Duration::minutes(10);

        let appt = store
            .insert_appointment_checked(new_appointment(doctor, at(9, 0)), sep)
            .unwrap();

        // Nudging the same appointment by 5 minutes must not conflict with
        // its own old slot.
        let patch = AppointmentPatch {
            scheduled_at: Some(at(9, 5)),
            ..AppointmentPatch::default()
        };
        let updated = store
            .update_appointment_checked(appt.id, patch, sep)
            .expect("self-move succeeds");
        assert_eq!(updated.scheduled_at, at(9, 5));
    }

    #[test]
    fn test_soft_deleted_row_stays_addressable_by_id() {
        let store = MemoryStore::new();
        let doctor = DoctorProfileId::new();
        let sep = Duration::minutes(10);

        let appt = store
            .insert_appointment_checked(new_appointment(doctor, at(9, 0)), sep)
            .unwrap();
        store
            .mark_deleted(EntityKind::Appointment, appt.id.as_uuid())
            .unwrap();

        assert!(store.find_appointment(appt.id, false).unwrap().is_none());
        let audited = store
            .find_appointment(appt.id, true)
            .unwrap()
            .expect("audit lookup still finds the row");
        assert!(audited.deleted);

        // And the freed slot is bookable again.
        assert!(store
            .insert_appointment_checked(new_appointment(doctor, at(9, 0)), sep)
            .is_ok());
    }

    #[test]
    fn test_revocation_counter_increments_atomically() {
        let store = MemoryStore::new();
        let user = User {
            id: UserId::new(),
            username: Username::new("reception1").unwrap(),
            credential_hash: "x".into(),
            role: clinic_types::Role::Receptionist,
            revocation_counter: 0,
            deleted: false,
        };
        let user_id = user.id;
        store.seed_user(user);

        assert_eq!(store.revocation_counter(user_id).unwrap(), 0);
        assert_eq!(store.increment_revocation_counter(user_id).unwrap(), 1);
        assert_eq!(store.increment_revocation_counter(user_id).unwrap(), 2);
        assert_eq!(store.revocation_counter(user_id).unwrap(), 2);
    }
}
