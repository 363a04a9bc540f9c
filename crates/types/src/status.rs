//! Appointment status vocabulary.
//!
//! Stored and effective statuses are separate enums on purpose: `Missed` is a
//! display-only state derived from the clock and must never be written to
//! storage. Keeping it out of [`StoredStatus`] makes that invariant hold by
//! construction rather than by discipline.

/// The status actually persisted on an appointment row.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum StoredStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl StoredStatus {
    /// Terminal business outcomes are never overridden by time-based
    /// derivation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StoredStatus::Completed | StoredStatus::Cancelled)
    }
}

/// The status shown to callers, computed on every read from the stored status
/// and the current time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Scheduled,
    Completed,
    Cancelled,
    Missed,
}

impl From<StoredStatus> for EffectiveStatus {
    fn from(value: StoredStatus) -> Self {
        match value {
            StoredStatus::Scheduled => EffectiveStatus::Scheduled,
            StoredStatus::Completed => EffectiveStatus::Completed,
            StoredStatus::Cancelled => EffectiveStatus::Cancelled,
        }
    }
}
