//! Time-derived effective appointment status.

use chrono::{DateTime, Utc};
use clinic_types::{EffectiveStatus, StoredStatus};

/// Computes the status shown to callers from the stored status and the
/// evaluation instant.
///
/// Terminal business states (`Completed`, `Cancelled`) pass through
/// unchanged; a `Scheduled` appointment whose time has passed reads as
/// `Missed`. This never writes back to storage, so two callers observing the
/// same appointment at different instants may legitimately see different
/// effective statuses.
///
/// `now` is an explicit argument, never the wall clock, so the derivation is
/// deterministic under test.
pub fn effective_status(
    stored: StoredStatus,
    scheduled_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> EffectiveStatus {
    if stored.is_terminal() {
        return stored.into();
    }

    if scheduled_at < now {
        EffectiveStatus::Missed
    } else {
        EffectiveStatus::Scheduled
    }
}
