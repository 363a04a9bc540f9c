//! # Clinic Types
//!
//! Shared vocabulary for the clinic backend: entity identifiers, role and
//! status enums, session claims, and validated text types.
//!
//! This crate is deliberately free of business logic so that the core,
//! session, and API crates can all depend on it without cycles.

#![warn(rust_2018_idioms)]

pub mod claims;
pub mod ids;
pub mod role;
pub mod status;
pub mod username;

pub use claims::{PracticeBinding, SessionClaims};
pub use ids::{AppointmentId, AssistantProfileId, DoctorProfileId, PatientId, TreatmentId, UserId};
pub use role::{ResourceKind, Role};
pub use status::{EffectiveStatus, StoredStatus};
pub use username::{Username, UsernameError};
