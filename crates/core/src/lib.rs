//! # Clinic Core
//!
//! Core business logic for the clinic scheduling backend.
//!
//! This crate contains the four behaviours with real invariants:
//! - Role-based visibility scoping ([`scope`])
//! - Booking conflict and validity checks ([`conflict`])
//! - Time-derived effective status ([`status`])
//! - Appointment lifecycle orchestration with soft-delete ([`lifecycle`])
//!
//! Persistent storage is an external collaborator reached through the
//! [`store::ClinicStore`] trait; an in-memory reference implementation lives
//! in [`store::memory`].
//!
//! **No API concerns**: session tokens belong in `clinic-session`, HTTP
//! handling in `api-rest`.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod conflict;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod scope;
pub mod status;
pub mod store;

pub use config::CoreConfig;
pub use error::{ClinicError, ClinicResult};
pub use lifecycle::AppointmentService;
pub use model::SoftDeletable;
