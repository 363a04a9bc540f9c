//! # Clinic Session
//!
//! Identity and session management: credential verification, signed session
//! tokens, and counter-based all-at-once revocation.
//!
//! There is no server-side token store. Each token embeds the user's
//! revocation counter at issue time; bumping the counter (password change,
//! sign-out-everywhere, deactivation) invalidates every outstanding token
//! with a single integer compare on validation.

#![warn(rust_2018_idioms)]

pub mod credential;
pub mod error;
pub mod service;
pub mod token;

pub use credential::{CredentialVerifier, Pbkdf2Verifier};
pub use error::{AuthError, AuthResult};
pub use service::{SessionService, UserSummary};
pub use token::{SessionToken, TokenSigner};
