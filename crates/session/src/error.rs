//! Authentication and session errors.

use clinic_core::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username, deactivated account, or wrong credential. The three
    /// cases are deliberately indistinguishable to callers.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Malformed, tampered, or expired token, or the user no longer exists.
    #[error("unauthorized")]
    Unauthorized,

    /// The token predates the user's current revocation counter.
    #[error("session revoked")]
    Revoked,

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;
