//! Credential hashing seam.
//!
//! The hashing primitive is an external collaborator: the core stores opaque
//! PHC strings and this trait decides whether a plaintext matches one. The
//! production implementation uses PBKDF2 via the `password-hash` API.

use pbkdf2::password_hash::rand_core::OsRng;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;

/// Verifies a plaintext credential against a stored hash.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool;
}

/// PBKDF2-SHA256 verifier over PHC-format hashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pbkdf2Verifier;

impl Pbkdf2Verifier {
    /// Hashes a plaintext credential for storage. Used when seeding accounts
    /// and by administrative credential changes.
    pub fn hash(plaintext: &str) -> Result<String, pbkdf2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Pbkdf2.hash_password(plaintext.as_bytes(), &salt)?.to_string())
    }
}

impl CredentialVerifier for Pbkdf2Verifier {
    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            tracing::warn!("stored credential hash is not valid PHC format");
            return false;
        };
        Pbkdf2.verify_password(plaintext.as_bytes(), &parsed).is_ok()
    }
}
