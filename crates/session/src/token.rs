//! Signed session tokens.
//!
//! Wire format: `base64url(payload_json) . base64url(hmac_sha256(payload))`,
//! both segments unpadded. The payload carries everything validation needs
//! except the user's *current* revocation counter, which is read from storage
//! at validation time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use clinic_types::{PracticeBinding, Role, UserId};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// An opaque bearer token handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The claims embedded in a token at mint time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenPayload {
    pub user_id: UserId,
    pub role: Role,
    pub binding: Option<PracticeBinding>,
    pub revocation_counter_at_issue: u64,
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies HMAC-signed session tokens.
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    /// Creates a signer over the given secret key bytes.
    ///
    /// The secret must be non-empty; key distribution is the deployment's
    /// concern.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        let secret = secret.into();
        debug_assert!(!secret.is_empty(), "token secret must not be empty");
        Self { secret }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any size, so this cannot fail for a non-empty
        // secret.
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Signs a payload into a bearer token.
    pub fn mint(&self, payload: &TokenPayload) -> SessionToken {
        let body = serde_json::to_vec(payload).expect("payload serializes");
        let mut mac = self.mac();
        mac.update(&body);
        let tag = mac.finalize().into_bytes();

        SessionToken(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&body),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }

    /// Verifies the signature and expiry of a token and returns its payload.
    ///
    /// Any structural problem (wrong segment count, bad base64, invalid
    /// JSON, bad tag, expiry in the past) collapses to `Unauthorized`;
    /// callers learn nothing about which check failed.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenPayload> {
        let (body_b64, tag_b64) = token.split_once('.').ok_or(AuthError::Unauthorized)?;

        let body = URL_SAFE_NO_PAD
            .decode(body_b64)
            .map_err(|_| AuthError::Unauthorized)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|_| AuthError::Unauthorized)?;

        let mut mac = self.mac();
        mac.update(&body);
        // Constant-time comparison.
        mac.verify_slice(&tag).map_err(|_| AuthError::Unauthorized)?;

        let payload: TokenPayload =
            serde_json::from_slice(&body).map_err(|_| AuthError::Unauthorized)?;

        if payload.expires_at <= now {
            return Err(AuthError::Unauthorized);
        }

        Ok(payload)
    }
}
