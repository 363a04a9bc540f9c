//! Session establishment, validation, and revocation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clinic_core::model::User;
use clinic_core::store::ClinicStore;
use clinic_core::SoftDeletable;
use clinic_types::{PracticeBinding, Role, SessionClaims, UserId, Username};

use crate::credential::CredentialVerifier;
use crate::error::{AuthError, AuthResult};
use crate::token::{SessionToken, TokenPayload, TokenSigner};

/// Non-sensitive user fields returned alongside a fresh token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: Username,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Issues and validates session credentials against the user store.
pub struct SessionService {
    store: Arc<dyn ClinicStore>,
    signer: TokenSigner,
    verifier: Arc<dyn CredentialVerifier>,
    token_ttl: Duration,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn ClinicStore>,
        signer: TokenSigner,
        verifier: Arc<dyn CredentialVerifier>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            store,
            signer,
            verifier,
            token_ttl,
        }
    }

    /// Checks a username/credential pair and mints a session token.
    ///
    /// Unknown users, soft-deleted users, and wrong credentials all fail with
    /// the same `InvalidCredentials`. The practice binding for Doctor and
    /// Assistant roles is resolved here, once, and embedded in the token; an
    /// unresolvable profile is embedded as absent and fails closed downstream.
    pub fn authenticate(
        &self,
        username: &Username,
        credential: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<(SessionToken, UserSummary)> {
        let user = self
            .store
            .find_user_by_username(username)?
            .filter(|u| u.is_active())
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verifier.verify(credential, &user.credential_hash) {
            tracing::info!(username = %username, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let binding = self.resolve_binding(&user)?;
        let counter = self.store.revocation_counter(user.id)?;

        let payload = TokenPayload {
            user_id: user.id,
            role: user.role,
            binding,
            revocation_counter_at_issue: counter,
            expires_at: now + self.token_ttl,
        };
        let token = self.signer.mint(&payload);

        tracing::info!(user_id = %user.id, role = %user.role, "session established");
        Ok((token, UserSummary::from(&user)))
    }

    /// Validates a bearer token and returns the caller's claims.
    ///
    /// Beyond signature and expiry, the referenced user must still exist and
    /// be active, and the token's counter must equal the user's current
    /// revocation counter. The counter compare is the sole revocation
    /// mechanism: one atomic read, no token blacklist.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> AuthResult<SessionClaims> {
        let payload = self.signer.verify(token, now)?;

        let user = self
            .store
            .find_user(payload.user_id)?
            .filter(|u| u.is_active())
            .ok_or(AuthError::Unauthorized)?;

        let current = self.store.revocation_counter(user.id)?;
        if payload.revocation_counter_at_issue != current {
            tracing::info!(user_id = %user.id, "rejected token from a revoked generation");
            return Err(AuthError::Revoked);
        }

        Ok(SessionClaims {
            user_id: payload.user_id,
            role: payload.role,
            binding: payload.binding,
        })
    }

    /// Invalidates every outstanding session for a user by bumping the
    /// revocation counter. Tokens minted after this call validate normally.
    pub fn revoke_all(&self, user_id: UserId) -> AuthResult<()> {
        let new_counter = self.store.increment_revocation_counter(user_id)?;
        tracing::info!(user_id = %user_id, new_counter, "revoked all sessions");
        Ok(())
    }

    fn resolve_binding(&self, user: &User) -> AuthResult<Option<PracticeBinding>> {
        let binding = match user.role {
            Role::Doctor => self
                .store
                .find_doctor_profile_by_user(user.id)?
                .map(|profile| PracticeBinding::Practitioner {
                    profile_id: profile.id,
                }),
            Role::Assistant => self
                .store
                .find_assistant_profile_by_user(user.id)?
                .map(|profile| PracticeBinding::Assistant {
                    affiliated_doctor_id: profile.affiliated_doctor_id,
                }),
            Role::Admin | Role::Receptionist | Role::Pharmacist => None,
        };

        if binding.is_none() && matches!(user.role, Role::Doctor | Role::Assistant) {
            tracing::warn!(
                user_id = %user.id,
                role = %user.role,
                "practice role authenticated without a resolvable profile"
            );
        }

        Ok(binding)
    }
}
