// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login credential verification.

use std::sync::Arc;

use super::{AuthError, PasswordHasher, Principal};
use crate::store::UserRepository;

/// Compared against when the email is unknown, so that path costs one
/// bcrypt verification like the wrong-password path does.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

/// Checks an email/password pair against stored accounts.
pub struct CredentialVerifier {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    dummy_hash: String,
}

impl CredentialVerifier {
    pub async fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD).await?;
        Ok(Self {
            users,
            hasher,
            dummy_hash,
        })
    }

    /// Resolve the principal for a login attempt.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn verify(&self, identifier: &str, secret: &str) -> Result<Principal, AuthError> {
        let record = self
            .users
            .find_by_email(identifier)
            .await
            .map_err(|e| AuthError::Internal(format!("user lookup failed: {e}")))?;

        let Some(user) = record else {
            let _ = self.hasher.verify(secret, &self.dummy_hash).await;
            tracing::warn!(error_code = "invalid_credentials", "login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        match self.hasher.verify(secret, &user.password_hash).await {
            Ok(true) => {
                tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
                Ok(Principal::new(user.email, user.role))
            }
            Ok(false) => {
                tracing::warn!(error_code = "invalid_credentials", "login rejected");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "stored password hash is unusable");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
