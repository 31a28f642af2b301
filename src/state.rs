// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{
    AuthError, AuthorizationPolicy, CredentialVerifier, PasswordHasher, RequestGate, Role,
    TokenCodec,
};
use crate::config::{AppConfig, SeedAdmin};
use crate::models::UserRecord;
use crate::store::{StorageError, UserRepository};

/// Shared, read-only application state.
///
/// Built once at startup; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub hasher: PasswordHasher,
    pub verifier: Arc<CredentialVerifier>,
    pub tokens: Arc<TokenCodec>,
    pub gate: RequestGate,
}

impl AppState {
    pub async fn new(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        policy: AuthorizationPolicy,
    ) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new(config.bcrypt_cost);
        let verifier = CredentialVerifier::new(users.clone(), hasher).await?;
        let tokens = Arc::new(TokenCodec::new(&config.token));
        let gate = RequestGate::new(tokens.clone(), Arc::new(policy));

        Ok(Self {
            users,
            hasher,
            verifier: Arc::new(verifier),
            tokens,
            gate,
        })
    }

    /// Create a user account with a hashed password.
    pub async fn create_user(
        &self,
        nickname: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserRecord, CreateUserError> {
        let password_hash = self.hasher.hash(password).await?;
        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            nickname: nickname.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            created_at: Utc::now(),
        };
        self.users.insert(user.clone()).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "created user");
        Ok(user)
    }

    /// Create the configured admin unless an account with that email exists.
    pub async fn seed_admin(&self, seed: &SeedAdmin) -> Result<(), CreateUserError> {
        if self.users.find_by_email(&seed.email).await?.is_some() {
            tracing::info!("seed admin already present");
            return Ok(());
        }
        let nickname = seed.email.split('@').next().unwrap_or("admin");
        self.create_user(nickname, &seed.email, &seed.password, Role::Admin)
            .await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
