// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User record storage.
//!
//! The authentication core only depends on the [`UserRepository`] trait.
//! [`InMemoryUserStore`] backs the service and the tests; a database-backed
//! implementation can be swapped in through `AppState`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::Role;
use crate::models::UserRecord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Lookup and persistence of user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>>;

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<UserRecord>>;

    /// All users, optionally restricted to one role, oldest first.
    async fn list(&self, role: Option<Role>) -> StorageResult<Vec<UserRecord>>;

    /// Fails with `AlreadyExists` if the id or the email is taken.
    async fn insert(&self, user: UserRecord) -> StorageResult<()>;

    async fn update_password(&self, id: &str, password_hash: String) -> StorageResult<()>;
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Emails are compared case-insensitively.
fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| same_email(&u.email, email)).cloned())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn list(&self, role: Option<Role>) -> StorageResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        let mut selected: Vec<UserRecord> = users
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(selected)
    }

    async fn insert(&self, user: UserRecord) -> StorageResult<()> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
        }
        if users.values().any(|u| same_email(&u.email, &user.email)) {
            return Err(StorageError::AlreadyExists(format!(
                "User with email {}",
                user.email
            )));
        }

        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn update_password(&self, id: &str, password_hash: String) -> StorageResult<()> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) => {
                user.password_hash = password_hash;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("User {id}"))),
        }
    }
}
