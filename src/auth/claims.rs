// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the authenticated principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried in every token issued by this service.
///
/// `sub` and `exp` are registered with the validator as required claims.
/// `role` and `iat` have no serde default, so a token missing either fails
/// deserialization. Both cases are rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the principal's identifier (email)
    pub sub: String,

    /// Role at the time the token was issued
    pub role: Role,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds), exclusive
    pub exp: i64,
}

/// Authenticated identity.
///
/// Resolved from the user store at login, or from a verified token on every
/// later request. The gate places it in the request extensions; handlers
/// read it through the `Auth` extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    /// Canonical identifier (email)
    pub identifier: String,

    /// Role granted when the token was issued
    pub role: Role,
}

impl Principal {
    pub fn new(identifier: impl Into<String>, role: Role) -> Self {
        Self {
            identifier: identifier.into(),
            role,
        }
    }

    /// Check if this principal is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self {
            identifier: claims.sub,
            role: claims.role,
        }
    }
}
