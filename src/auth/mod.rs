// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Email/password login, bearer token issuance, and per-request
//! authorization.
//!
//! ## Auth Flow
//!
//! 1. Client sends `POST /auth` with email and password
//! 2. `CredentialVerifier` checks them against the user store (bcrypt)
//! 3. `TokenCodec` issues an HMAC-signed JWT with `sub`, `role`, `iat`, `exp`
//! 4. Client sends `Authorization: Bearer <token>` on later requests
//! 5. `authorize_request` middleware:
//!    - validates the token (algorithm pinned, signature, then expiry)
//!    - classifies the route with `AuthorizationPolicy`
//!    - allows, or answers 401 / 403
//!
//! ## Security
//!
//! - Unmatched routes require authentication
//! - No clock skew tolerance: a token is dead at `exp`
//! - 401 responses are identical whatever the underlying reason
//! - Unknown email and wrong password are indistinguishable, in body and timing

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{Principal, TokenClaims};
pub use credentials::CredentialVerifier;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use gate::{AuthDecision, BearerToken, Outcome, RequestGate, TokenState};
pub use middleware::authorize_request;
pub use password::PasswordHasher;
pub use policy::{AuthorizationPolicy, AuthorizationRule, Requirement};
pub use roles::{Role, UnknownRole};
pub use token::{IssuedToken, TokenCodec};
