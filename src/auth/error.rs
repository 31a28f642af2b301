// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Variants stay distinct inside the process so logs can tell an expired
//! token from a forged one. Responses are uniform per status class: every
//! 401 carries the same body, whatever the underlying reason.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

const UNAUTHORIZED_MESSAGE: &str = "Full authentication is required to access this resource";
const BAD_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
const FORBIDDEN_MESSAGE: &str = "Access to this resource is denied";
const INTERNAL_MESSAGE: &str = "Internal authentication error";

/// Authentication error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Login attempt with unknown email or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,
    /// No valid bearer token on a resource that needs one
    #[error("authentication is required")]
    Unauthenticated,
    /// Authorization header is not `Bearer <token>`
    #[error("invalid authorization header format")]
    InvalidAuthHeader,
    /// Token cannot be parsed or decoded
    #[error("token is malformed")]
    MalformedToken,
    /// Signature does not verify (tampering, wrong key or wrong algorithm)
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Current time is at or past `exp`
    #[error("token has expired")]
    TokenExpired,
    /// Valid identity, role does not satisfy the resource's requirement
    #[error("insufficient permissions for this resource")]
    InsufficientPermissions,
    /// Hashing, encoding or storage failure
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl AuthError {
    /// Internal error code. Used in logs only, never sent to clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => BAD_CREDENTIALS_MESSAGE,
            AuthError::InsufficientPermissions => FORBIDDEN_MESSAGE,
            AuthError::Internal(_) => INTERNAL_MESSAGE,
            _ => UNAUTHORIZED_MESSAGE,
        }
    }

    /// Code exposed to clients; one per status class.
    pub fn public_code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "unauthorized",
            StatusCode::FORBIDDEN => "forbidden",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(ref detail) = self {
            tracing::error!(detail = %detail, "authentication failed internally");
        }
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.public_code(),
        });
        (self.status_code(), body).into_response()
    }
}
