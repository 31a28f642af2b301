// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authorization decision.
//!
//! ```text
//! START -> TOKEN_EXTRACTED -> { NO_TOKEN | TOKEN_VALID | TOKEN_INVALID }
//!       -> CLASSIFIED -> { ALLOW | UNAUTHORIZED | FORBIDDEN }
//! ```
//!
//! | Requirement | NO_TOKEN | TOKEN_INVALID | TOKEN_VALID |
//! |-------------|----------|---------------|-------------|
//! | Public | Allow | Allow | Allow |
//! | Authenticated | 401 | 401 | Allow |
//! | Role(r) | 401 | 401 | Allow if role == r, else 403 |
//!
//! Decisions depend only on the request, the clock, the rule table and the
//! signing key, so they need no locking and carry no state between requests.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode};

use super::{AuthError, AuthorizationPolicy, Principal, Requirement, TokenCodec};

const BEARER_PREFIX: &str = "Bearer ";

/// What the `Authorization` header held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerToken<'a> {
    Absent,
    Present(&'a str),
    /// Header present but not `Bearer <token>`
    Malformed,
}

impl<'a> BearerToken<'a> {
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return BearerToken::Absent;
        };

        let Ok(value) = value.to_str() else {
            return BearerToken::Malformed;
        };

        match value.strip_prefix(BEARER_PREFIX).map(str::trim) {
            Some(token) if !token.is_empty() => BearerToken::Present(token),
            _ => BearerToken::Malformed,
        }
    }
}

/// Result of token extraction and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    NoToken,
    Valid(Principal),
    /// Reason kept for logging; it never changes the decision.
    Invalid(AuthError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    Unauthorized,
    Forbidden,
}

impl Outcome {
    /// Status the gate answers with; `None` means the handler decides.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Outcome::Allow => None,
            Outcome::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Outcome::Forbidden => Some(StatusCode::FORBIDDEN),
        }
    }
}

/// Per-request authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub outcome: Outcome,
    pub principal: Option<Principal>,
}

impl AuthDecision {
    fn allow(principal: Option<Principal>) -> Self {
        Self {
            outcome: Outcome::Allow,
            principal,
        }
    }

    fn unauthorized() -> Self {
        Self {
            outcome: Outcome::Unauthorized,
            principal: None,
        }
    }

    fn forbidden(principal: Principal) -> Self {
        Self {
            outcome: Outcome::Forbidden,
            principal: Some(principal),
        }
    }

    /// The error to answer with, if the request is denied.
    pub fn rejection(&self) -> Option<AuthError> {
        match self.outcome {
            Outcome::Allow => None,
            Outcome::Unauthorized => Some(AuthError::Unauthenticated),
            Outcome::Forbidden => Some(AuthError::InsufficientPermissions),
        }
    }
}

/// Apply the decision table.
pub fn decide(requirement: Requirement, token: TokenState) -> AuthDecision {
    match (requirement, token) {
        (Requirement::Public, TokenState::Valid(principal)) => AuthDecision::allow(Some(principal)),
        (Requirement::Public, _) => AuthDecision::allow(None),
        (Requirement::Authenticated, TokenState::Valid(principal)) => {
            AuthDecision::allow(Some(principal))
        }
        (Requirement::Role(required), TokenState::Valid(principal)) => {
            if principal.role == required {
                AuthDecision::allow(Some(principal))
            } else {
                AuthDecision::forbidden(principal)
            }
        }
        (_, TokenState::NoToken | TokenState::Invalid(_)) => AuthDecision::unauthorized(),
    }
}

/// Composes token validation and policy classification.
#[derive(Clone)]
pub struct RequestGate {
    tokens: Arc<TokenCodec>,
    policy: Arc<AuthorizationPolicy>,
}

impl RequestGate {
    pub fn new(tokens: Arc<TokenCodec>, policy: Arc<AuthorizationPolicy>) -> Self {
        Self { tokens, policy }
    }

    /// Validate the presented token, if any.
    pub fn token_state(&self, bearer: BearerToken<'_>) -> TokenState {
        match bearer {
            BearerToken::Absent => TokenState::NoToken,
            BearerToken::Malformed => TokenState::Invalid(AuthError::InvalidAuthHeader),
            BearerToken::Present(token) => match self.tokens.validate(token) {
                Ok(principal) => TokenState::Valid(principal),
                Err(e) => TokenState::Invalid(e),
            },
        }
    }

    /// Decide a request.
    pub fn evaluate(&self, method: &Method, path: &str, bearer: BearerToken<'_>) -> AuthDecision {
        let token = self.token_state(bearer);
        if let TokenState::Invalid(ref reason) = token {
            tracing::warn!(
                %method,
                path,
                error_code = reason.error_code(),
                "bearer token rejected"
            );
        }

        let requirement = self.policy.classify(method, path);
        let decision = decide(requirement, token);

        tracing::debug!(
            %method,
            path,
            ?requirement,
            outcome = ?decision.outcome,
            principal = decision.principal.as_ref().map(|p| p.identifier.as_str()),
            "authorization decision"
        );

        decision
    }
}
