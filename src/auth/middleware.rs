// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization middleware for Axum.
//!
//! Installed on the whole router (fallback included), so an anonymous
//! request for an unknown path is answered 401 before routing can produce
//! a 404.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/users", get(list_users))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), authorize_request))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::gate::BearerToken;
use crate::state::AppState;

/// Authorization middleware function.
///
/// On allow the principal (if any) is added to the request extensions.
pub async fn authorize_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let decision = state.gate.evaluate(
        request.method(),
        request.uri().path(),
        BearerToken::from_headers(request.headers()),
    );

    if let Some(rejection) = decision.rejection() {
        return rejection.into_response();
    }

    if let Some(principal) = decision.principal {
        request.extensions_mut().insert(principal);
    }
    next.run(request).await
}
