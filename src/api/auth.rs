// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoint.

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{LoginRequest, TokenResponse},
    state::AppState,
};

/// Exchange email and password for a bearer token.
///
/// Unknown email and wrong password produce the same 401 response.
#[utoipa::path(
    post,
    path = "/auth",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let principal = state
        .verifier
        .verify(&request.email, &request.password)
        .await?;
    let issued = state.tokens.issue(&principal)?;
    Ok(Json(issued.into()))
}
