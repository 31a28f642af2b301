// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoints for the logged-in user's own account.

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{ChangePasswordRequest, MessageResponse, UserRecord, UserView},
    state::AppState,
};

async fn current_user(state: &AppState, identifier: &str) -> Result<UserRecord, ApiError> {
    state
        .users
        .find_by_email(identifier)
        .await?
        .ok_or_else(|| ApiError::not_found("User wasn't found on database"))
}

/// Get the caller's profile.
#[utoipa::path(
    get,
    path = "/userarea/myprofile",
    tag = "User Area",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = UserView),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn my_profile(
    Auth(principal): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserView>, ApiError> {
    let user = current_user(&state, &principal.identifier).await?;
    Ok(Json(UserView::from(&user)))
}

/// Change the caller's password.
///
/// Tokens issued before the change stay valid until they expire.
#[utoipa::path(
    put,
    path = "/userarea/changepassword",
    tag = "User Area",
    security(("bearer" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Old password wrong or confirmation differs"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn change_password(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = current_user(&state, &principal.identifier).await?;

    if request.new_password != request.confirmation_password {
        return Err(ApiError::bad_request("The passwords don't match"));
    }
    if !state
        .hasher
        .verify(&request.old_password, &user.password_hash)
        .await?
    {
        return Err(ApiError::bad_request("The old password is incorrect"));
    }

    let password_hash = state.hasher.hash(&request.new_password).await?;
    state.users.update_password(&user.id, password_hash).await?;

    tracing::info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}
