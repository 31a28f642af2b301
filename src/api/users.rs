// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User registration and admin lookups.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{AdminOnly, Role},
    error::ApiError,
    models::{ListUsersQuery, RegisterUserRequest, UserView},
    state::{AppState, CreateUserError},
    store::StorageError,
};

/// Register a new account with the `USER` role.
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "Users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Password and confirmation differ"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    if request.password != request.confirmation_password {
        return Err(ApiError::bad_request("The passwords don't match"));
    }

    let user = state
        .create_user(&request.nickname, &request.email, &request.password, Role::User)
        .await
        .map_err(|e| match e {
            CreateUserError::Storage(StorageError::AlreadyExists(_)) => {
                ApiError::conflict("This email is already registered")
            }
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

/// List accounts, optionally filtered by role.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer" = [])),
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [UserView]),
        (status = 400, description = "Unknown role"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let role = match query.role.as_deref() {
        Some(raw) => Some(raw.parse::<Role>().map_err(|_| {
            ApiError::bad_request(format!("This parameter (role) : {{ {raw} }} is invalid"))
        })?),
        None => None,
    };

    let users = state.users.list(role).await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

/// Get one account by id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserView),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "No user with this id"),
    )
)]
pub async fn find_user_by_id(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("The user id: {id} wasn't found on database")))?;
    Ok(Json(UserView::from(&user)))
}
