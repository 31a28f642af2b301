// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authorize_request, Principal, Role},
    error::ApiError,
    models::{
        ChangePasswordRequest, LoginRequest, MessageResponse, RegisterUserRequest, TokenResponse,
        UserView,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod userarea;
pub mod users;

/// Build the application router.
///
/// The authorization middleware wraps every route and the fallback, so
/// routing (including 404) only happens for requests the gate allowed.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth", post(auth::authenticate))
        .route("/users", get(users::list_users))
        .route("/users/register", post(users::register_user))
        .route("/users/{id}", get(users::find_user_by_id))
        .route("/userarea/myprofile", get(userarea::my_profile))
        .route("/userarea/changepassword", put(userarea::change_password))
        .route("/health", get(health::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/v3/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authorize_request,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::authenticate,
        users::register_user,
        users::list_users,
        users::find_user_by_id,
        userarea::my_profile,
        userarea::change_password,
        health::health
    ),
    components(
        schemas(
            LoginRequest,
            TokenResponse,
            RegisterUserRequest,
            ChangePasswordRequest,
            MessageResponse,
            UserView,
            Principal,
            Role,
            health::HealthResponse,
            health::HealthChecks
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Authentication", description = "Login and token issuance"),
        (name = "Users", description = "Registration and admin user lookups"),
        (name = "User Area", description = "The caller's own account"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
