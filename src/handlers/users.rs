// src/handlers/users.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse, UserView},
    services::users,
    utils::{
        extract::ApiJson,
        jwt::{CurrentUser, token_for},
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object with a fresh token.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 422, description = "Invalid payload, or email/username taken"),
    )
)]
pub async fn register(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    ApiJson(RegisterRequest { user: payload }): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = users::register(&pool, payload).await?;
    let token = token_for(&user, &config)?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user: UserView::new(user, token),
        }),
    ))
}

/// Authenticates a user by email and password and returns a JWT token.
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = UserResponse),
        (status = 404, description = "Unknown email or wrong password"),
        (status = 422, description = "Invalid payload"),
    )
)]
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    ApiJson(LoginRequest { user: payload }): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = users::login(&pool, payload).await?;
    let token = token_for(&user, &config)?;

    Ok(Json(UserResponse {
        user: UserView::new(user, token),
    }))
}

/// Returns the signed-in user.
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not signed in"),
    )
)]
pub async fn current_user(CurrentUser(auth): CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(UserResponse {
        user: UserView::new(auth.user, auth.token),
    }))
}

/// Updates the signed-in user. A new token is issued since the username may change.
#[utoipa::path(
    put,
    path = "/api/user",
    tag = "users",
    security(("bearer" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Invalid payload, or email/username taken"),
    )
)]
pub async fn update_user(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    CurrentUser(auth): CurrentUser,
    ApiJson(UpdateUserRequest { user: payload }): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = users::update(&pool, auth.id(), payload).await?;
    let token = token_for(&user, &config)?;

    Ok(Json(UserResponse {
        user: UserView::new(user, token),
    }))
}
