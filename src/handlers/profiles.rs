// src/handlers/profiles.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::profile::ProfileResponse,
    services::profiles,
    utils::jwt::{CurrentUser, Identity},
};

#[utoipa::path(
    get,
    path = "/api/profiles/{username}",
    tag = "profiles",
    params(("username" = String, Path, description = "Username of the profile")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_profile(
    State(pool): State<PgPool>,
    identity: Identity,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile = profiles::get_profile(&pool, identity.user_id(), &username).await?;
    Ok(Json(ProfileResponse { profile }))
}

#[utoipa::path(
    post,
    path = "/api/profiles/{username}/follow",
    tag = "profiles",
    security(("bearer" = [])),
    params(("username" = String, Path, description = "Username to follow")),
    responses(
        (status = 200, description = "Followed profile", body = ProfileResponse),
        (status = 400, description = "Tried to follow yourself"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn follow(
    State(pool): State<PgPool>,
    CurrentUser(auth): CurrentUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile = profiles::follow(&pool, auth.id(), &username).await?;
    Ok(Json(ProfileResponse { profile }))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{username}/follow",
    tag = "profiles",
    security(("bearer" = [])),
    params(("username" = String, Path, description = "Username to unfollow")),
    responses(
        (status = 200, description = "Unfollowed profile", body = ProfileResponse),
        (status = 400, description = "Tried to unfollow yourself"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn unfollow(
    State(pool): State<PgPool>,
    CurrentUser(auth): CurrentUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile = profiles::unfollow(&pool, auth.id(), &username).await?;
    Ok(Json(ProfileResponse { profile }))
}
