// src/services/profiles.rs

use sqlx::PgPool;

use crate::{
    error::AppError,
    models::profile::{Follow, Profile},
};

/// Looks up a profile by username, computing `following` for the viewer.
pub async fn get_profile(
    pool: &PgPool,
    viewer: Option<i64>,
    username: &str,
) -> Result<Profile, AppError> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT
            u.username, u.bio, u.image,
            EXISTS (
                SELECT 1 FROM follows f
                WHERE f.follower_id = $2 AND f.following_id = u.id
            ) AS following
        FROM users u
        WHERE u.username = $1
        "#,
    )
    .bind(username)
    .bind(viewer)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

async fn user_id_by_username(pool: &PgPool, username: &str) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Makes `follower_id` follow `username`. Following twice is a no-op.
pub async fn follow(pool: &PgPool, follower_id: i64, username: &str) -> Result<Profile, AppError> {
    let following_id = user_id_by_username(pool, username).await?;

    if following_id == follower_id {
        return Err(AppError::BadRequest(
            "Follower and following can't be equal".to_string(),
        ));
    }

    let created = sqlx::query_as::<_, Follow>(
        r#"
        INSERT INTO follows (follower_id, following_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        RETURNING follower_id, following_id, created_at
        "#,
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_optional(pool)
    .await?;

    if let Some(follow) = created {
        tracing::info!(
            follower_id = follow.follower_id,
            following_id = follow.following_id,
            "Follow created"
        );
    }

    get_profile(pool, Some(follower_id), username).await
}

/// Stops `follower_id` following `username`. Unfollowing a stranger is a no-op.
pub async fn unfollow(
    pool: &PgPool,
    follower_id: i64,
    username: &str,
) -> Result<Profile, AppError> {
    let following_id = user_id_by_username(pool, username).await?;

    if following_id == follower_id {
        return Err(AppError::BadRequest(
            "Follower and following can't be equal".to_string(),
        ));
    }

    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;

    get_profile(pool, Some(follower_id), username).await
}
