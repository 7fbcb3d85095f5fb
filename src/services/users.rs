// src/services/users.rs

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, is_unique_violation},
    models::user::{LoginUser, NewUser, UpdateUser, User},
    utils::hash::{hash_password, verify_password},
};

const TAKEN: &str = "Email or username are taken";
const BAD_CREDENTIALS: &str = "User with login or password not found";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password, bio, image, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password, bio, image, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Registers a new user.
///
/// Fails with 422 when the email or the username already belongs to someone,
/// whether that is detected up front or by the UNIQUE constraints.
pub async fn register(pool: &PgPool, payload: NewUser) -> Result<User, AppError> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 OR username = $2)",
    )
    .bind(&payload.email)
    .bind(&payload.username)
    .fetch_one(pool)
    .await?;

    if taken {
        return Err(AppError::UnprocessableEntity(TAKEN.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, password, bio, image, created_at, updated_at
        "#,
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(hashed_password)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::UnprocessableEntity(TAKEN.to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = user.id, "Registered user {}", user.username);
    Ok(user)
}

/// Authenticates by email and password.
///
/// An unknown email and a wrong password produce the same error.
pub async fn login(pool: &PgPool, payload: LoginUser) -> Result<User, AppError> {
    let user = find_by_email(pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::NotFound(BAD_CREDENTIALS.to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::NotFound(BAD_CREDENTIALS.to_string()));
    }

    Ok(user)
}

/// Applies the provided fields to the user and returns the stored result.
pub async fn update(pool: &PgPool, user_id: i64, payload: UpdateUser) -> Result<User, AppError> {
    if payload.email.is_some() || payload.username.is_some() {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE id <> $1 AND (email = $2 OR username = $3)
            )
            "#,
        )
        .bind(user_id)
        .bind(payload.email.as_deref())
        .bind(payload.username.as_deref())
        .fetch_one(pool)
        .await?;

        if taken {
            return Err(AppError::UnprocessableEntity(TAKEN.to_string()));
        }
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut separated = builder.separated(", ");
    separated.push("updated_at = NOW()");

    if let Some(email) = payload.email {
        separated.push("email = ");
        separated.push_bind_unseparated(email);
    }

    if let Some(username) = payload.username {
        separated.push("username = ");
        separated.push_bind_unseparated(username);
    }

    if let Some(password) = payload.password {
        separated.push("password = ");
        separated.push_bind_unseparated(hash_password(&password)?);
    }

    if let Some(bio) = payload.bio {
        separated.push("bio = ");
        separated.push_bind_unseparated(bio);
    }

    if let Some(image) = payload.image {
        separated.push("image = ");
        separated.push_bind_unseparated(image);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(user_id);
    builder.push(" RETURNING id, username, email, password, bio, image, created_at, updated_at");

    builder
        .build_query_as::<User>()
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::UnprocessableEntity(TAKEN.to_string())
            } else {
                tracing::error!("Failed to update user {}: {:?}", user_id, e);
                AppError::from(e)
            }
        })?
        .ok_or(AppError::NotFound("User not found".to_string()))
}
