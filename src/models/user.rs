// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::validate_image_url;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email, used for login.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub bio: String,

    pub image: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The authenticated user as returned to its owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: String,
    pub image: String,
}

impl UserView {
    pub fn new(user: User, token: String) -> Self {
        Self {
            email: user.email,
            token,
            username: user.username,
            bio: user.bio,
            image: user.image,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: UserView,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewUser {
    #[validate(length(min = 1, max = 50, message = "username can't be blank"))]
    pub username: String,
    #[validate(
        length(min = 1, message = "email can't be blank"),
        email(message = "email is invalid")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "password can't be blank"))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub user: NewUser,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUser {
    #[validate(
        length(min = 1, message = "email can't be blank"),
        email(message = "email is invalid")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "password can't be blank"))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub user: LoginUser,
}

/// DTO for updating the current user. Fields are optional.
/// `bio` and `image` may be cleared with an empty string.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50, message = "username can't be blank"))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 128, message = "password can't be blank"))]
    pub password: Option<String>,
    pub bio: Option<String>,
    #[validate(custom(function = validate_image_url))]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub user: UpdateUser,
}
