// src/models/profile.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Represents the 'follows' association table.
#[derive(Debug, Clone, FromRow)]
pub struct Follow {
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Public view of a user, as seen by the (possibly anonymous) caller.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Profile {
    pub username: String,
    pub bio: String,
    pub image: String,
    /// Whether the caller follows this user. Always false for anonymous callers.
    pub following: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: Profile,
}
