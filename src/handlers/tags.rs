// src/handlers/tags.rs

use axum::{Json, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

pub const TAGS: [&str; 2] = ["dragons", "coffee"];

#[derive(Debug, Serialize, ToSchema)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// Static tag list.
#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    responses((status = 200, description = "Known tags", body = TagsResponse))
)]
pub async fn list_tags() -> impl IntoResponse {
    Json(TagsResponse {
        tags: TAGS.iter().map(|t| t.to_string()).collect(),
    })
}
