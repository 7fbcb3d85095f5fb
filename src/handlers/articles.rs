// src/handlers/articles.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::article::{
        ArticleResponse, ArticlesResponse, CreateArticleRequest, FeedParams, ListArticlesParams,
        UpdateArticleRequest,
    },
    services::articles,
    utils::{
        extract::{ApiJson, ApiQuery},
        jwt::{CurrentUser, Identity},
    },
};

/// List articles (Recent first).
/// Anonymous callers get `favorited: false` everywhere.
#[utoipa::path(
    get,
    path = "/api/articles",
    tag = "articles",
    params(ListArticlesParams),
    responses((status = 200, description = "Page of articles", body = ArticlesResponse))
)]
pub async fn list_articles(
    State(pool): State<PgPool>,
    identity: Identity,
    ApiQuery(params): ApiQuery<ListArticlesParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = articles::list(&pool, identity.user_id(), params).await?;
    Ok(Json(page))
}

/// Articles by authors the current user follows.
#[utoipa::path(
    get,
    path = "/api/articles/feed",
    tag = "articles",
    security(("bearer" = [])),
    params(FeedParams),
    responses(
        (status = 200, description = "Page of followed authors' articles", body = ArticlesResponse),
        (status = 401, description = "Not signed in"),
    )
)]
pub async fn feed_articles(
    State(pool): State<PgPool>,
    CurrentUser(auth): CurrentUser,
    ApiQuery(params): ApiQuery<FeedParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = articles::feed(&pool, auth.id(), params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    tag = "articles",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 404, description = "No such article"),
    )
)]
pub async fn get_article(
    State(pool): State<PgPool>,
    identity: Identity,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let article = articles::get(&pool, identity.user_id(), &slug).await?;
    Ok(Json(ArticleResponse { article }))
}

/// Create a new article owned by the current user.
#[utoipa::path(
    post,
    path = "/api/articles",
    tag = "articles",
    security(("bearer" = [])),
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Invalid payload"),
    )
)]
pub async fn create_article(
    State(pool): State<PgPool>,
    CurrentUser(auth): CurrentUser,
    ApiJson(CreateArticleRequest { article: payload }): ApiJson<CreateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let article = articles::create(&pool, auth.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(ArticleResponse { article })))
}

/// Update an article.
/// Requires: Login + Author.
#[utoipa::path(
    put,
    path = "/api/articles/{slug}",
    tag = "articles",
    security(("bearer" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such article"),
        (status = 422, description = "Invalid payload"),
    )
)]
pub async fn update_article(
    State(pool): State<PgPool>,
    CurrentUser(auth): CurrentUser,
    Path(slug): Path<String>,
    ApiJson(UpdateArticleRequest { article: payload }): ApiJson<UpdateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let article = articles::update(&pool, auth.id(), &slug, payload).await?;
    Ok(Json(ArticleResponse { article }))
}

/// Delete an article.
/// Requires: Login + Author.
#[utoipa::path(
    delete,
    path = "/api/articles/{slug}",
    tag = "articles",
    security(("bearer" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such article"),
    )
)]
pub async fn delete_article(
    State(pool): State<PgPool>,
    CurrentUser(auth): CurrentUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    articles::delete(&pool, auth.id(), &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/articles/{slug}/favorites",
    tag = "articles",
    security(("bearer" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article, now favorited", body = ArticleResponse),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such article"),
    )
)]
pub async fn favorite_article(
    State(pool): State<PgPool>,
    CurrentUser(auth): CurrentUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let article = articles::favorite(&pool, auth.id(), &slug).await?;
    Ok(Json(ArticleResponse { article }))
}

#[utoipa::path(
    delete,
    path = "/api/articles/{slug}/favorites",
    tag = "articles",
    security(("bearer" = [])),
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article, no longer favorited", body = ArticleResponse),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such article"),
    )
)]
pub async fn unfavorite_article(
    State(pool): State<PgPool>,
    CurrentUser(auth): CurrentUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let article = articles::unfavorite(&pool, auth.id(), &slug).await?;
    Ok(Json(ArticleResponse { article }))
}
