// src/services/articles.rs

use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, is_unique_violation},
    models::article::{
        Article, ArticleRow, ArticleView, ArticlesResponse, FeedParams, ListArticlesParams,
        NewArticle, Page, UpdateArticle,
    },
    services::query::{ArticleFilter, ArticleQuery},
    utils::slug::article_slug,
};

/// How many random suffixes to try before giving up on a title.
const SLUG_ATTEMPTS: usize = 5;

fn not_found() -> AppError {
    AppError::NotFound("Article not found".to_string())
}

/// Only the author may modify or delete an article.
pub fn authorize(article: &Article, user_id: i64) -> Result<(), AppError> {
    if article.author_id != user_id {
        return Err(AppError::Forbidden(
            "You are not the author of this article".to_string(),
        ));
    }
    Ok(())
}

pub async fn find_by_slug<'e>(
    executor: impl PgExecutor<'e>,
    slug: &str,
) -> Result<Option<Article>, AppError> {
    let article = sqlx::query_as::<_, Article>(
        r#"
        SELECT id, slug, title, description, body, tag_list, favorites_count,
               author_id, created_at, updated_at
        FROM articles
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(executor)
    .await?;

    Ok(article)
}

async fn fetch_view<'e>(
    executor: impl PgExecutor<'e>,
    viewer: Option<i64>,
    slug: &str,
) -> Result<ArticleView, AppError> {
    let mut builder = ArticleQuery::new(viewer)
        .filter(ArticleFilter::Slug(slug.to_string()))
        .select();

    builder
        .build_query_as::<ArticleRow>()
        .fetch_optional(executor)
        .await?
        .map(ArticleView::from)
        .ok_or_else(not_found)
}

/// Lists articles newest first, optionally filtered by tag, author and
/// favoriting user.
///
/// `articles_count` is taken over all articles before the filters apply,
/// so a filter that matches nothing still reports the global total.
pub async fn list(
    pool: &PgPool,
    viewer: Option<i64>,
    params: ListArticlesParams,
) -> Result<ArticlesResponse, AppError> {
    let query = ArticleQuery::new(viewer)
        .filter_opt(params.tag, ArticleFilter::Tag)
        .filter_opt(params.author, ArticleFilter::AuthorUsername)
        .filter_opt(params.favorited, ArticleFilter::FavoritedBy)
        .paginate(Page::new(params.limit, params.offset));

    let articles_count = query
        .count_unfiltered()
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let rows = query
        .select()
        .build_query_as::<ArticleRow>()
        .fetch_all(pool)
        .await?;

    Ok(ArticlesResponse {
        articles: rows.into_iter().map(ArticleView::from).collect(),
        articles_count,
    })
}

/// Articles written by authors the viewer follows, newest first.
pub async fn feed(
    pool: &PgPool,
    viewer: i64,
    params: FeedParams,
) -> Result<ArticlesResponse, AppError> {
    let query = ArticleQuery::new(Some(viewer))
        .filter(ArticleFilter::FollowedBy(viewer))
        .paginate(Page::new(params.limit, params.offset));

    let articles_count = query
        .count()
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let rows = query
        .select()
        .build_query_as::<ArticleRow>()
        .fetch_all(pool)
        .await?;

    Ok(ArticlesResponse {
        articles: rows.into_iter().map(ArticleView::from).collect(),
        articles_count,
    })
}

pub async fn get(pool: &PgPool, viewer: Option<i64>, slug: &str) -> Result<ArticleView, AppError> {
    fetch_view(pool, viewer, slug).await
}

/// Creates an article owned by `author_id`.
///
/// The slug column is UNIQUE; on a collision the insert is retried with a
/// fresh random suffix.
pub async fn create(
    pool: &PgPool,
    author_id: i64,
    payload: NewArticle,
) -> Result<ArticleView, AppError> {
    create_with_slugs(pool, author_id, payload, article_slug).await
}

/// `create` with the slug candidates drawn from `next_slug(title)`.
async fn create_with_slugs(
    pool: &PgPool,
    author_id: i64,
    payload: NewArticle,
    mut next_slug: impl FnMut(&str) -> String,
) -> Result<ArticleView, AppError> {
    let tags = payload.normalized_tags();

    for attempt in 1..=SLUG_ATTEMPTS {
        let slug = next_slug(&payload.title);

        let inserted = sqlx::query(
            r#"
            INSERT INTO articles (slug, title, description, body, tag_list, author_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&slug)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.body)
        .bind(&tags)
        .bind(author_id)
        .execute(pool)
        .await;

        match inserted {
            Ok(_) => {
                tracing::info!(author_id, "Created article {}", slug);
                return fetch_view(pool, Some(author_id), &slug).await;
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!("Slug collision on {} (attempt {})", slug, attempt);
            }
            Err(e) => {
                tracing::error!("Failed to create article: {:?}", e);
                return Err(e.into());
            }
        }
    }

    Err(AppError::InternalServerError(format!(
        "Could not allocate a unique slug for {:?}",
        payload.title
    )))
}

/// Updates title, description and/or body. The slug never changes.
pub async fn update(
    pool: &PgPool,
    user_id: i64,
    slug: &str,
    payload: UpdateArticle,
) -> Result<ArticleView, AppError> {
    let article = find_by_slug(pool, slug).await?.ok_or_else(not_found)?;
    authorize(&article, user_id)?;

    if !payload.is_empty() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE articles SET ");
        let mut separated = builder.separated(", ");
        separated.push("updated_at = NOW()");

        if let Some(title) = payload.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }

        if let Some(description) = payload.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }

        if let Some(body) = payload.body {
            separated.push("body = ");
            separated.push_bind_unseparated(body);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(article.id);

        builder.build().execute(pool).await.map_err(|e| {
            tracing::error!("Failed to update article {}: {:?}", article.id, e);
            AppError::from(e)
        })?;
    }

    fetch_view(pool, Some(user_id), slug).await
}

pub async fn delete(pool: &PgPool, user_id: i64, slug: &str) -> Result<(), AppError> {
    let article = find_by_slug(pool, slug).await?.ok_or_else(not_found)?;
    authorize(&article, user_id)?;

    sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(article.id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete article {}: {:?}", article.id, e);
            AppError::from(e)
        })?;

    tracing::info!(user_id, "Deleted article {}", slug);
    Ok(())
}

/// Adds the article to the user's favorites. Favoriting twice is a no-op.
///
/// The link insert and the counter bump share one transaction, and the
/// counter only moves when the link row was actually created.
pub async fn favorite(pool: &PgPool, user_id: i64, slug: &str) -> Result<ArticleView, AppError> {
    let mut tx = pool.begin().await?;

    let article = find_by_slug(&mut *tx, slug).await?.ok_or_else(not_found)?;

    let inserted = sqlx::query(
        "INSERT INTO user_favorites (user_id, article_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(article.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if inserted > 0 {
        sqlx::query("UPDATE articles SET favorites_count = favorites_count + 1 WHERE id = $1")
            .bind(article.id)
            .execute(&mut *tx)
            .await?;
    }

    let view = fetch_view(&mut *tx, Some(user_id), slug).await?;
    tx.commit().await?;

    Ok(view)
}

/// Removes the article from the user's favorites. Removing an article that
/// is not a favorite returns it unchanged.
pub async fn unfavorite(
    pool: &PgPool,
    user_id: i64,
    slug: &str,
) -> Result<ArticleView, AppError> {
    let mut tx = pool.begin().await?;

    let article = find_by_slug(&mut *tx, slug).await?.ok_or_else(not_found)?;

    let deleted = sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND article_id = $2")
        .bind(user_id)
        .bind(article.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted > 0 {
        sqlx::query(
            "UPDATE articles SET favorites_count = GREATEST(0, favorites_count - 1) WHERE id = $1",
        )
        .bind(article.id)
        .execute(&mut *tx)
        .await?;
    }

    let view = fetch_view(&mut *tx, Some(user_id), slug).await?;
    tx.commit().await?;

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_by(author_id: i64) -> Article {
        let now = chrono::Utc::now();
        Article {
            id: 1,
            slug: "hello-000001".into(),
            title: "Hello".into(),
            description: "d".into(),
            body: "b".into(),
            tag_list: vec![],
            favorites_count: 0,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn author_may_modify() {
        assert!(authorize(&article_by(5), 5).is_ok());
    }

    #[test]
    fn others_are_forbidden() {
        assert!(matches!(
            authorize(&article_by(5), 6),
            Err(AppError::Forbidden(_))
        ));
    }

    /// Connects to `DATABASE_URL` and creates a fresh author, or returns
    /// `None` when no database is configured.
    async fn pool_with_author() -> Option<(PgPool, i64)> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        };

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await
            .expect("Failed to connect to Postgres");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to migrate database");

        let name = format!("slugger_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
        let author_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password) VALUES ($1, $2, 'x') RETURNING id",
        )
        .bind(&name)
        .bind(format!("{}@example.com", name))
        .fetch_one(&pool)
        .await
        .expect("Failed to insert author");

        Some((pool, author_id))
    }

    fn new_article(title: &str) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            description: "d".to_string(),
            body: "b".to_string(),
            tag_list: None,
        }
    }

    #[tokio::test]
    async fn create_retries_after_slug_collision() {
        let Some((pool, author_id)) = pool_with_author().await else {
            return;
        };
        let stem = format!("clash-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let taken = format!("{}-000000", stem);
        let fresh = format!("{}-000001", stem);

        let first = create_with_slugs(&pool, author_id, new_article("Clash"), |_| taken.clone())
            .await
            .unwrap();
        assert_eq!(first.slug, taken);

        let mut candidates = vec![fresh.clone(), taken.clone(), taken.clone()];
        let second = create_with_slugs(&pool, author_id, new_article("Clash"), |_| {
            candidates.pop().unwrap()
        })
        .await
        .unwrap();

        assert_eq!(second.slug, fresh);
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn create_gives_up_after_bounded_attempts() {
        let Some((pool, author_id)) = pool_with_author().await else {
            return;
        };
        let taken = format!(
            "stuck-{}-000000",
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );

        create_with_slugs(&pool, author_id, new_article("Stuck"), |_| taken.clone())
            .await
            .unwrap();

        let mut attempts = 0;
        let result = create_with_slugs(&pool, author_id, new_article("Stuck"), |_| {
            attempts += 1;
            taken.clone()
        })
        .await;

        assert!(matches!(result, Err(AppError::InternalServerError(_))));
        assert_eq!(attempts, SLUG_ATTEMPTS);
    }
}
