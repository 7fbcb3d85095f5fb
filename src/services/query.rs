// src/services/query.rs

//! Composable article queries.
//!
//! An [`ArticleQuery`] is a base relation (articles joined to their authors),
//! a list of [`ArticleFilter`] predicates and an optional [`Page`]. It compiles
//! to parameterized Postgres statements through `sqlx::QueryBuilder`, so user
//! input only ever travels as bind parameters.

use sqlx::{Postgres, QueryBuilder};

use crate::models::article::Page;

const SELECT_ARTICLES: &str = r#"
SELECT
    a.id, a.slug, a.title, a.description, a.body, a.tag_list,
    a.favorites_count, a.author_id, a.created_at, a.updated_at,
    u.username AS author_username,
    u.bio AS author_bio,
    u.image AS author_image,
    EXISTS (
        SELECT 1 FROM user_favorites vf
        WHERE vf.article_id = a.id AND vf.user_id = "#;

const SELECT_FOLLOWING: &str = r#"
    ) AS favorited,
    EXISTS (
        SELECT 1 FROM follows vw
        WHERE vw.following_id = a.author_id AND vw.follower_id = "#;

const FROM_ARTICLES: &str = r#"
    ) AS following
FROM articles a
JOIN users u ON u.id = a.author_id"#;

const COUNT_ARTICLES: &str = "SELECT COUNT(*) FROM articles a JOIN users u ON u.id = a.author_id";

/// One predicate over the article/author relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleFilter {
    /// The article's tag list contains this exact tag.
    Tag(String),
    /// Written by the user with this username.
    AuthorUsername(String),
    /// Favorited by the user with this username.
    FavoritedBy(String),
    /// Written by someone this user id follows.
    FollowedBy(i64),
    Slug(String),
}

impl ArticleFilter {
    fn push_to(&self, builder: &mut QueryBuilder<'static, Postgres>) {
        match self {
            ArticleFilter::Tag(tag) => {
                builder.push_bind(tag.clone());
                builder.push(" = ANY(a.tag_list)");
            }
            ArticleFilter::AuthorUsername(username) => {
                builder.push("u.username = ");
                builder.push_bind(username.clone());
            }
            ArticleFilter::FavoritedBy(username) => {
                builder.push(
                    "EXISTS (SELECT 1 FROM user_favorites ff \
                     JOIN users fu ON fu.id = ff.user_id \
                     WHERE ff.article_id = a.id AND fu.username = ",
                );
                builder.push_bind(username.clone());
                builder.push(")");
            }
            ArticleFilter::FollowedBy(user_id) => {
                builder.push(
                    "EXISTS (SELECT 1 FROM follows fl \
                     WHERE fl.following_id = a.author_id AND fl.follower_id = ",
                );
                builder.push_bind(*user_id);
                builder.push(")");
            }
            ArticleFilter::Slug(slug) => {
                builder.push("a.slug = ");
                builder.push_bind(slug.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    viewer: Option<i64>,
    filters: Vec<ArticleFilter>,
    page: Option<Page>,
}

impl ArticleQuery {
    /// Starts a query annotated for `viewer` (`None` for anonymous callers).
    pub fn new(viewer: Option<i64>) -> Self {
        Self {
            viewer,
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: ArticleFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a filter when `value` is present and not blank.
    pub fn filter_opt(
        self,
        value: Option<String>,
        make: impl FnOnce(String) -> ArticleFilter,
    ) -> Self {
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(v) => self.filter(make(v)),
            None => self,
        }
    }

    pub fn paginate(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    /// Page of annotated articles, newest first. Ties on `created_at`
    /// are broken by id so pagination is stable.
    pub fn select(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(SELECT_ARTICLES);
        builder.push_bind(self.viewer);
        builder.push(SELECT_FOLLOWING);
        builder.push_bind(self.viewer);
        builder.push(FROM_ARTICLES);

        push_where(&mut builder, &self.filters);

        builder.push(" ORDER BY a.created_at DESC, a.id DESC");

        if let Some(page) = self.page {
            builder.push(" LIMIT ");
            builder.push_bind(page.limit);
            builder.push(" OFFSET ");
            builder.push_bind(page.offset);
        }

        builder
    }

    /// Count over the filtered relation, ignoring pagination.
    pub fn count(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(COUNT_ARTICLES);
        push_where(&mut builder, &self.filters);
        builder
    }

    /// Count over the base relation only: no filters, no pagination.
    pub fn count_unfiltered(&self) -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(COUNT_ARTICLES)
    }
}

fn push_where(builder: &mut QueryBuilder<'static, Postgres>, filters: &[ArticleFilter]) {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        filter.push_to(builder);
    }
}
