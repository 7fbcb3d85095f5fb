// src/docs.rs

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{articles, profiles, tags, users},
    models::{
        article::{
            ArticleResponse, ArticleView, ArticlesResponse, CreateArticleRequest, NewArticle,
            UpdateArticle, UpdateArticleRequest,
        },
        profile::{Profile, ProfileResponse},
        user::{
            LoginRequest, LoginUser, NewUser, RegisterRequest, UpdateUser, UpdateUserRequest,
            UserResponse, UserView,
        },
    },
};

/// OpenAPI document served next to the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    info(title = "Conduit API", description = "Articles, profiles and feeds"),
    paths(
        users::register,
        users::login,
        users::current_user,
        users::update_user,
        profiles::get_profile,
        profiles::follow,
        profiles::unfollow,
        articles::list_articles,
        articles::feed_articles,
        articles::get_article,
        articles::create_article,
        articles::update_article,
        articles::delete_article,
        articles::favorite_article,
        articles::unfavorite_article,
        tags::list_tags,
    ),
    components(schemas(
        UserView,
        UserResponse,
        NewUser,
        RegisterRequest,
        LoginUser,
        LoginRequest,
        UpdateUser,
        UpdateUserRequest,
        Profile,
        ProfileResponse,
        ArticleView,
        ArticleResponse,
        ArticlesResponse,
        NewArticle,
        CreateArticleRequest,
        UpdateArticle,
        UpdateArticleRequest,
        tags::TagsResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration, login and the current user"),
        (name = "profiles", description = "Public profiles and following"),
        (name = "articles", description = "Articles, favorites and feeds"),
        (name = "tags", description = "Tags"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/users",
            "/api/users/login",
            "/api/user",
            "/api/profiles/{username}",
            "/api/profiles/{username}/follow",
            "/api/articles",
            "/api/articles/feed",
            "/api/articles/{slug}",
            "/api/articles/{slug}/favorites",
            "/api/tags",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }
}
