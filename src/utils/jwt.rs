// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError, models::user::User, services, state::AppState};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    pub username: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Signs a new JWT for the user.
pub fn sign_jwt(
    id: i64,
    username: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        username: username.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Pulls the raw token out of an `Authorization` header value.
/// Both `Bearer <token>` and `Token <token>` are accepted.
pub fn extract_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    match scheme {
        "Bearer" | "Token" => Some(token),
        _ => None,
    }
}

/// An authenticated caller: the stored user plus the token they presented.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// The caller identity for a request. `None` means anonymous.
///
/// Inserted by [`identity_middleware`] on every request and taken by handlers
/// that behave differently for signed-in users (e.g. `favorited` flags).
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<AuthUser>);

impl Identity {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(AuthUser::id)
    }
}

/// Guard extractor for routes that require a signed-in user.
/// Rejects anonymous callers with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned().unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Identity::from_request_parts(parts, state).await? {
            Identity(Some(user)) => Ok(CurrentUser(user)),
            Identity(None) => Err(AppError::AuthError("Unauthorized".to_string())),
        }
    }
}

/// Axum Middleware: identity resolution.
///
/// Reads the 'Authorization' header, verifies the token and loads the user it
/// names. Missing, malformed, expired or orphaned tokens never fail the
/// request: the caller is simply anonymous. Guarded handlers reject anonymous
/// callers through the `CurrentUser` extractor.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_token)
        .map(str::to_owned);

    let identity = match token {
        Some(token) => Identity(resolve(&state, token).await),
        None => Identity(None),
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}

async fn resolve(state: &AppState, token: String) -> Option<AuthUser> {
    let claims = match verify_jwt(&token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(_) => {
            tracing::debug!("Ignoring invalid bearer token");
            return None;
        }
    };

    let user_id = claims.user_id()?;
    match services::users::find_by_id(&state.pool, user_id).await {
        Ok(Some(user)) => Some(AuthUser { user, token }),
        Ok(None) => {
            tracing::debug!("Token subject {} no longer exists", user_id);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to load token subject {}: {}", user_id, e);
            None
        }
    }
}

/// Signs a token for `user` with the configured secret and lifetime.
pub fn token_for(user: &User, config: &Config) -> Result<String, AppError> {
    sign_jwt(user.id, &user.username, &config.jwt_secret, config.jwt_expiration)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn sign_and_verify_round_trip() {
        let token = sign_jwt(42, "jake", SECRET, 60).unwrap();
        let claims = verify_jwt(&token, SECRET).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.username, "jake");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_jwt(1, "jake", SECRET, 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other-secret"),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "1".to_string(),
            username: "jake".to_string(),
            exp: 1_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn header_schemes() {
        assert_eq!(extract_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_token("Token abc.def"), Some("abc.def"));
        assert_eq!(extract_token("Basic abc"), None);
        assert_eq!(extract_token("Bearer "), None);
        assert_eq!(extract_token("abc.def"), None);
    }
}
