use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;
use crate::config::AuthConfig;
use crate::db::enums::UserRole;
use crate::db::models::{User, error_codes};
use crate::db::repositories::UsersRepo;
use crate::error::{AppError, AppResult};
use crate::services::context::RequestContext;

const REFRESH_TOKEN_USE: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: u64,
    pub iat: u64,
    pub jti: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub token_use: String,
    pub exp: u64,
    pub iat: u64,
    pub jti: String,
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Issues and verifies HS256 access and refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: u64,
    refresh_ttl: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: config.access_token_expires_in,
            refresh_ttl: config.refresh_token_expires_in,
        }
    }

    pub fn access_ttl(&self) -> u64 {
        self.access_ttl
    }

    pub fn generate_access_token(&self, user: &User) -> AppResult<String> {
        let now = now_secs();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: now + self.access_ttl,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn generate_refresh_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = now_secs();
        let claims = RefreshClaims {
            sub: user_id,
            token_use: REFRESH_TOKEN_USE.to_string(),
            exp: now + self.refresh_ttl,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        Ok(decode::<Claims>(token, &self.decoding, &Validation::default())?.claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<RefreshClaims> {
        let claims = decode::<RefreshClaims>(token, &self.decoding, &Validation::default())?.claims;
        if claims.token_use != REFRESH_TOKEN_USE {
            return Err(AppError::auth("Not a refresh token"));
        }
        Ok(claims)
    }

    /// Seconds until `exp`, zero once expired.
    pub fn remaining_secs(exp: u64) -> u64 {
        exp.saturating_sub(now_secs())
    }
}

pub fn bearer_token(parts_headers: &axum::http::HeaderMap) -> Option<&str> {
    parts_headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Turns a raw access token into the caller's context: signature and expiry,
/// revocation, then the cached or freshly loaded user.
pub async fn authenticate(state: &AppState, token: &str) -> AppResult<(Claims, RequestContext)> {
    let claims = state.tokens.verify_token(token)?;

    match state.auth_cache.is_revoked(&claims.jti).await {
        Ok(true) => {
            return Err(AppError::auth_with_code(
                "Token has been revoked",
                error_codes::AUTH_TOKEN_REVOKED,
            ));
        }
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "Revocation lookup failed, continuing"),
    }

    match state.auth_cache.get_context(claims.sub).await {
        Ok(Some(ctx)) => return Ok((claims, ctx)),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Auth cache read failed, falling back to database"),
    }

    let mut conn = state.db.get()?;
    let user = UsersRepo::find_active_by_id(&mut conn, claims.sub)?
        .ok_or_else(|| AppError::auth("User not found or inactive"))?;
    let ctx = RequestContext::from(&user);

    if let Err(e) = state.auth_cache.put_context(&ctx).await {
        tracing::warn!(user_id = %ctx.user_id, error = %e, "Failed to cache auth context");
    }
    Ok((claims, ctx))
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next<axum::body::Body>,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::auth("Missing bearer token"))?
        .to_string();

    let (claims, ctx) = authenticate(&state, &token).await?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::auth("Authentication required"))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::auth("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};
    use chrono::Utc;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "unit-test-secret".into(),
            access_token_expires_in: 60,
            refresh_token_expires_in: 120,
            bcrypt_cost: 4,
            cache_ttl: 0,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            role: UserRole::Manager,
            department: None,
            manager_id: None,
            campus_access: vec!["North".into()],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let tokens = service();
        let user = user();
        let token = tokens.generate_access_token(&user).unwrap();
        let claims = tokens.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::Manager);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let tokens = service();
        let access = tokens.generate_access_token(&user()).unwrap();
        assert!(tokens.verify_refresh_token(&access).is_err());

        let refresh = tokens.generate_refresh_token(Uuid::new_v4()).unwrap();
        assert!(tokens.verify_token(&refresh).is_err());
        assert!(tokens.verify_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "someone-else".into(),
            access_token_expires_in: 60,
            refresh_token_expires_in: 60,
            bcrypt_cost: 4,
            cache_ttl: 0,
        });
        let token = other.generate_access_token(&user()).unwrap();
        assert!(service().verify_token(&token).is_err());
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
