use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::{
    AppState,
    db::models::{ApiResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UpdateProfileRequest},
    error::AppResult,
    middleware::auth::{Claims, TokenService},
    services::{AuthService, UsersService, context::RequestContext},
    validation::ValidatedJson,
};

pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let user = AuthService::register(&mut conn, &state.config.auth(), &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(user, "User registered successfully")),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let response = AuthService::login(&mut conn, &state.tokens, &payload)?;
    Ok(Json(ApiResponse::success(response, "Login successful")))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let response = AuthService::refresh(&mut conn, &state.tokens, &payload.refresh_token)?;
    Ok(Json(ApiResponse::success(response, "Token refreshed successfully")))
}

/// Revokes the presented access token until it would have expired anyway.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    claims: Claims,
) -> AppResult<impl IntoResponse> {
    let remaining = TokenService::remaining_secs(claims.exp);
    state.auth_cache.revoke(&claims.jti, remaining).await?;
    tracing::info!(user_id = %claims.sub, "User logged out");
    Ok(Json(ApiResponse::<()>::ok("Logout successful")))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let user = AuthService::me(&mut conn, ctx.user_id)?;
    Ok(Json(ApiResponse::success(user, "Profile retrieved successfully")))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let user = {
        let mut conn = state.db.get()?;
        UsersService::update_profile(&mut conn, &state.config.auth(), &ctx, &payload)?
    };
    if let Err(e) = state.auth_cache.invalidate(ctx.user_id).await {
        tracing::warn!(user_id = %ctx.user_id, error = %e, "Failed to invalidate auth cache");
    }
    Ok(Json(ApiResponse::success(user, "Profile updated successfully")))
}
