use serde::Deserialize;

use crate::{
    AppState,
    error::{AppError, AppResult},
    middleware::auth::{Claims, authenticate},
    services::context::RequestContext,
};

/// Browsers cannot set headers on a websocket handshake, so the access
/// token travels as `?token=`.
#[derive(Debug, Deserialize)]
pub struct WebSocketAuthQuery {
    pub token: Option<String>,
}

impl WebSocketAuthQuery {
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Same checks as the REST middleware: signature, expiry, revocation and
/// an active account.
pub async fn authenticate_websocket(
    state: &AppState,
    query: &WebSocketAuthQuery,
) -> AppResult<(Claims, RequestContext)> {
    let token = query
        .token()
        .ok_or_else(|| AppError::auth("Missing authentication token"))?;
    authenticate(state, token).await
}
