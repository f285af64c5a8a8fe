use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::error::AppError;
use crate::rbac::{Action, is_allowed};
use crate::services::context::RequestContext;

/// Route-level role gate. Runs after `auth_middleware`, so a missing context
/// means the route was mounted without authentication.
pub async fn enforce(
    State(action): State<Action>,
    request: Request<Body>,
    next: Next<Body>,
) -> Result<Response, AppError> {
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .ok_or_else(|| AppError::auth("Authentication required"))?;

    if !is_allowed(ctx.role, action) {
        tracing::info!(
            user_id = %ctx.user_id,
            role = %ctx.role,
            action = %action,
            "Request denied by role policy"
        );
        return Err(AppError::forbidden(format!(
            "Role {} may not perform {}",
            ctx.role, action
        )));
    }

    Ok(next.run(request).await)
}
