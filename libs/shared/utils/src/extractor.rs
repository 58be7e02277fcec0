use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::debug;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::jwt::validate_token;
use crate::state::AppState;

/// Resolves the bearer token into a [`shared_models::auth::User`] request extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Auth("Missing or malformed bearer token".to_string()))?;

    let user = validate_token(bearer.token(), &state.config.supabase_jwt_secret)
        .map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            AppError::Auth(e.to_string())
        })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Parses a UUID path segment, reporting a malformed value as a validation error.
pub fn parse_uuid_param(value: &str, name: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::ValidationError(format!("{} must be a UUID, got '{}'", name, value)))
}
