//! Authentication Middleware
//! Mission: Validate bearer tokens before protected handlers run

use crate::auth::jwt::{JwtHandler, TokenError};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Auth middleware that validates JWT bearer tokens
///
/// On success the decoded claims are inserted into request extensions so
/// handlers can extract them with `Extension<Claims>`.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or(AuthError::MissingToken)?;

    let claims = jwt_handler.validate_token(&token).map_err(|e| match e {
        TokenError::Expired => AuthError::ExpiredToken,
        TokenError::Malformed => AuthError::InvalidToken,
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    ExpiredToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
