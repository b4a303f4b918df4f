//! Authentication API Endpoints
//! Mission: Login, current-user lookup, and admin user management

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, CreateUserRequest, LoginRequest, LoginResponse, User, UserResponse, UserRole},
    user_store::UserStore,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

/// Resolve the token subject against the user store
///
/// Fails with `UserNotFound` when the subject was deleted after the token
/// was issued.
pub fn resolve_user(store: &UserStore, claims: &Claims) -> Result<User, AuthApiError> {
    store
        .get_user_by_username(&claims.sub)
        .map_err(|_| AuthApiError::InternalError)?
        .ok_or(AuthApiError::UserNotFound)
}

/// Resolve the token subject and require the admin role
///
/// Mandatory before every mutating product operation.
pub fn require_admin(store: &UserStore, claims: &Claims) -> Result<User, AuthApiError> {
    let user = resolve_user(store, claims)?;
    if user.role != UserRole::Admin {
        warn!("🚫 Admin action denied for {}", user.username);
        return Err(AuthApiError::Forbidden);
    }
    Ok(user)
}

/// Login endpoint - POST /token
pub async fn login(
    State(state): State<AuthState>,
    Form(payload): Form<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", payload.username);

    let user = state
        .user_store
        .verify_credentials(&payload.username, &payload.password)
        .map_err(|_| AuthApiError::InternalError)?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", payload.username);
            AuthApiError::InvalidCredentials
        })?;

    let access_token = state
        .jwt_handler
        .generate_token(&user.username)
        .map_err(|_| AuthApiError::InternalError)?;

    info!("✅ Login successful: {} ({})", user.username, user.role.as_str());

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Get current user info - GET /userme
///
/// Re-reads the user from the store so a subject deleted after token
/// issuance yields 404.
pub async fn get_current_user(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>, AuthApiError> {
    let user = resolve_user(&state.user_store, &claims)?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// Create user - POST /users (admin only)
pub async fn create_user(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AuthApiError> {
    require_admin(&state.user_store, &claims)?;

    if payload.password.len() < 8 {
        return Err(AuthApiError::WeakPassword);
    }

    if state
        .user_store
        .get_user_by_username(&payload.username)
        .map_err(|_| AuthApiError::InternalError)?
        .is_some()
    {
        return Err(AuthApiError::UserAlreadyExists);
    }

    let user = state
        .user_store
        .create_user(
            &payload.username,
            &payload.email,
            &payload.password,
            payload.role,
        )
        .map_err(|e| {
            warn!("Failed to create user: {}", e);
            AuthApiError::InternalError
        })?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    Forbidden,
    UserNotFound,
    UserAlreadyExists,
    WeakPassword,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Incorrect username or password")
            }
            AuthApiError::Forbidden => (StatusCode::FORBIDDEN, "Not enough permissions"),
            AuthApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AuthApiError::UserAlreadyExists => (StatusCode::CONFLICT, "Username already exists"),
            AuthApiError::WeakPassword => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Password must be at least 8 characters",
            ),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
