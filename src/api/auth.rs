use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::domain::{Principal, UserId};
use crate::services::{AuthError, Registration, UserInfo};

/// Session key holding the signed-in user's id.
pub const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            username: req.username,
            password: req.password,
            confirm_password: req.confirm_password,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::PasswordMismatch => Self::validation(err.to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::DuplicateUsername | AuthError::DuplicateEmail => {
                Self::Conflict(err.to_string())
            }
            AuthError::UserNotFound => Self::Unauthorized("Not authenticated".to_string()),
            AuthError::StorageConflict(msg) => Self::storage_conflict(&msg),
        }
    }
}

// ============================================================================
// Middleware & extractors
// ============================================================================

/// Resolve the session's user into a [`Principal`] request extension.
///
/// The user row is re-read on every request, so a deleted account loses its
/// session and a demoted admin loses privileges immediately.
pub async fn load_principal(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await {
        match state.auth_service().principal_for(UserId::new(user_id)).await {
            Ok(Some(principal)) => {
                tracing::Span::current().record("user_id", principal.user_id.value());
                request.extensions_mut().insert(principal);
            }
            Ok(None) => {
                tracing::debug!(user_id, "Session user no longer exists");
                let _ = session.flush().await;
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load session user");
            }
        }
    }

    next.run(request).await
}

/// The caller's principal, if signed in.
pub struct CurrentUser(pub Option<Principal>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}

/// The caller's principal; rejects with 401 when nobody is signed in.
pub struct RequireUser(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ApiError::Unauthorized("Please sign in first".to_string()))
    }
}

async fn start_session(session: &Session, principal: &Principal) -> Result<(), ApiError> {
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;

    session
        .insert(SESSION_USER_KEY, principal.user_id.value())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let principal = match state
        .auth_service()
        .authenticate(payload.username.trim(), &payload.password)
        .await
    {
        Ok(principal) => principal,
        Err(e) => {
            tracing::info!(username = %payload.username, "Failed login attempt");
            return Err(e.into());
        }
    };

    start_session(&session, &principal).await?;
    tracing::info!(user_id = %principal.user_id, "User signed in");

    Ok(Json(ApiResponse::success(principal)))
}

/// POST /auth/register
/// Creates the account and signs it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    let principal = state.auth_service().register(payload.into()).await?;
    start_session(&session, &principal).await?;

    Ok(Json(ApiResponse::success(principal)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Signed out",
    ))))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    RequireUser(principal): RequireUser,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let info: UserInfo = state
        .auth_service()
        .get_user_info(principal.user_id)
        .await?;

    Ok(Json(ApiResponse::success(UserDto {
        id: info.id,
        name: info.name,
        email: info.email,
        username: info.username,
        is_admin: info.is_admin,
        created_at: info.created_at,
    })))
}
