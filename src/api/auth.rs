use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::validate_nik;
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::models::User;

/// Session key holding the authenticated NIK.
const SESSION_NIK_KEY: &str = "nik";

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session NIK through the directory and injects the acting
/// [`User`] as a request extension. Handlers take the actor from there; there
/// is no ambient current-user state anywhere else.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let nik = match session.get::<String>(SESSION_NIK_KEY).await {
        Ok(Some(nik)) => nik,
        Ok(None) => {
            return Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response());
        }
        Err(e) => {
            return Err(ApiError::internal(format!("Session error: {e}")));
        }
    };

    // A user deleted mid-session stops authenticating on the next call.
    let Some(user) = state.directory.resolve(&nik).await? else {
        let _ = session.flush().await;
        return Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response());
    };

    tracing::Span::current().record("user_id", user.nik.as_str());
    request.extensions_mut().insert::<User>(user);

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(serde::Deserialize)]
pub struct LoginRequest {
    pub nik: String,
}

/// POST /auth/login
/// Resolves a NIK (typed in or produced by an external badge/QR reader) to a
/// directory entry and opens a session for it.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let nik = validate_nik(&payload.nik)?;

    let user = state
        .directory
        .resolve(nik)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(format!("NIK {nik} is not registered")))?;

    session
        .insert(SESSION_NIK_KEY, user.nik.clone())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(nik = %user.nik, role = %user.role, "User logged in");

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /auth/logout
/// Invalidate the current session.
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
/// The acting user, as resolved by the auth middleware.
pub async fn me(
    axum::Extension(user): axum::Extension<User>,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(user)))
}
