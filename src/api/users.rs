use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::sync::Arc;

use super::validation::validate_nik;
use super::{ApiError, ApiResponse, AppState, ProfileUpdateRequest, UserDto, require_admin};
use crate::domain::Role;
use crate::models::{NewUser, User};
use crate::services::RoleUpdate;

/// GET /users
/// The whole directory, ordered by name (admin only).
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    require_admin(&user)?;

    let users = state.directory.list_all().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

#[derive(Debug, Serialize)]
pub struct ApproverListResponse {
    pub approver1: Vec<UserDto>,
    pub approver2: Vec<UserDto>,
}

/// GET /users/approvers
/// Users eligible for each approver slot, for assignment pickers (admin
/// only).
pub async fn list_approvers(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<ApproverListResponse>>, ApiError> {
    require_admin(&user)?;

    let approver1 = state.directory.list_by_role(Role::Approver1).await?;
    let approver2 = state.directory.list_by_role(Role::Approver2).await?;

    Ok(Json(ApiResponse::success(ApproverListResponse {
        approver1: approver1.into_iter().map(UserDto::from).collect(),
        approver2: approver2.into_iter().map(UserDto::from).collect(),
    })))
}

/// POST /users
/// Create a directory entry (admin only).
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<NewUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    require_admin(&user)?;
    validate_nik(&payload.nik)?;

    let created = state.directory.create(&payload).await?;
    Ok(Json(ApiResponse::success(UserDto::from(created))))
}

/// PUT /users/{nik}/role
/// Reassign role and approver references (admin only).
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(nik): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    require_admin(&user)?;
    let nik = validate_nik(&nik)?;

    let updated = state.directory.update_role(nik, &payload).await?;
    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}

/// DELETE /users/{nik}
/// Remove a directory entry (admin only). Historical requests keep their
/// owner snapshots.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(nik): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&user)?;
    let nik = validate_nik(&nik)?;

    if user.nik == nik {
        return Err(ApiError::Forbidden(
            "an admin cannot delete their own account".to_string(),
        ));
    }

    state.directory.delete(nik).await?;
    Ok(Json(ApiResponse::success(())))
}

/// PUT /profile
/// Self-service edit of display name and pickup point.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let updated = state
        .directory
        .update_profile(&user.nik, &payload.name, payload.pickup_point.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}
