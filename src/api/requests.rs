use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_request_id;
use super::{ApiError, ApiResponse, AppState, DecisionRequest, RequestDto, require_admin};
use crate::domain::RequestId;
use crate::models::User;
use crate::services::SubmitRequest;

/// POST /requests
/// Submit an overtime request for the acting user.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<RequestDto>>, ApiError> {
    let request = state.requests.submit(&user.nik, &payload).await?;
    Ok(Json(ApiResponse::success(RequestDto::from(request))))
}

/// GET /requests
/// Every request in the store (admin only).
pub async fn list_all(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<RequestDto>>>, ApiError> {
    require_admin(&user)?;

    let requests = state.requests.list_all().await?;
    Ok(Json(ApiResponse::success(
        requests.into_iter().map(RequestDto::from).collect(),
    )))
}

/// GET /requests/mine
/// The acting user's own requests, newest first.
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<RequestDto>>>, ApiError> {
    let requests = state.requests.list_for_owner(&user.nik).await?;
    Ok(Json(ApiResponse::success(
        requests.into_iter().map(RequestDto::from).collect(),
    )))
}

/// GET /requests/pending
/// Requests still awaiting the acting user's signature.
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<RequestDto>>>, ApiError> {
    let requests = state.requests.list_pending_for(&user).await?;
    Ok(Json(ApiResponse::success(
        requests.into_iter().map(RequestDto::from).collect(),
    )))
}

/// POST /requests/{id}/decision
/// Approve or reject as the acting user.
pub async fn decide(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<ApiResponse<RequestDto>>, ApiError> {
    let id = validate_request_id(id)?;

    let updated = state
        .approvals
        .decide(RequestId::new(id), &user, payload.decision)
        .await?;

    Ok(Json(ApiResponse::success(RequestDto::from(updated))))
}

/// PUT /requests/{id}
/// Owner edit while the request has not been approved.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<RequestDto>>, ApiError> {
    let id = validate_request_id(id)?;

    let updated = state
        .requests
        .update_own(RequestId::new(id), &user, &payload)
        .await?;

    Ok(Json(ApiResponse::success(RequestDto::from(updated))))
}

/// DELETE /requests/{id}
/// Admin always; the owner only while the request is still pending.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_request_id(id)?;

    state.requests.delete(RequestId::new(id), &user).await?;

    Ok(Json(ApiResponse::success(())))
}
