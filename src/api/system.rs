use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database = state.store.ping().await.is_ok();

    let total_users = state.directory.list_all().await?.len();
    let requests = state.requests.list_all().await?;
    let pending_requests = requests
        .iter()
        .filter(|r| r.status == crate::domain::ApprovalStatus::Pending)
        .count();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database,
        total_users,
        total_requests: requests.len(),
        pending_requests,
    })))
}
