use axum::Json;

use super::ApiResponse;
use crate::categories::{self, OvertimeCategory};

/// GET /categories
/// The fixed overtime category registry, in display order.
pub async fn list() -> Json<ApiResponse<Vec<OvertimeCategory>>> {
    Json(ApiResponse::success(categories::all().to_vec()))
}
