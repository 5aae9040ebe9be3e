use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ReportQuery};
use crate::models::{OvertimeStatistics, UserSummary};

/// GET /reports?start=YYYY-MM-DD&end=YYYY-MM-DD
/// Per-user summaries for the inclusive period.
pub async fn user_summaries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let summaries = state
        .reports
        .user_summaries(&query.start, &query.end)
        .await?;

    Ok(Json(ApiResponse::success(summaries)))
}

/// GET /reports/statistics?start=YYYY-MM-DD&end=YYYY-MM-DD
/// One roll-up across every user for the inclusive period.
pub async fn statistics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<OvertimeStatistics>>, ApiError> {
    let stats = state.reports.statistics(&query.start, &query.end).await?;

    Ok(Json(ApiResponse::success(stats)))
}
