//! Per-user and overall reporting over an inclusive date period.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::db::Store;
use crate::domain::ApprovalStatus;
use crate::models::{OvertimeRequest, OvertimeStatistics, UserSummary};
use crate::worktime;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

fn check_period(start: &str, end: &str) -> Result<(), ReportError> {
    let start_date = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|_| ReportError::Validation(format!("start must be YYYY-MM-DD, got '{start}'")))?;
    let end_date = chrono::NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .map_err(|_| ReportError::Validation(format!("end must be YYYY-MM-DD, got '{end}'")))?;

    if end_date < start_date {
        return Err(ReportError::Validation(
            "period end is before period start".to_string(),
        ));
    }
    Ok(())
}

/// Groups requests by owning NIK and rolls each group up.
///
/// Only approved requests contribute hours. Output is ordered by NIK so the
/// same request set always yields the same report.
fn summarize_by_user(requests: &[OvertimeRequest]) -> Vec<UserSummary> {
    let mut groups: BTreeMap<&str, UserSummary> = BTreeMap::new();

    for request in requests {
        let summary = groups
            .entry(request.nik.as_str())
            .or_insert_with(|| UserSummary {
                nik: request.nik.clone(),
                name: request.name.clone(),
                total_requests: 0,
                approved_requests: 0,
                rejected_requests: 0,
                pending_requests: 0,
                total_hours: 0.0,
            });

        summary.total_requests += 1;
        match request.status {
            ApprovalStatus::Approved => {
                summary.approved_requests += 1;
                summary.total_hours += request.duration;
            }
            ApprovalStatus::Rejected => summary.rejected_requests += 1,
            ApprovalStatus::Pending => summary.pending_requests += 1,
        }
    }

    groups
        .into_values()
        .map(|mut summary| {
            summary.total_hours = worktime::round_hours(summary.total_hours);
            summary
        })
        .collect()
}

/// Collapses a request set into one overall statistics row.
fn roll_up(requests: &[OvertimeRequest]) -> OvertimeStatistics {
    let mut stats = OvertimeStatistics::default();

    for request in requests {
        stats.total_requests += 1;
        match request.status {
            ApprovalStatus::Approved => {
                stats.approved_requests += 1;
                stats.total_hours += request.duration;
            }
            ApprovalStatus::Rejected => stats.rejected_requests += 1,
            ApprovalStatus::Pending => stats.pending_requests += 1,
        }
    }

    stats.total_hours = worktime::round_hours(stats.total_hours);
    stats
}

/// Read-only reporting over the request store. Idempotent for a given
/// underlying request set; runs with plain snapshot reads.
#[derive(Clone)]
pub struct ReportService {
    store: Store,
}

impl ReportService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Per-user summaries for requests dated inside the inclusive period.
    pub async fn user_summaries(
        &self,
        period_start: &str,
        period_end: &str,
    ) -> Result<Vec<UserSummary>, ReportError> {
        check_period(period_start, period_end)?;
        let requests = self
            .store
            .list_requests_in_period(period_start, period_end)
            .await?;
        Ok(summarize_by_user(&requests))
    }

    /// One roll-up across every user for the inclusive period.
    pub async fn statistics(
        &self,
        period_start: &str,
        period_end: &str,
    ) -> Result<OvertimeStatistics, ReportError> {
        check_period(period_start, period_end)?;
        let requests = self
            .store
            .list_requests_in_period(period_start, period_end)
            .await?;
        Ok(roll_up(&requests))
    }
}
