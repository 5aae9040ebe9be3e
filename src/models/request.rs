use serde::Serialize;

use crate::domain::{ApprovalStatus, RequestId};

/// An overtime request with its approval sub-state.
///
/// `nik` and `name` are a snapshot of the owner taken at submission time, so
/// historical records stay intact when a user is later renamed or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct OvertimeRequest {
    pub id: RequestId,
    pub user_id: String,
    pub nik: String,
    pub name: String,
    pub category: String,
    pub category_key: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: f64,
    pub reason: String,
    pub status: ApprovalStatus,
    pub approver1_status: ApprovalStatus,
    pub approver2_status: ApprovalStatus,
    pub approver1_name: Option<String>,
    pub approver2_name: Option<String>,
    pub approver1_approved_at: Option<String>,
    pub approver2_approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
