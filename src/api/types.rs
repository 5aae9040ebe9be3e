use serde::{Deserialize, Serialize};

use crate::domain::{ApprovalStatus, Decision, RequestId, Role};
use crate::models::{OvertimeRequest, User};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub nik: String,
    pub name: String,
    pub role: Role,
    pub approver1: Option<String>,
    pub approver2: Option<String>,
    pub pickup_point: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            nik: user.nik,
            name: user.name,
            role: user.role,
            approver1: user.approver1,
            approver2: user.approver2,
            pickup_point: user.pickup_point,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestDto {
    pub id: RequestId,
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
}

impl From<OvertimeRequest> for RequestDto {
    fn from(request: OvertimeRequest) -> Self {
        Self {
            id: request.id,
            nik: request.nik,
            name: request.name,
            category: request.category,
            category_key: request.category_key,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            duration: request.duration,
            reason: request.reason,
            status: request.status,
            approver1_status: request.approver1_status,
            approver2_status: request.approver2_status,
            approver1_name: request.approver1_name,
            approver2_name: request.approver2_name,
            approver1_approved_at: request.approver1_approved_at,
            approver2_approved_at: request.approver2_approved_at,
            created_at: request.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: String,
    pub pickup_point: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub database: bool,
    pub total_users: usize,
    pub total_requests: usize,
    pub pending_requests: usize,
}
