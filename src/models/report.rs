use serde::Serialize;

/// Per-user roll-up of requests whose date falls inside a report period.
///
/// `total_hours` counts approved requests only; pending and rejected ones
/// contribute zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub nik: String,
    pub name: String,
    pub total_requests: u32,
    pub approved_requests: u32,
    pub rejected_requests: u32,
    pub pending_requests: u32,
    pub total_hours: f64,
}

/// The same roll-up collapsed across every user in the period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OvertimeStatistics {
    pub total_requests: u32,
    pub approved_requests: u32,
    pub rejected_requests: u32,
    pub pending_requests: u32,
    pub total_hours: f64,
}
