use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// A directory entry: identity plus role and configured approvers.
///
/// `approver1`/`approver2` hold the NIKs of the users configured to sign the
/// corresponding slot of this user's requests. Absent means no approver is
/// assigned for that slot.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub nik: String,
    pub name: String,
    pub role: Role,
    pub approver1: Option<String>,
    pub approver2: Option<String>,
    pub pickup_point: Option<String>,
}

/// Payload for an admin-created directory entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub nik: String,
    pub name: String,
    pub role: Role,
    pub approver1: Option<String>,
    pub approver2: Option<String>,
    pub pickup_point: Option<String>,
}
