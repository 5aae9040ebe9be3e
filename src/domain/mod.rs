//! Core domain types for the overtime workflow.
//!
//! Roles and statuses are proper enums so that every role-conditioned branch
//! in the crate is an exhaustive match; the database stores their canonical
//! string form and the repositories parse on the way out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of an overtime request.
///
/// Newtype over the auto-incrementing row id to keep request ids from mixing
/// with other integer ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(i32);

impl RequestId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for RequestId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<RequestId> for i32 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self(i32::deserialize(deserializer)?))
    }
}

/// The four roles of the flat organization hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Approver1,
    Approver2,
    Admin,
}

impl Role {
    /// Canonical string form, as stored in the `user_roles` table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Approver1 => "approver1",
            Self::Approver2 => "approver2",
            Self::Admin => "admin",
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "employee" => Some(Self::Employee),
            "approver1" => Some(Self::Approver1),
            "approver2" => Some(Self::Approver2),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether this role may act on approval decisions at all.
    #[must_use]
    pub const fn can_approve(self) -> bool {
        match self {
            Self::Employee => false,
            Self::Approver1 | Self::Approver2 | Self::Admin => true,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two independent approver decision fields on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Approver1,
    Approver2,
}

impl Slot {
    /// The slot a role acts on. Employees act on no slot; the admin override
    /// resolves the whole request and is not tied to either slot.
    #[must_use]
    pub const fn of_role(role: Role) -> Option<Self> {
        match role {
            Role::Approver1 => Some(Self::Approver1),
            Role::Approver2 => Some(Self::Approver2),
            Role::Employee | Role::Admin => None,
        }
    }
}

/// Status of the overall request or of a single approver slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Canonical string form, as stored in the `overtime_requests` table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// A terminal status accepts no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        match self {
            Self::Pending => false,
            Self::Approved | Self::Rejected => true,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an approver (or the admin override) asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// The slot/overall status this decision resolves to.
    #[must_use]
    pub const fn as_status(self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("approve"),
            Self::Reject => f.write_str("reject"),
        }
    }
}
