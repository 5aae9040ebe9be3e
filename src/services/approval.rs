//! The approval state machine.
//!
//! A request starts as `Pending(pending, pending)`. Assigned approvers each
//! own one slot; a single rejection is terminal, approval needs both slots.
//! The admin override resolves the whole request in one action. Transitions
//! are planned against a snapshot and applied with a compare-and-set update,
//! so a losing concurrent writer surfaces [`ApprovalError::StateConflict`]
//! instead of overwriting the winner.

use thiserror::Error;
use tracing::info;

use crate::db::{DecisionGuard, DecisionWrite, Store};
use crate::domain::{ApprovalStatus, Decision, RequestId, Role};
use crate::models::{OvertimeRequest, User};

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Overtime request not found")]
    NotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Decision lost a concurrent update; re-fetch and retry")]
    StateConflict,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ApprovalError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// The fully-resolved outcome of one `decide` call, before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub overall: ApprovalStatus,
    pub approver1_status: ApprovalStatus,
    pub approver2_status: ApprovalStatus,
    /// Record the actor's name/timestamp in the approver1 slot.
    pub record_approver1: bool,
    /// Record the actor's name/timestamp in the approver2 slot.
    pub record_approver2: bool,
}

/// Plans the state transition for one decision.
///
/// Pure: takes the request's current sub-state plus the actor's role and
/// decision, returns either the columns to write or the reason the action is
/// not allowed. The overall status is always recomputed here, never patched
/// separately, so a slot update without an overall recompute cannot exist.
pub fn plan_transition(
    overall: ApprovalStatus,
    approver1_status: ApprovalStatus,
    approver2_status: ApprovalStatus,
    actor_role: Role,
    decision: Decision,
) -> Result<TransitionPlan, ApprovalError> {
    if overall.is_terminal() {
        return Err(ApprovalError::Forbidden(format!(
            "request is already {overall}"
        )));
    }

    match actor_role {
        Role::Employee => Err(ApprovalError::Forbidden(
            "employees may not approve or reject requests".to_string(),
        )),

        // The override resolves the whole request and force-syncs both slots
        // so no stale pending slot is shown next to a terminal status.
        Role::Admin => {
            let resolved = decision.as_status();
            Ok(TransitionPlan {
                overall: resolved,
                approver1_status: resolved,
                approver2_status: resolved,
                record_approver1: true,
                record_approver2: true,
            })
        }

        Role::Approver1 => {
            if approver1_status.is_terminal() {
                return Err(ApprovalError::Forbidden(
                    "approver1 slot is already resolved".to_string(),
                ));
            }
            let slot = decision.as_status();
            Ok(TransitionPlan {
                overall: combine_slots(slot, approver2_status),
                approver1_status: slot,
                approver2_status,
                record_approver1: true,
                record_approver2: false,
            })
        }

        Role::Approver2 => {
            if approver2_status.is_terminal() {
                return Err(ApprovalError::Forbidden(
                    "approver2 slot is already resolved".to_string(),
                ));
            }
            let slot = decision.as_status();
            Ok(TransitionPlan {
                overall: combine_slots(approver1_status, slot),
                approver1_status,
                approver2_status: slot,
                record_approver1: false,
                record_approver2: true,
            })
        }
    }
}

/// How two slot statuses combine into the overall status: one rejection is
/// terminal on its own, approval needs both signatures.
const fn combine_slots(a1: ApprovalStatus, a2: ApprovalStatus) -> ApprovalStatus {
    match (a1, a2) {
        (ApprovalStatus::Rejected, _) | (_, ApprovalStatus::Rejected) => ApprovalStatus::Rejected,
        (ApprovalStatus::Approved, ApprovalStatus::Approved) => ApprovalStatus::Approved,
        _ => ApprovalStatus::Pending,
    }
}

/// Evaluates and applies approval decisions.
#[derive(Clone)]
pub struct ApprovalService {
    store: Store,
}

impl ApprovalService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Applies `decision` by `actor` to the request, returning the updated
    /// record.
    ///
    /// The read-plan-write cycle is guarded: the write only lands if the
    /// request still matches the snapshot the plan was made from. A guard
    /// miss on a request that still exists is a lost race
    /// ([`ApprovalError::StateConflict`], safe to retry).
    pub async fn decide(
        &self,
        id: RequestId,
        actor: &User,
        decision: Decision,
    ) -> Result<OvertimeRequest, ApprovalError> {
        let request = self
            .store
            .get_request(id.value())
            .await?
            .ok_or(ApprovalError::NotFound)?;

        let plan = plan_transition(
            request.status,
            request.approver1_status,
            request.approver2_status,
            actor.role,
            decision,
        )?;

        let now = chrono::Utc::now().to_rfc3339();
        let guard = DecisionGuard {
            approver1_status: request.approver1_status,
            approver2_status: request.approver2_status,
        };
        let write = DecisionWrite {
            status: plan.overall,
            approver1_status: plan.approver1_status,
            approver2_status: plan.approver2_status,
            approver1_name: plan.record_approver1.then(|| actor.name.clone()),
            approver2_name: plan.record_approver2.then(|| actor.name.clone()),
            approver1_approved_at: plan.record_approver1.then(|| now.clone()),
            approver2_approved_at: plan.record_approver2.then(|| now.clone()),
        };

        let applied = self.store.apply_decision(id.value(), guard, write).await?;

        if !applied {
            // The guard missed: either the row is gone or someone else
            // resolved it (or a slot of it) between our read and write.
            return match self.store.get_request(id.value()).await? {
                None => Err(ApprovalError::NotFound),
                Some(_) => Err(ApprovalError::StateConflict),
            };
        }

        info!(
            request_id = %id,
            actor = %actor.nik,
            role = %actor.role,
            decision = %decision,
            overall = %plan.overall,
            "Approval decision applied"
        );

        self.store
            .get_request(id.value())
            .await?
            .ok_or(ApprovalError::NotFound)
    }
}
