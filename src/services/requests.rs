//! Submission, listing, owner edits and deletion of overtime requests.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::categories;
use crate::db::{NewRequestRow, RequestChanges, Store};
use crate::domain::{ApprovalStatus, RequestId, Role, Slot};
use crate::models::{OvertimeRequest, User};
use crate::worktime;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    Validation(String),

    #[error("Unknown overtime category: {0}")]
    UnknownCategory(String),

    #[error("No user registered for NIK {0}")]
    UserNotFound(String),

    #[error("Overtime request {0} not found")]
    NotFound(i32),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for RequestError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Raw submission fields, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub category_key: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub reason: String,
}

/// A submission that passed validation: category resolved, reason trimmed,
/// duration computed from the submitted times.
#[derive(Debug, Clone)]
struct ValidSubmission {
    category_name: String,
    category_key: String,
    date: String,
    start_time: String,
    end_time: String,
    duration: f64,
    reason: String,
}

/// Validates submission fields and computes the duration.
///
/// The duration always comes from the submitted times; the category's default
/// window is only a UI convenience and is not consulted here.
fn validate_submission(input: &SubmitRequest) -> Result<ValidSubmission, RequestError> {
    let category = categories::lookup(&input.category_key)
        .ok_or_else(|| RequestError::UnknownCategory(input.category_key.clone()))?;

    if chrono::NaiveDate::parse_from_str(&input.date, "%Y-%m-%d").is_err() {
        return Err(RequestError::Validation(format!(
            "date must be YYYY-MM-DD, got '{}'",
            input.date
        )));
    }

    if worktime::time_to_minutes(&input.start_time).is_none() {
        return Err(RequestError::Validation(format!(
            "start time must be HH:MM, got '{}'",
            input.start_time
        )));
    }
    if worktime::time_to_minutes(&input.end_time).is_none() {
        return Err(RequestError::Validation(format!(
            "end time must be HH:MM, got '{}'",
            input.end_time
        )));
    }

    let duration = worktime::calculate_duration(&input.start_time, &input.end_time)
        .map(worktime::round_hours)
        .unwrap_or(0.0);
    if duration <= 0.0 {
        return Err(RequestError::Validation(
            "end time must differ from start time".to_string(),
        ));
    }

    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(RequestError::Validation("reason is required".to_string()));
    }

    Ok(ValidSubmission {
        category_name: category.name.to_string(),
        category_key: category.key.to_string(),
        date: input.date.clone(),
        start_time: input.start_time.clone(),
        end_time: input.end_time.clone(),
        duration,
        reason: reason.to_string(),
    })
}

/// Request store operations, gated by the acting user.
#[derive(Clone)]
pub struct RequestService {
    store: Store,
}

impl RequestService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Submits a new request for `owner_nik`, entering the workflow as
    /// `Pending(pending, pending)`.
    pub async fn submit(
        &self,
        owner_nik: &str,
        input: &SubmitRequest,
    ) -> Result<OvertimeRequest, RequestError> {
        let valid = validate_submission(input)?;

        let owner = self
            .store
            .get_user_by_nik(owner_nik)
            .await?
            .ok_or_else(|| RequestError::UserNotFound(owner_nik.trim().to_string()))?;
        let user_id = self
            .store
            .profile_id(&owner.nik)
            .await?
            .ok_or_else(|| RequestError::UserNotFound(owner.nik.clone()))?;

        let request = self
            .store
            .insert_request(NewRequestRow {
                user_id,
                nik: owner.nik.clone(),
                name: owner.name.clone(),
                category: valid.category_name,
                category_key: valid.category_key,
                date: valid.date,
                start_time: valid.start_time,
                end_time: valid.end_time,
                duration: valid.duration,
                reason: valid.reason,
            })
            .await?;

        info!(
            request_id = %request.id,
            nik = %request.nik,
            category = %request.category_key,
            duration = request.duration,
            "Overtime request submitted"
        );

        Ok(request)
    }

    /// Every request, newest first.
    pub async fn list_all(&self) -> Result<Vec<OvertimeRequest>, RequestError> {
        Ok(self.store.list_requests().await?)
    }

    /// Requests owned by a NIK, newest first.
    pub async fn list_for_owner(&self, nik: &str) -> Result<Vec<OvertimeRequest>, RequestError> {
        Ok(self.store.list_requests_by_nik(nik).await?)
    }

    /// Requests still awaiting the acting user's signature.
    ///
    /// An approver sees requests of the users that have them configured in
    /// the matching slot, and only while that slot is unresolved. The admin
    /// sees every overall-pending request. Employees approve nothing.
    pub async fn list_pending_for(
        &self,
        actor: &User,
    ) -> Result<Vec<OvertimeRequest>, RequestError> {
        match actor.role {
            Role::Employee => Ok(Vec::new()),
            Role::Admin => Ok(self.store.list_pending_requests().await?),
            Role::Approver1 => self.pending_for_slot(&actor.nik, Slot::Approver1).await,
            Role::Approver2 => self.pending_for_slot(&actor.nik, Slot::Approver2).await,
        }
    }

    async fn pending_for_slot(
        &self,
        approver_nik: &str,
        slot: Slot,
    ) -> Result<Vec<OvertimeRequest>, RequestError> {
        let owner_niks = self.store.niks_with_approver(approver_nik, slot).await?;
        Ok(self
            .store
            .list_requests_awaiting_slot(&owner_niks, slot)
            .await?)
    }

    pub async fn get(&self, id: RequestId) -> Result<OvertimeRequest, RequestError> {
        self.store
            .get_request(id.value())
            .await?
            .ok_or(RequestError::NotFound(id.value()))
    }

    /// Owner edit while the request has not been approved.
    ///
    /// Approved requests are immutable; pending and rejected ones may be
    /// corrected and resubmitted into the same workflow record.
    pub async fn update_own(
        &self,
        id: RequestId,
        actor: &User,
        input: &SubmitRequest,
    ) -> Result<OvertimeRequest, RequestError> {
        let existing = self.get(id).await?;

        if existing.nik != actor.nik {
            return Err(RequestError::Forbidden(
                "only the owner may edit a request".to_string(),
            ));
        }
        if existing.status == ApprovalStatus::Approved {
            return Err(RequestError::Forbidden(
                "approved requests are immutable".to_string(),
            ));
        }

        let valid = validate_submission(input)?;

        let updated = self
            .store
            .update_request_fields(
                id.value(),
                &actor.nik,
                RequestChanges {
                    category: valid.category_name,
                    category_key: valid.category_key,
                    date: valid.date,
                    start_time: valid.start_time,
                    end_time: valid.end_time,
                    duration: valid.duration,
                    reason: valid.reason,
                },
            )
            .await?;

        if !updated {
            // The row changed under us: gone, or approved in between.
            return match self.store.get_request(id.value()).await? {
                None => Err(RequestError::NotFound(id.value())),
                Some(_) => Err(RequestError::Forbidden(
                    "request is no longer editable".to_string(),
                )),
            };
        }

        self.get(id).await
    }

    /// Deletes a request: admin always, the owner only while still pending.
    pub async fn delete(&self, id: RequestId, actor: &User) -> Result<(), RequestError> {
        let existing = self.get(id).await?;

        match actor.role {
            Role::Admin => {
                self.store.delete_request(id.value()).await?;
            }
            Role::Employee | Role::Approver1 | Role::Approver2 => {
                if existing.nik != actor.nik {
                    return Err(RequestError::Forbidden(
                        "only the owner or an admin may delete a request".to_string(),
                    ));
                }
                if existing.status != ApprovalStatus::Pending {
                    return Err(RequestError::Forbidden(
                        "only pending requests can be deleted by their owner".to_string(),
                    ));
                }
                let deleted = self
                    .store
                    .delete_owned_pending_request(id.value(), &actor.nik)
                    .await?;
                if !deleted {
                    // Resolved between our read and the delete.
                    return Err(RequestError::Forbidden(
                        "request is no longer pending".to_string(),
                    ));
                }
            }
        }

        info!(request_id = %id, actor = %actor.nik, "Overtime request deleted");
        Ok(())
    }
}
