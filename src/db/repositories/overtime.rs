use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{ApprovalStatus, RequestId, Slot};
use crate::entities::{overtime_requests, prelude::*};
use crate::models::OvertimeRequest;

/// Column values for a brand-new request row.
///
/// The initial approval sub-state is always `pending/pending/pending`; the
/// repository sets it, not the caller.
#[derive(Debug, Clone)]
pub struct NewRequestRow {
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
}

/// Snapshot a decision was planned against. The guarded update only applies
/// while the row still matches, so two racing approvers cannot both win.
#[derive(Debug, Clone, Copy)]
pub struct DecisionGuard {
    pub approver1_status: ApprovalStatus,
    pub approver2_status: ApprovalStatus,
}

/// Columns written by an approval transition. `None` name/timestamp fields
/// leave the stored value untouched.
#[derive(Debug, Clone)]
pub struct DecisionWrite {
    pub status: ApprovalStatus,
    pub approver1_status: ApprovalStatus,
    pub approver2_status: ApprovalStatus,
    pub approver1_name: Option<String>,
    pub approver2_name: Option<String>,
    pub approver1_approved_at: Option<String>,
    pub approver2_approved_at: Option<String>,
}

/// Fields an owner may still change while the request is not approved.
#[derive(Debug, Clone)]
pub struct RequestChanges {
    pub category: String,
    pub category_key: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: f64,
    pub reason: String,
}

/// Repository for overtime request rows and their approval sub-state.
pub struct OvertimeRepository {
    conn: DatabaseConnection,
}

impl OvertimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(row: overtime_requests::Model) -> Result<OvertimeRequest> {
        let status = ApprovalStatus::parse(&row.status)
            .with_context(|| format!("unknown status '{}' on request {}", row.status, row.id))?;
        let approver1_status = ApprovalStatus::parse(&row.approver1_status).with_context(|| {
            format!(
                "unknown approver1 status '{}' on request {}",
                row.approver1_status, row.id
            )
        })?;
        let approver2_status = ApprovalStatus::parse(&row.approver2_status).with_context(|| {
            format!(
                "unknown approver2 status '{}' on request {}",
                row.approver2_status, row.id
            )
        })?;

        Ok(OvertimeRequest {
            id: RequestId::new(row.id),
            user_id: row.user_id,
            nik: row.nik,
            name: row.name,
            category: row.category,
            category_key: row.category_key,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            duration: row.duration,
            reason: row.reason,
            status,
            approver1_status,
            approver2_status,
            approver1_name: row.approver1_name,
            approver2_name: row.approver2_name,
            approver1_approved_at: row.approver1_approved_at,
            approver2_approved_at: row.approver2_approved_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn map_all(rows: Vec<overtime_requests::Model>) -> Result<Vec<OvertimeRequest>> {
        rows.into_iter().map(Self::map_model).collect()
    }

    /// Inserts a new request in the initial pending state and returns it.
    pub async fn insert(&self, row: NewRequestRow) -> Result<OvertimeRequest> {
        let now = chrono::Utc::now().to_rfc3339();
        let pending = ApprovalStatus::Pending.as_str().to_string();

        let active = overtime_requests::ActiveModel {
            user_id: Set(row.user_id),
            nik: Set(row.nik),
            name: Set(row.name),
            category: Set(row.category),
            category_key: Set(row.category_key),
            date: Set(row.date),
            start_time: Set(row.start_time),
            end_time: Set(row.end_time),
            duration: Set(row.duration),
            reason: Set(row.reason),
            status: Set(pending.clone()),
            approver1_status: Set(pending.clone()),
            approver2_status: Set(pending),
            approver1_name: Set(None),
            approver2_name: Set(None),
            approver1_approved_at: Set(None),
            approver2_approved_at: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = OvertimeRequests::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert overtime request")?;

        self.get(result.last_insert_id)
            .await?
            .context("Inserted overtime request vanished")
    }

    pub async fn get(&self, id: i32) -> Result<Option<OvertimeRequest>> {
        let row = OvertimeRequests::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query overtime request")?;

        row.map(Self::map_model).transpose()
    }

    /// Every request, newest first.
    pub async fn list_all(&self) -> Result<Vec<OvertimeRequest>> {
        let rows = OvertimeRequests::find()
            .order_by_desc(overtime_requests::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list overtime requests")?;

        Self::map_all(rows)
    }

    /// Requests owned by a NIK, newest first.
    pub async fn list_by_nik(&self, nik: &str) -> Result<Vec<OvertimeRequest>> {
        let rows = OvertimeRequests::find()
            .filter(overtime_requests::Column::Nik.eq(nik))
            .order_by_desc(overtime_requests::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list overtime requests by NIK")?;

        Self::map_all(rows)
    }

    /// Every request whose overall status is still pending, oldest first so
    /// approvers work the queue in submission order.
    pub async fn list_pending(&self) -> Result<Vec<OvertimeRequest>> {
        let rows = OvertimeRequests::find()
            .filter(overtime_requests::Column::Status.eq(ApprovalStatus::Pending.as_str()))
            .order_by_asc(overtime_requests::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list pending overtime requests")?;

        Self::map_all(rows)
    }

    /// Pending requests owned by any of `owner_niks` that are still awaiting
    /// the given slot.
    pub async fn list_awaiting_slot(
        &self,
        owner_niks: &[String],
        slot: Slot,
    ) -> Result<Vec<OvertimeRequest>> {
        if owner_niks.is_empty() {
            return Ok(Vec::new());
        }

        let slot_column = match slot {
            Slot::Approver1 => overtime_requests::Column::Approver1Status,
            Slot::Approver2 => overtime_requests::Column::Approver2Status,
        };

        let rows = OvertimeRequests::find()
            .filter(overtime_requests::Column::Nik.is_in(owner_niks.iter().cloned()))
            .filter(overtime_requests::Column::Status.eq(ApprovalStatus::Pending.as_str()))
            .filter(slot_column.eq(ApprovalStatus::Pending.as_str()))
            .order_by_asc(overtime_requests::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list requests awaiting a slot")?;

        Self::map_all(rows)
    }

    /// Requests whose date falls inside the inclusive period. Dates are ISO
    /// `YYYY-MM-DD` strings, so the range filter compares correctly.
    pub async fn list_in_period(&self, start: &str, end: &str) -> Result<Vec<OvertimeRequest>> {
        let rows = OvertimeRequests::find()
            .filter(overtime_requests::Column::Date.between(start, end))
            .order_by_asc(overtime_requests::Column::Date)
            .all(&self.conn)
            .await
            .context("Failed to list overtime requests in period")?;

        Self::map_all(rows)
    }

    /// Applies a planned approval transition with a compare-and-set guard.
    ///
    /// The update only fires while the overall status is still `pending` AND
    /// both slot statuses match the snapshot the transition was planned
    /// against. Returns `false` when the guard misses (the caller decides
    /// between `NotFound` and a lost race).
    pub async fn apply_decision(
        &self,
        id: i32,
        guard: DecisionGuard,
        write: DecisionWrite,
    ) -> Result<bool> {
        use sea_orm::sea_query::Expr;

        let now = chrono::Utc::now().to_rfc3339();

        let mut update = OvertimeRequests::update_many()
            .col_expr(
                overtime_requests::Column::Status,
                Expr::value(write.status.as_str()),
            )
            .col_expr(
                overtime_requests::Column::Approver1Status,
                Expr::value(write.approver1_status.as_str()),
            )
            .col_expr(
                overtime_requests::Column::Approver2Status,
                Expr::value(write.approver2_status.as_str()),
            )
            .col_expr(overtime_requests::Column::UpdatedAt, Expr::value(now));

        if let Some(name) = write.approver1_name {
            update = update.col_expr(overtime_requests::Column::Approver1Name, Expr::value(name));
        }
        if let Some(name) = write.approver2_name {
            update = update.col_expr(overtime_requests::Column::Approver2Name, Expr::value(name));
        }
        if let Some(at) = write.approver1_approved_at {
            update = update.col_expr(
                overtime_requests::Column::Approver1ApprovedAt,
                Expr::value(at),
            );
        }
        if let Some(at) = write.approver2_approved_at {
            update = update.col_expr(
                overtime_requests::Column::Approver2ApprovedAt,
                Expr::value(at),
            );
        }

        let result = update
            .filter(overtime_requests::Column::Id.eq(id))
            .filter(overtime_requests::Column::Status.eq(ApprovalStatus::Pending.as_str()))
            .filter(
                overtime_requests::Column::Approver1Status.eq(guard.approver1_status.as_str()),
            )
            .filter(
                overtime_requests::Column::Approver2Status.eq(guard.approver2_status.as_str()),
            )
            .exec(&self.conn)
            .await
            .context("Failed to apply approval decision")?;

        Ok(result.rows_affected > 0)
    }

    /// Owner edit of a not-yet-approved request. Guarded at the row level so
    /// an approval landing in between cannot be overwritten.
    pub async fn update_fields(
        &self,
        id: i32,
        owner_nik: &str,
        changes: RequestChanges,
    ) -> Result<bool> {
        use sea_orm::sea_query::Expr;

        let now = chrono::Utc::now().to_rfc3339();

        let result = OvertimeRequests::update_many()
            .col_expr(
                overtime_requests::Column::Category,
                Expr::value(changes.category),
            )
            .col_expr(
                overtime_requests::Column::CategoryKey,
                Expr::value(changes.category_key),
            )
            .col_expr(overtime_requests::Column::Date, Expr::value(changes.date))
            .col_expr(
                overtime_requests::Column::StartTime,
                Expr::value(changes.start_time),
            )
            .col_expr(
                overtime_requests::Column::EndTime,
                Expr::value(changes.end_time),
            )
            .col_expr(
                overtime_requests::Column::Duration,
                Expr::value(changes.duration),
            )
            .col_expr(
                overtime_requests::Column::Reason,
                Expr::value(changes.reason),
            )
            .col_expr(overtime_requests::Column::UpdatedAt, Expr::value(now))
            .filter(overtime_requests::Column::Id.eq(id))
            .filter(overtime_requests::Column::Nik.eq(owner_nik))
            .filter(overtime_requests::Column::Status.ne(ApprovalStatus::Approved.as_str()))
            .exec(&self.conn)
            .await
            .context("Failed to update overtime request")?;

        Ok(result.rows_affected > 0)
    }

    /// Unconditional delete (admin path).
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = OvertimeRequests::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete overtime request")?;

        Ok(result.rows_affected > 0)
    }

    /// Owner delete, allowed only while the request is still pending.
    pub async fn delete_owned_pending(&self, id: i32, owner_nik: &str) -> Result<bool> {
        let result = OvertimeRequests::delete_many()
            .filter(overtime_requests::Column::Id.eq(id))
            .filter(overtime_requests::Column::Nik.eq(owner_nik))
            .filter(overtime_requests::Column::Status.eq(ApprovalStatus::Pending.as_str()))
            .exec(&self.conn)
            .await
            .context("Failed to delete pending overtime request")?;

        Ok(result.rows_affected > 0)
    }
}
