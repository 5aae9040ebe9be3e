use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{Role, Slot};
use crate::models::{OvertimeRequest, User};

pub mod migrator;
pub mod repositories;

pub use repositories::overtime::{DecisionGuard, DecisionWrite, NewRequestRow, RequestChanges};

/// Connection pool plus repository accessors; the one handle the rest of the
/// crate talks to the database through.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn overtime_repo(&self) -> repositories::overtime::OvertimeRepository {
        repositories::overtime::OvertimeRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Directory
    // ========================================================================

    pub async fn get_user_by_nik(&self, nik: &str) -> Result<Option<User>> {
        self.user_repo().get_by_nik(nik).await
    }

    pub async fn profile_id(&self, nik: &str) -> Result<Option<String>> {
        self.user_repo().profile_id(nik).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>> {
        self.user_repo().list_by_role(role).await
    }

    pub async fn niks_with_approver(&self, approver_nik: &str, slot: Slot) -> Result<Vec<String>> {
        self.user_repo().niks_with_approver(approver_nik, slot).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_user(
        &self,
        user_id: &str,
        nik: &str,
        name: &str,
        pickup_point: Option<&str>,
        role: Role,
        approver1: Option<&str>,
        approver2: Option<&str>,
    ) -> Result<()> {
        self.user_repo()
            .insert(user_id, nik, name, pickup_point, role, approver1, approver2)
            .await
    }

    pub async fn update_user_role(
        &self,
        user_id: &str,
        role: Role,
        approver1: Option<&str>,
        approver2: Option<&str>,
    ) -> Result<bool> {
        self.user_repo()
            .update_role(user_id, role, approver1, approver2)
            .await
    }

    pub async fn update_user_profile(
        &self,
        user_id: &str,
        name: &str,
        pickup_point: Option<&str>,
    ) -> Result<bool> {
        self.user_repo()
            .update_profile(user_id, name, pickup_point)
            .await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<bool> {
        self.user_repo().delete(user_id).await
    }

    // ========================================================================
    // Overtime requests
    // ========================================================================

    pub async fn insert_request(&self, row: NewRequestRow) -> Result<OvertimeRequest> {
        self.overtime_repo().insert(row).await
    }

    pub async fn get_request(&self, id: i32) -> Result<Option<OvertimeRequest>> {
        self.overtime_repo().get(id).await
    }

    pub async fn list_requests(&self) -> Result<Vec<OvertimeRequest>> {
        self.overtime_repo().list_all().await
    }

    pub async fn list_requests_by_nik(&self, nik: &str) -> Result<Vec<OvertimeRequest>> {
        self.overtime_repo().list_by_nik(nik).await
    }

    pub async fn list_pending_requests(&self) -> Result<Vec<OvertimeRequest>> {
        self.overtime_repo().list_pending().await
    }

    pub async fn list_requests_awaiting_slot(
        &self,
        owner_niks: &[String],
        slot: Slot,
    ) -> Result<Vec<OvertimeRequest>> {
        self.overtime_repo()
            .list_awaiting_slot(owner_niks, slot)
            .await
    }

    pub async fn list_requests_in_period(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<OvertimeRequest>> {
        self.overtime_repo().list_in_period(start, end).await
    }

    pub async fn apply_decision(
        &self,
        id: i32,
        guard: DecisionGuard,
        write: DecisionWrite,
    ) -> Result<bool> {
        self.overtime_repo().apply_decision(id, guard, write).await
    }

    pub async fn update_request_fields(
        &self,
        id: i32,
        owner_nik: &str,
        changes: RequestChanges,
    ) -> Result<bool> {
        self.overtime_repo()
            .update_fields(id, owner_nik, changes)
            .await
    }

    pub async fn delete_request(&self, id: i32) -> Result<bool> {
        self.overtime_repo().delete(id).await
    }

    pub async fn delete_owned_pending_request(&self, id: i32, owner_nik: &str) -> Result<bool> {
        self.overtime_repo()
            .delete_owned_pending(id, owner_nik)
            .await
    }
}
