use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{Role, Slot};
use crate::entities::{prelude::*, profiles, user_roles};
use crate::models::User;

/// Repository for the user/role directory.
///
/// A directory entry is split across two tables: `profiles` holds identity,
/// `user_roles` holds the role and the configured approver references.
pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Combines a profile row with its role row.
    ///
    /// A profile without a role row is treated as a plain employee with no
    /// approvers assigned, mirroring how such rows were read historically.
    fn map_user(profile: profiles::Model, role_row: Option<user_roles::Model>) -> Result<User> {
        let (role, approver1, approver2) = match role_row {
            Some(row) => {
                let role = Role::parse(&row.role)
                    .with_context(|| format!("unknown role '{}' for NIK {}", row.role, profile.nik))?;
                (role, row.approver1_nik, row.approver2_nik)
            }
            None => (Role::Employee, None, None),
        };

        Ok(User {
            nik: profile.nik,
            name: profile.name,
            role,
            approver1,
            approver2,
            pickup_point: profile.pickup_point,
        })
    }

    async fn role_row_for(&self, user_id: &str) -> Result<Option<user_roles::Model>> {
        UserRoles::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query user role")
    }

    /// Looks up a directory entry by NIK. The key is trimmed before matching.
    pub async fn get_by_nik(&self, nik: &str) -> Result<Option<User>> {
        let profile = Profiles::find()
            .filter(profiles::Column::Nik.eq(nik.trim()))
            .one(&self.conn)
            .await
            .context("Failed to query profile by NIK")?;

        let Some(profile) = profile else {
            return Ok(None);
        };

        let role_row = self.role_row_for(&profile.id).await?;
        Self::map_user(profile, role_row).map(Some)
    }

    /// The opaque profile id behind a NIK, if registered.
    pub async fn profile_id(&self, nik: &str) -> Result<Option<String>> {
        let profile = Profiles::find()
            .filter(profiles::Column::Nik.eq(nik.trim()))
            .one(&self.conn)
            .await
            .context("Failed to query profile by NIK")?;

        Ok(profile.map(|p| p.id))
    }

    /// All directory entries ordered by display name.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let profiles = Profiles::find()
            .order_by_asc(profiles::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list profiles")?;

        let roles = UserRoles::find()
            .all(&self.conn)
            .await
            .context("Failed to list user roles")?;

        profiles
            .into_iter()
            .map(|profile| {
                let role_row = roles.iter().find(|r| r.user_id == profile.id).cloned();
                Self::map_user(profile, role_row)
            })
            .collect()
    }

    /// Directory entries holding a specific role, ordered by name.
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>> {
        let rows = UserRoles::find()
            .filter(user_roles::Column::Role.eq(role.as_str()))
            .all(&self.conn)
            .await
            .context("Failed to query user roles by role")?;

        let ids: Vec<String> = rows.iter().map(|r| r.user_id.clone()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = Profiles::find()
            .filter(profiles::Column::Id.is_in(ids))
            .order_by_asc(profiles::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to query profiles for role listing")?;

        profiles
            .into_iter()
            .map(|profile| {
                let role_row = rows.iter().find(|r| r.user_id == profile.id).cloned();
                Self::map_user(profile, role_row)
            })
            .collect()
    }

    /// NIKs of every user that has `approver_nik` configured in the given
    /// slot. Used to answer "whose requests does this approver sign?".
    pub async fn niks_with_approver(&self, approver_nik: &str, slot: Slot) -> Result<Vec<String>> {
        let column = match slot {
            Slot::Approver1 => user_roles::Column::Approver1Nik,
            Slot::Approver2 => user_roles::Column::Approver2Nik,
        };

        let rows = UserRoles::find()
            .filter(column.eq(approver_nik))
            .all(&self.conn)
            .await
            .context("Failed to query supervised user roles")?;

        let ids: Vec<String> = rows.into_iter().map(|r| r.user_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = Profiles::find()
            .filter(profiles::Column::Id.is_in(ids))
            .all(&self.conn)
            .await
            .context("Failed to resolve supervised profiles")?;

        Ok(profiles.into_iter().map(|p| p.nik).collect())
    }

    /// Inserts a new profile and its role row.
    ///
    /// NIK uniqueness is enforced by the schema; the caller checks first to
    /// produce a domain error instead of a constraint violation.
    pub async fn insert(
        &self,
        user_id: &str,
        nik: &str,
        name: &str,
        pickup_point: Option<&str>,
        role: Role,
        approver1: Option<&str>,
        approver2: Option<&str>,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let profile = profiles::ActiveModel {
            id: Set(user_id.to_string()),
            nik: Set(nik.trim().to_string()),
            name: Set(name.to_string()),
            pickup_point: Set(pickup_point.map(str::to_string)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };
        profile
            .insert(&self.conn)
            .await
            .context("Failed to insert profile")?;

        let role_row = user_roles::ActiveModel {
            user_id: Set(user_id.to_string()),
            role: Set(role.as_str().to_string()),
            approver1_nik: Set(approver1.map(str::to_string)),
            approver2_nik: Set(approver2.map(str::to_string)),
            ..Default::default()
        };
        role_row
            .insert(&self.conn)
            .await
            .context("Failed to insert user role")?;

        Ok(())
    }

    /// Reassigns role and approver references for a user.
    pub async fn update_role(
        &self,
        user_id: &str,
        role: Role,
        approver1: Option<&str>,
        approver2: Option<&str>,
    ) -> Result<bool> {
        let result = UserRoles::update_many()
            .col_expr(
                user_roles::Column::Role,
                sea_orm::sea_query::Expr::value(role.as_str()),
            )
            .col_expr(
                user_roles::Column::Approver1Nik,
                sea_orm::sea_query::Expr::value(approver1.map(str::to_string)),
            )
            .col_expr(
                user_roles::Column::Approver2Nik,
                sea_orm::sea_query::Expr::value(approver2.map(str::to_string)),
            )
            .filter(user_roles::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to update user role")?;

        Ok(result.rows_affected > 0)
    }

    /// Self-service profile update: display name and pickup point only.
    pub async fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        pickup_point: Option<&str>,
    ) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = Profiles::update_many()
            .col_expr(
                profiles::Column::Name,
                sea_orm::sea_query::Expr::value(name),
            )
            .col_expr(
                profiles::Column::PickupPoint,
                sea_orm::sea_query::Expr::value(pickup_point.map(str::to_string)),
            )
            .col_expr(
                profiles::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(profiles::Column::Id.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to update profile")?;

        Ok(result.rows_affected > 0)
    }

    /// Removes the role row and the profile. Historical requests keep their
    /// NIK/name snapshots and are not touched.
    pub async fn delete(&self, user_id: &str) -> Result<bool> {
        UserRoles::delete_many()
            .filter(user_roles::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete user role")?;

        let result = Profiles::delete_many()
            .filter(profiles::Column::Id.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete profile")?;

        Ok(result.rows_affected > 0)
    }
}
