//! The user/role directory: identity, role assignment and the approver
//! hierarchy invariants.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::db::Store;
use crate::domain::Role;
use crate::models::{NewUser, User};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Validation(String),

    #[error("NIK {0} is already registered")]
    DuplicateNik(String),

    #[error("Invalid approver hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("No user registered for NIK {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for DirectoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Admin payload for reassigning a user's role and approver references.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
    pub approver1: Option<String>,
    pub approver2: Option<String>,
}

/// Structural hierarchy rules that need no lookups.
///
/// - nobody is their own approver;
/// - an approver1 user never has an approver1 superior and must have an
///   approver2 (business rule: approver2 is mandatory one level up);
/// - approver2 and admin users reference no superior;
/// - employees may carry any combination.
fn check_structure(
    nik: &str,
    role: Role,
    approver1: Option<&str>,
    approver2: Option<&str>,
) -> Result<(), DirectoryError> {
    if approver1 == Some(nik) || approver2 == Some(nik) {
        return Err(DirectoryError::InvalidHierarchy(
            "a user cannot be their own approver".to_string(),
        ));
    }

    match role {
        Role::Employee => Ok(()),
        Role::Approver1 => {
            if approver1.is_some() {
                return Err(DirectoryError::InvalidHierarchy(
                    "an approver1 user cannot reference another approver1".to_string(),
                ));
            }
            if approver2.is_none() {
                return Err(DirectoryError::InvalidHierarchy(
                    "an approver2 reference is mandatory for approver1 users".to_string(),
                ));
            }
            Ok(())
        }
        Role::Approver2 | Role::Admin => {
            if approver1.is_some() || approver2.is_some() {
                return Err(DirectoryError::InvalidHierarchy(format!(
                    "{role} users reference no superior"
                )));
            }
            Ok(())
        }
    }
}

/// Directory operations over profiles and role rows.
#[derive(Clone)]
pub struct DirectoryService {
    store: Store,
}

impl DirectoryService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolves a NIK to a directory entry. This is the identity resolver the
    /// login path uses; whatever produced the NIK string (manual entry, an
    /// external QR decode) is outside this service.
    pub async fn resolve(&self, nik: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.store.get_user_by_nik(nik).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<User>, DirectoryError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, DirectoryError> {
        Ok(self.store.list_users_by_role(role).await?)
    }

    /// Referenced approvers must exist and hold the role matching their slot.
    async fn check_references(
        &self,
        approver1: Option<&str>,
        approver2: Option<&str>,
    ) -> Result<(), DirectoryError> {
        if let Some(nik) = approver1 {
            let user = self.resolve(nik).await?.ok_or_else(|| {
                DirectoryError::InvalidHierarchy(format!("approver1 reference '{nik}' not found"))
            })?;
            if user.role != Role::Approver1 {
                return Err(DirectoryError::InvalidHierarchy(format!(
                    "'{nik}' holds role {} and cannot fill the approver1 slot",
                    user.role
                )));
            }
        }

        if let Some(nik) = approver2 {
            let user = self.resolve(nik).await?.ok_or_else(|| {
                DirectoryError::InvalidHierarchy(format!("approver2 reference '{nik}' not found"))
            })?;
            if user.role != Role::Approver2 {
                return Err(DirectoryError::InvalidHierarchy(format!(
                    "'{nik}' holds role {} and cannot fill the approver2 slot",
                    user.role
                )));
            }
        }

        Ok(())
    }

    /// Creates a directory entry (admin action).
    pub async fn create(&self, new_user: &NewUser) -> Result<User, DirectoryError> {
        let nik = new_user.nik.trim();
        if nik.is_empty() {
            return Err(DirectoryError::Validation("NIK is required".to_string()));
        }
        let name = new_user.name.trim();
        if name.is_empty() {
            return Err(DirectoryError::Validation("name is required".to_string()));
        }

        if self.resolve(nik).await?.is_some() {
            return Err(DirectoryError::DuplicateNik(nik.to_string()));
        }

        check_structure(
            nik,
            new_user.role,
            new_user.approver1.as_deref(),
            new_user.approver2.as_deref(),
        )?;
        self.check_references(new_user.approver1.as_deref(), new_user.approver2.as_deref())
            .await?;

        let user_id = uuid::Uuid::new_v4().to_string();
        self.store
            .insert_user(
                &user_id,
                nik,
                name,
                new_user.pickup_point.as_deref(),
                new_user.role,
                new_user.approver1.as_deref(),
                new_user.approver2.as_deref(),
            )
            .await?;

        info!(nik = %nik, role = %new_user.role, "Directory entry created");

        self.resolve(nik)
            .await?
            .ok_or_else(|| DirectoryError::Database("created user vanished".to_string()))
    }

    /// Reassigns role and approver references (admin action). The hierarchy
    /// invariant is re-validated against the directory before committing.
    pub async fn update_role(&self, nik: &str, update: &RoleUpdate) -> Result<User, DirectoryError> {
        let user_id = self
            .store
            .profile_id(nik)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(nik.trim().to_string()))?;

        check_structure(
            nik.trim(),
            update.role,
            update.approver1.as_deref(),
            update.approver2.as_deref(),
        )?;
        self.check_references(update.approver1.as_deref(), update.approver2.as_deref())
            .await?;

        self.store
            .update_user_role(
                &user_id,
                update.role,
                update.approver1.as_deref(),
                update.approver2.as_deref(),
            )
            .await?;

        info!(nik = %nik, role = %update.role, "Role reassigned");

        self.resolve(nik)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(nik.trim().to_string()))
    }

    /// Self-service profile edit: display name and pickup point only.
    pub async fn update_profile(
        &self,
        nik: &str,
        name: &str,
        pickup_point: Option<&str>,
    ) -> Result<User, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::Validation("name is required".to_string()));
        }

        let user_id = self
            .store
            .profile_id(nik)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(nik.trim().to_string()))?;

        self.store
            .update_user_profile(&user_id, name, pickup_point)
            .await?;

        self.resolve(nik)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(nik.trim().to_string()))
    }

    /// Deletes a directory entry (admin action). Historical requests keep
    /// their snapshots.
    pub async fn delete(&self, nik: &str) -> Result<(), DirectoryError> {
        let user_id = self
            .store
            .profile_id(nik)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(nik.trim().to_string()))?;

        self.store.delete_user(&user_id).await?;

        info!(nik = %nik.trim(), "Directory entry deleted");
        Ok(())
    }
}
