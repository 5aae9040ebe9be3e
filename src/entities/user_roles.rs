use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: String,

    /// Canonical role string, parsed into [`crate::domain::Role`] at the
    /// repository boundary.
    pub role: String,

    /// NIK of the approver configured for slot 1, when assigned.
    pub approver1_nik: Option<String>,

    /// NIK of the approver configured for slot 2, when assigned.
    pub approver2_nik: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
