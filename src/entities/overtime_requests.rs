use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "overtime_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: String,

    /// Owner NIK snapshot; kept even if the directory entry is deleted.
    pub nik: String,

    /// Owner display-name snapshot.
    pub name: String,

    /// Category display name at submission time.
    pub category: String,

    pub category_key: String,

    /// `YYYY-MM-DD`
    pub date: String,

    /// `HH:MM`
    pub start_time: String,

    /// `HH:MM`
    pub end_time: String,

    /// Hours, rounded to two decimals.
    pub duration: f64,

    pub reason: String,

    pub status: String,

    pub approver1_status: String,

    pub approver2_status: String,

    pub approver1_name: Option<String>,

    pub approver2_name: Option<String>,

    pub approver1_approved_at: Option<String>,

    pub approver2_approved_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
