use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// NIK of the seeded bootstrap account. A fresh install logs in with this to
/// create the rest of the directory.
const BOOTSTRAP_ADMIN_NIK: &str = "admin";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Profiles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserRoles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(OvertimeRequests)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Requests are listed by owner and by pending slot far more often
        // than they are written.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_overtime_requests_nik")
                    .table(OvertimeRequests)
                    .col(crate::entities::overtime_requests::Column::Nik)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_overtime_requests_status")
                    .table(OvertimeRequests)
                    .col(crate::entities::overtime_requests::Column::Status)
                    .to_owned(),
            )
            .await?;

        // Seed the bootstrap admin so a fresh database is usable.
        let now = chrono::Utc::now().to_rfc3339();
        let admin_id = uuid::Uuid::new_v4().to_string();

        let insert_profile = sea_orm_migration::sea_query::Query::insert()
            .into_table(Profiles)
            .columns([
                crate::entities::profiles::Column::Id,
                crate::entities::profiles::Column::Nik,
                crate::entities::profiles::Column::Name,
                crate::entities::profiles::Column::CreatedAt,
                crate::entities::profiles::Column::UpdatedAt,
            ])
            .values_panic([
                admin_id.clone().into(),
                BOOTSTRAP_ADMIN_NIK.into(),
                "Administrator".into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert_profile).await?;

        let insert_role = sea_orm_migration::sea_query::Query::insert()
            .into_table(UserRoles)
            .columns([
                crate::entities::user_roles::Column::UserId,
                crate::entities::user_roles::Column::Role,
            ])
            .values_panic([admin_id.into(), "admin".into()])
            .to_owned();

        manager.exec_stmt(insert_role).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OvertimeRequests).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles).to_owned())
            .await?;

        Ok(())
    }
}
