//! Create requirements table.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_projects::Projects;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Requirements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Requirements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Requirements::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Requirements::Title).string().not_null())
                    .col(ColumnDef::new(Requirements::Description).text())
                    .col(ColumnDef::new(Requirements::Category).string())
                    .col(ColumnDef::new(Requirements::SubCategory).string())
                    .col(ColumnDef::new(Requirements::Priority).string())
                    .col(ColumnDef::new(Requirements::Status).string())
                    .col(ColumnDef::new(Requirements::Notes).text())
                    .col(
                        ColumnDef::new(Requirements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Requirements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Requirements::Table, Requirements::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_requirements_project_id")
                    .table(Requirements::Table)
                    .col(Requirements::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Requirements::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Requirements {
    Table,
    Id,
    ProjectId,
    Title,
    Description,
    Category,
    SubCategory,
    Priority,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}
