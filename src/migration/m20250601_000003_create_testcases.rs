//! Create testcases table.

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
                    .table(Testcases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Testcases::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Testcases::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Testcases::Title).string().not_null())
                    .col(ColumnDef::new(Testcases::Description).text())
                    .col(ColumnDef::new(Testcases::Priority).string())
                    .col(ColumnDef::new(Testcases::Category).string())
                    .col(ColumnDef::new(Testcases::Preconditions).text())
                    .col(ColumnDef::new(Testcases::Postconditions).text())
                    .col(ColumnDef::new(Testcases::Status).string())
                    .col(ColumnDef::new(Testcases::Tags).json_binary())
                    .col(
                        ColumnDef::new(Testcases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Testcases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Testcases::Table, Testcases::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_testcases_project_id")
                    .table(Testcases::Table)
                    .col(Testcases::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Testcases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Testcases {
    Table,
    Id,
    ProjectId,
    Title,
    Description,
    Priority,
    Category,
    Preconditions,
    Postconditions,
    Status,
    Tags,
    CreatedAt,
    UpdatedAt,
}
