//! Create test_execution_suites table.

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
                    .table(ExecSuites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExecSuites::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExecSuites::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(ExecSuites::Name).string().not_null())
                    .col(ColumnDef::new(ExecSuites::Purpose).string())
                    .col(ColumnDef::new(ExecSuites::Description).text())
                    .col(
                        ColumnDef::new(ExecSuites::Status)
                            .string()
                            .not_null()
                            .default("Not Started"),
                    )
                    .col(
                        ColumnDef::new(ExecSuites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExecSuites::Table, ExecSuites::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_execution_suites_project_id")
                    .table(ExecSuites::Table)
                    .col(ExecSuites::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExecSuites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ExecSuites {
    #[sea_orm(iden = "test_execution_suites")]
    Table,
    Id,
    ProjectId,
    Name,
    Purpose,
    Description,
    Status,
    CreatedAt,
}
