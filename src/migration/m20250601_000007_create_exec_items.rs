//! Create test_execution_items table.

use sea_orm_migration::prelude::*;

use super::m20250601_000006_create_exec_suites::ExecSuites;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExecItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExecItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExecItems::SuiteId).uuid().not_null())
                    .col(ColumnDef::new(ExecItems::Name).string().not_null())
                    .col(
                        ColumnDef::new(ExecItems::RequirementIds)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ExecItems::Status)
                            .string()
                            .not_null()
                            .default("Not Started"),
                    )
                    .col(
                        ColumnDef::new(ExecItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExecItems::Table, ExecItems::SuiteId)
                            .to(ExecSuites::Table, ExecSuites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_execution_items_suite_id")
                    .table(ExecItems::Table)
                    .col(ExecItems::SuiteId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExecItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ExecItems {
    #[sea_orm(iden = "test_execution_items")]
    Table,
    Id,
    SuiteId,
    Name,
    RequirementIds,
    Status,
    CreatedAt,
}
