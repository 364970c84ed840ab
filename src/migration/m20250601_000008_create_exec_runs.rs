//! Create test_execution_runs table.
//!
//! The unique index on (item_id, run_number) serializes run-number
//! assignment; concurrent creators retry on conflict instead of producing
//! duplicate numbers.

use sea_orm_migration::prelude::*;

use super::m20250601_000007_create_exec_items::ExecItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExecRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExecRuns::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExecRuns::ItemId).uuid().not_null())
                    .col(ColumnDef::new(ExecRuns::RunNumber).integer().not_null())
                    .col(ColumnDef::new(ExecRuns::ExecutedBy).string())
                    .col(
                        ColumnDef::new(ExecRuns::Status)
                            .string()
                            .not_null()
                            .default("In Progress"),
                    )
                    .col(ColumnDef::new(ExecRuns::Notes).text())
                    .col(
                        ColumnDef::new(ExecRuns::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExecRuns::CompletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExecRuns::Table, ExecRuns::ItemId)
                            .to(ExecItems::Table, ExecItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_execution_runs_item_run_number")
                    .table(ExecRuns::Table)
                    .col(ExecRuns::ItemId)
                    .col(ExecRuns::RunNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExecRuns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ExecRuns {
    #[sea_orm(iden = "test_execution_runs")]
    Table,
    Id,
    ItemId,
    RunNumber,
    ExecutedBy,
    Status,
    Notes,
    StartedAt,
    CompletedAt,
}
