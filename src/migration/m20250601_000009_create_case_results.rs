//! Create test_case_results table.
//!
//! The unique index on (run_id, testcase_id) backs the upsert in
//! save_result: one row per test case per run, re-saves update in place.

use sea_orm_migration::prelude::*;

use super::m20250601_000008_create_exec_runs::ExecRuns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CaseResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CaseResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CaseResults::RunId).uuid().not_null())
                    .col(ColumnDef::new(CaseResults::TestcaseId).string().not_null())
                    .col(ColumnDef::new(CaseResults::Result).string().not_null())
                    .col(ColumnDef::new(CaseResults::Notes).text())
                    .col(
                        ColumnDef::new(CaseResults::StepResults)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(CaseResults::ExecutedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CaseResults::Table, CaseResults::RunId)
                            .to(ExecRuns::Table, ExecRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_case_results_run_testcase")
                    .table(CaseResults::Table)
                    .col(CaseResults::RunId)
                    .col(CaseResults::TestcaseId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CaseResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CaseResults {
    #[sea_orm(iden = "test_case_results")]
    Table,
    Id,
    RunId,
    TestcaseId,
    Result,
    Notes,
    StepResults,
    ExecutedAt,
}
