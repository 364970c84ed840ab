//! Create test_steps table.

use sea_orm_migration::prelude::*;

use super::m20250601_000003_create_testcases::Testcases;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestSteps::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TestSteps::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TestSteps::TestcaseId).string().not_null())
                    .col(ColumnDef::new(TestSteps::StepNumber).integer().not_null())
                    .col(ColumnDef::new(TestSteps::Action).text().not_null())
                    .col(
                        ColumnDef::new(TestSteps::ExpectedResult)
                            .text()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestSteps::Table, TestSteps::TestcaseId)
                            .to(Testcases::Table, Testcases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_steps_testcase_id")
                    .table(TestSteps::Table)
                    .col(TestSteps::TestcaseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestSteps::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestSteps {
    Table,
    Id,
    TestcaseId,
    StepNumber,
    Action,
    ExpectedResult,
}
