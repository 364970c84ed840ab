//! Create testcase_requirements link table.

use sea_orm_migration::prelude::*;

use super::m20250601_000002_create_requirements::Requirements;
use super::m20250601_000003_create_testcases::Testcases;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestcaseRequirements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestcaseRequirements::TestcaseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestcaseRequirements::RequirementId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TestcaseRequirements::TestcaseId)
                            .col(TestcaseRequirements::RequirementId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestcaseRequirements::Table, TestcaseRequirements::TestcaseId)
                            .to(Testcases::Table, Testcases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                TestcaseRequirements::Table,
                                TestcaseRequirements::RequirementId,
                            )
                            .to(Requirements::Table, Requirements::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_testcase_requirements_requirement_id")
                    .table(TestcaseRequirements::Table)
                    .col(TestcaseRequirements::RequirementId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestcaseRequirements::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestcaseRequirements {
    Table,
    TestcaseId,
    RequirementId,
}
