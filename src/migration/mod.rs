//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_projects;
mod m20250601_000002_create_requirements;
mod m20250601_000003_create_testcases;
mod m20250601_000004_create_test_steps;
mod m20250601_000005_create_testcase_requirements;
mod m20250601_000006_create_exec_suites;
mod m20250601_000007_create_exec_items;
mod m20250601_000008_create_exec_runs;
mod m20250601_000009_create_case_results;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_projects::Migration),
            Box::new(m20250601_000002_create_requirements::Migration),
            Box::new(m20250601_000003_create_testcases::Migration),
            Box::new(m20250601_000004_create_test_steps::Migration),
            Box::new(m20250601_000005_create_testcase_requirements::Migration),
            Box::new(m20250601_000006_create_exec_suites::Migration),
            Box::new(m20250601_000007_create_exec_items::Migration),
            Box::new(m20250601_000008_create_exec_runs::Migration),
            Box::new(m20250601_000009_create_case_results::Migration),
        ]
    }
}
