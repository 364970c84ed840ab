//! SeaORM entity definitions for PostgreSQL database.

pub mod case_result;
pub mod exec_item;
pub mod exec_run;
pub mod exec_suite;
pub mod project;
pub mod requirement;
pub mod test_step;
pub mod testcase;
pub mod testcase_requirement;
