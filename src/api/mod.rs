//! API endpoint modules.

pub mod exec_items;
pub mod exec_runs;
pub mod exec_suites;
pub mod health;
pub mod openapi;
pub mod projects;
pub mod requirements;
pub mod statistics;
pub mod testcases;

pub use exec_items::configure_routes as configure_exec_item_routes;
pub use exec_runs::configure_routes as configure_exec_run_routes;
pub use exec_suites::configure_routes as configure_exec_suite_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use projects::configure_routes as configure_project_routes;
pub use requirements::configure_routes as configure_requirement_routes;
pub use statistics::configure_routes as configure_statistics_routes;
pub use testcases::configure_routes as configure_testcase_routes;
