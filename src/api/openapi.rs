//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Caseflow Server",
        version = "0.3.0",
        description = "API server for managing projects, requirements, test cases, and test execution with rerun/resume support"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Project endpoints
        api::projects::list_projects,
        api::projects::get_project,
        api::projects::create_project,
        api::projects::update_project,
        api::projects::delete_project,
        // Requirement endpoints
        api::requirements::get_requirements_for_project,
        api::requirements::get_requirement,
        api::requirements::create_requirement,
        api::requirements::update_requirement,
        api::requirements::delete_requirement,
        // Test case endpoints
        api::testcases::get_testcases_for_project,
        api::testcases::get_testcase,
        api::testcases::create_testcase,
        api::testcases::update_testcase,
        api::testcases::delete_testcase,
        api::testcases::generate_from_ai,
        // Statistics endpoints
        api::statistics::get_project_statistics,
        api::statistics::get_overall_statistics,
        // Test execution suite endpoints
        api::exec_suites::get_suites_for_project,
        api::exec_suites::get_suite,
        api::exec_suites::create_suite,
        api::exec_suites::update_suite,
        api::exec_suites::delete_suite,
        // Test execution item endpoints
        api::exec_items::get_items_for_suite,
        api::exec_items::get_item,
        api::exec_items::get_item_testcases,
        api::exec_items::create_item,
        api::exec_items::update_item,
        api::exec_items::delete_item,
        api::exec_items::start_test,
        // Test execution run endpoints
        api::exec_runs::get_runs_for_item,
        api::exec_runs::get_run,
        api::exec_runs::create_run,
        api::exec_runs::save_result,
        api::exec_runs::complete_run,
        api::exec_runs::delete_run,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            api::exec_runs::MessageResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Domain
            models::CaseVerdict,
            models::ExecStatus,
            models::RerunType,
            models::StartDecision,
            models::StepResult,
            models::GeneratedStep,
            models::GeneratedTestCase,
            models::GeneratedBatch,
            // Projects
            api::projects::ProjectResponse,
            api::projects::CreateProjectRequest,
            api::projects::UpdateProjectRequest,
            // Requirements
            api::requirements::RequirementResponse,
            api::requirements::CreateRequirementRequest,
            api::requirements::UpdateRequirementRequest,
            // Test cases
            api::testcases::TestcaseResponse,
            api::testcases::TestcaseListEntry,
            api::testcases::TestcaseDetailResponse,
            api::testcases::TestStepResponse,
            api::testcases::TestStepRequest,
            api::testcases::CreateTestcaseRequest,
            api::testcases::UpdateTestcaseRequest,
            api::testcases::GenerateRequest,
            api::testcases::GenerateResponse,
            // Statistics
            api::statistics::StatusCountResponse,
            api::statistics::CoverageResponse,
            api::statistics::ProjectStatisticsResponse,
            api::statistics::OverallStatisticsResponse,
            // Test execution
            api::exec_suites::SuiteResponse,
            api::exec_suites::SuiteWithCountsResponse,
            api::exec_suites::SuiteItemResponse,
            api::exec_suites::SuiteDetailResponse,
            api::exec_suites::CreateSuiteRequest,
            api::exec_suites::UpdateSuiteRequest,
            api::exec_items::ItemResponse,
            api::exec_items::ItemWithRunCountResponse,
            api::exec_items::ItemRunResponse,
            api::exec_items::ItemDetailResponse,
            api::exec_items::CreateItemRequest,
            api::exec_items::UpdateItemRequest,
            api::exec_items::StartTestRequest,
            api::exec_items::StartTestResponse,
            api::exec_runs::RunResponse,
            api::exec_runs::ResultResponse,
            api::exec_runs::RunWithCountsResponse,
            api::exec_runs::RunDetailResponse,
            api::exec_runs::CreateRunRequest,
            api::exec_runs::SaveResultRequest,
            api::exec_runs::CompleteRunRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Projects", description = "Project management"),
        (name = "Requirements", description = "Requirement management"),
        (name = "Test Cases", description = "Test case management and AI generation"),
        (name = "Statistics", description = "Project and overall statistics"),
        (name = "Test Execution", description = "Execution suites, items, runs, and results")
    )
)]
pub struct ApiDoc;
