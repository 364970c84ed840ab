//! Test case API handlers, including AI-assisted generation.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::testcases::{
    NewTestStep, NewTestcase, TestcaseDetail, TestcaseWithLinks, UpdateTestcase,
};
use crate::entity::{test_step, testcase};
use crate::error::{AppError, AppResult};
use crate::models::GeneratedTestCase;
use crate::services::generator::Generator;

use super::exec_runs::MessageResponse;

/// Response for a test case row.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestcaseResponse {
    pub id: String,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub preconditions: Option<String>,
    pub postconditions: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<testcase::Model> for TestcaseResponse {
    fn from(tc: testcase::Model) -> Self {
        let tags = tc
            .tags
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        TestcaseResponse {
            id: tc.id,
            project_id: tc.project_id,
            title: tc.title,
            description: tc.description,
            priority: tc.priority,
            category: tc.category,
            preconditions: tc.preconditions,
            postconditions: tc.postconditions,
            status: tc.status,
            tags,
            created_at: tc.created_at,
            updated_at: tc.updated_at,
        }
    }
}

/// A test case with its requirement links, as returned by the list view.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestcaseListEntry {
    #[serde(flatten)]
    pub testcase: TestcaseResponse,
    pub requirement_ids: Vec<String>,
}

/// Response for one test step.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestStepResponse {
    pub step_number: i32,
    pub action: String,
    pub expected_result: String,
}

impl From<test_step::Model> for TestStepResponse {
    fn from(step: test_step::Model) -> Self {
        TestStepResponse {
            step_number: step.step_number,
            action: step.action,
            expected_result: step.expected_result,
        }
    }
}

/// Full test case response with steps and requirement links.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestcaseDetailResponse {
    #[serde(flatten)]
    pub testcase: TestcaseResponse,
    pub steps: Vec<TestStepResponse>,
    pub requirement_ids: Vec<String>,
}

impl From<TestcaseDetail> for TestcaseDetailResponse {
    fn from(detail: TestcaseDetail) -> Self {
        TestcaseDetailResponse {
            testcase: TestcaseResponse::from(detail.testcase),
            steps: detail.steps.into_iter().map(TestStepResponse::from).collect(),
            requirement_ids: detail.requirement_ids,
        }
    }
}

/// One step in a create/update request. Steps without explicit numbers are
/// numbered by position.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TestStepRequest {
    pub step_number: Option<i32>,
    pub action: String,
    pub expected_result: String,
}

/// Request to create a test case.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestcaseRequest {
    pub id: Option<String>,
    pub project_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub preconditions: Option<String>,
    pub postconditions: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub steps: Vec<TestStepRequest>,
    #[serde(default)]
    pub requirement_ids: Vec<String>,
}

/// Request to update a test case. Steps and requirement links are replaced
/// wholesale.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTestcaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub preconditions: Option<String>,
    pub postconditions: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub steps: Vec<TestStepRequest>,
    #[serde(default)]
    pub requirement_ids: Vec<String>,
}

/// Request to generate test cases from a feature description.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<Uuid>,
    /// Test category (Functional, Integration, UI, API, Performance,
    /// Security); defaults to Functional.
    pub category: Option<String>,
}

/// Response of the AI generation endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub success: bool,
    pub testcases: Vec<GeneratedTestCase>,
    pub message: String,
}

fn numbered_steps(steps: Vec<TestStepRequest>) -> Vec<NewTestStep> {
    steps
        .into_iter()
        .enumerate()
        .map(|(idx, step)| NewTestStep {
            step_number: step.step_number.unwrap_or(idx as i32 + 1),
            action: step.action,
            expected_result: step.expected_result,
        })
        .collect()
}

/// Get all test cases in a project.
#[utoipa::path(
    get,
    path = "/api/testcases/project/{project_id}",
    tag = "Test Cases",
    params(
        ("project_id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Test cases in the project", body = [TestcaseListEntry]),
    )
)]
pub async fn get_testcases_for_project(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project_id = path.into_inner();
    let testcases = pool.testcases_for_project(project_id).await?;

    let response: Vec<TestcaseListEntry> = testcases
        .into_iter()
        .map(|TestcaseWithLinks { testcase, requirement_ids }| TestcaseListEntry {
            testcase: TestcaseResponse::from(testcase),
            requirement_ids,
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a single test case with steps and requirement links.
#[utoipa::path(
    get,
    path = "/api/testcases/{id}",
    tag = "Test Cases",
    params(
        ("id" = String, Path, description = "Test case id (e.g. TC-001)")
    ),
    responses(
        (status = 200, description = "Test case detail", body = TestcaseDetailResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_testcase(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let detail = pool.get_testcase(&id).await?;

    Ok(HttpResponse::Ok().json(TestcaseDetailResponse::from(detail)))
}

/// Create a test case with steps and requirement links.
#[utoipa::path(
    post,
    path = "/api/testcases",
    tag = "Test Cases",
    request_body = CreateTestcaseRequest,
    responses(
        (status = 201, description = "Test case created", body = TestcaseDetailResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorResponse),
        (status = 409, description = "Test case id already exists", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_testcase(
    pool: web::Data<DbPool>,
    body: web::Json<CreateTestcaseRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(id), Some(project_id), Some(title)) = (body.id, body.project_id, body.title) else {
        return Err(AppError::InvalidInput(
            "id, project_id, and title are required".to_string(),
        ));
    };

    let detail = pool
        .insert_testcase(NewTestcase {
            id,
            project_id,
            title,
            description: body.description,
            priority: body.priority,
            category: body.category,
            preconditions: body.preconditions,
            postconditions: body.postconditions,
            status: body.status,
            tags: body.tags,
            steps: numbered_steps(body.steps),
            requirement_ids: body.requirement_ids,
        })
        .await?;

    Ok(HttpResponse::Created().json(TestcaseDetailResponse::from(detail)))
}

/// Update a test case.
#[utoipa::path(
    put,
    path = "/api/testcases/{id}",
    tag = "Test Cases",
    params(
        ("id" = String, Path, description = "Test case id")
    ),
    request_body = UpdateTestcaseRequest,
    responses(
        (status = 200, description = "Test case updated", body = TestcaseDetailResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_testcase(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<UpdateTestcaseRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let body = body.into_inner();

    let Some(title) = body.title else {
        return Err(AppError::InvalidInput("title is required".to_string()));
    };

    let detail = pool
        .update_testcase(
            &id,
            UpdateTestcase {
                title,
                description: body.description,
                priority: body.priority,
                category: body.category,
                preconditions: body.preconditions,
                postconditions: body.postconditions,
                status: body.status,
                tags: body.tags,
                steps: numbered_steps(body.steps),
                requirement_ids: body.requirement_ids,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(TestcaseDetailResponse::from(detail)))
}

/// Delete a test case.
#[utoipa::path(
    delete,
    path = "/api/testcases/{id}",
    tag = "Test Cases",
    params(
        ("id" = String, Path, description = "Test case id")
    ),
    responses(
        (status = 200, description = "Test case deleted", body = MessageResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_testcase(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    pool.delete_testcase(&id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Test case deleted successfully".to_string(),
    }))
}

/// Generate test cases for a feature description with the configured AI
/// provider. The generated cases are returned for review, not persisted.
#[utoipa::path(
    post,
    path = "/api/testcases/generate-from-ai",
    tag = "Test Cases",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated test cases", body = GenerateResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorResponse),
        (status = 502, description = "Provider failure or unusable reply", body = crate::error::ErrorResponse),
    )
)]
pub async fn generate_from_ai(
    pool: web::Data<DbPool>,
    generator: web::Data<Generator>,
    body: web::Json<GenerateRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(title), Some(description), Some(project_id)) =
        (body.title, body.description, body.project_id)
    else {
        return Err(AppError::InvalidInput(
            "title, description, and project_id are required".to_string(),
        ));
    };

    // The project must exist even though generated cases are not persisted;
    // a dangling id points at a client bug.
    pool.get_project(project_id).await?;

    let category = body.category.unwrap_or_else(|| "Functional".to_string());
    let testcases = generator.generate(&title, &description, &category).await?;

    let message = format!("{} test cases generated", testcases.len());
    Ok(HttpResponse::Ok().json(GenerateResponse {
        success: true,
        testcases,
        message,
    }))
}

/// Configure test case routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/testcases").route(web::post().to(create_testcase)))
        .service(
            web::resource("/testcases/generate-from-ai")
                .route(web::post().to(generate_from_ai)),
        )
        .service(
            web::resource("/testcases/project/{project_id}")
                .route(web::get().to(get_testcases_for_project)),
        )
        .service(
            web::resource("/testcases/{id}")
                .route(web::get().to(get_testcase))
                .route(web::put().to(update_testcase))
                .route(web::delete().to(delete_testcase)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_steps_fills_missing_numbers() {
        let steps = vec![
            TestStepRequest {
                step_number: None,
                action: "Open page".to_string(),
                expected_result: "Page loads".to_string(),
            },
            TestStepRequest {
                step_number: Some(7),
                action: "Click save".to_string(),
                expected_result: "Saved".to_string(),
            },
            TestStepRequest {
                step_number: None,
                action: "Reload".to_string(),
                expected_result: "Change persisted".to_string(),
            },
        ];

        let numbered = numbered_steps(steps);
        assert_eq!(numbered[0].step_number, 1);
        assert_eq!(numbered[1].step_number, 7);
        assert_eq!(numbered[2].step_number, 3);
    }
}
