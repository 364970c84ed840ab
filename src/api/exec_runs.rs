//! Test execution run API handlers: run creation, result recording,
//! completion, and deletion.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::exec_runs::{NewCaseResult, RunWithCounts};
use crate::entity::{case_result, exec_run};
use crate::error::{AppError, AppResult};
use crate::models::{CaseVerdict, RerunType, StepResult};

/// Response for a run.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub run_number: i32,
    pub executed_by: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<exec_run::Model> for RunResponse {
    fn from(run: exec_run::Model) -> Self {
        RunResponse {
            id: run.id,
            item_id: run.item_id,
            run_number: run.run_number,
            executed_by: run.executed_by,
            status: run.status,
            notes: run.notes,
            started_at: run.started_at,
            completed_at: run.completed_at,
        }
    }
}

/// Response for a per-test-case result.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultResponse {
    pub id: Uuid,
    pub run_id: Uuid,
    pub testcase_id: String,
    pub result: String,
    pub notes: Option<String>,
    pub step_results: Vec<StepResult>,
    pub executed_at: DateTime<Utc>,
}

impl From<case_result::Model> for ResultResponse {
    fn from(result: case_result::Model) -> Self {
        let step_results = serde_json::from_value(result.step_results).unwrap_or_default();
        ResultResponse {
            id: result.id,
            run_id: result.run_id,
            testcase_id: result.testcase_id,
            result: result.result,
            notes: result.notes,
            step_results,
            executed_at: result.executed_at,
        }
    }
}

/// A run annotated with per-verdict result counts.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunWithCountsResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub run_number: i32,
    pub executed_by: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_tests: i64,
    pub pass_count: i64,
    pub fail_count: i64,
    pub block_count: i64,
    pub skip_count: i64,
}

impl From<RunWithCounts> for RunWithCountsResponse {
    fn from(run: RunWithCounts) -> Self {
        RunWithCountsResponse {
            id: run.id,
            item_id: run.item_id,
            run_number: run.run_number,
            executed_by: run.executed_by,
            status: run.status,
            notes: run.notes,
            started_at: run.started_at,
            completed_at: run.completed_at,
            total_tests: run.total_tests,
            pass_count: run.pass_count,
            fail_count: run.fail_count,
            block_count: run.block_count,
            skip_count: run.skip_count,
        }
    }
}

/// Response for a single run with its results.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunDetailResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub run_number: i32,
    pub executed_by: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub results: Vec<ResultResponse>,
}

/// Request to create a run.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRunRequest {
    pub item_id: Option<Uuid>,
    pub executed_by: Option<String>,
    /// "all" retests everything, "failed" carries passing/skipped outcomes
    /// forward.
    pub rerun_type: Option<String>,
}

/// Request to save one test case's result.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveResultRequest {
    pub testcase_id: Option<String>,
    /// One of Pass | Fail | Block | Skip.
    pub result: Option<String>,
    pub notes: Option<String>,
    pub step_results: Option<Vec<StepResult>>,
}

/// Request to complete a run.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteRunRequest {
    pub notes: Option<String>,
}

/// Message response for deletions.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

pub(super) fn parse_rerun_type(value: Option<&str>) -> AppResult<Option<RerunType>> {
    match value {
        None => Ok(None),
        Some(s) => RerunType::parse(s).map(Some).ok_or_else(|| {
            AppError::InvalidInput("rerun_type must be 'all' or 'failed'".to_string())
        }),
    }
}

/// Get all runs for an item, annotated with result counts.
#[utoipa::path(
    get,
    path = "/api/test-execution-runs/item/{item_id}",
    tag = "Test Execution",
    params(
        ("item_id" = Uuid, Path, description = "Item UUID")
    ),
    responses(
        (status = 200, description = "Runs for the item", body = [RunWithCountsResponse]),
    )
)]
pub async fn get_runs_for_item(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let item_id = path.into_inner();
    let runs = pool.runs_for_item(item_id).await?;

    let response: Vec<RunWithCountsResponse> =
        runs.into_iter().map(RunWithCountsResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a single run with its results.
#[utoipa::path(
    get,
    path = "/api/test-execution-runs/{id}",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Run UUID")
    ),
    responses(
        (status = 200, description = "Run with results", body = RunDetailResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_run(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let run_id = path.into_inner();
    let (run, results) = pool.get_run_with_results(run_id).await?;

    let response = RunDetailResponse {
        id: run.id,
        item_id: run.item_id,
        run_number: run.run_number,
        executed_by: run.executed_by,
        status: run.status,
        notes: run.notes,
        started_at: run.started_at,
        completed_at: run.completed_at,
        results: results.into_iter().map(ResultResponse::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Create a new run for an item.
///
/// Rejected with 409 while the item still has an open run; the start-test
/// endpoint on items resolves that with an explicit resume/discard decision.
#[utoipa::path(
    post,
    path = "/api/test-execution-runs",
    tag = "Test Execution",
    request_body = CreateRunRequest,
    responses(
        (status = 201, description = "Run created", body = RunResponse),
        (status = 400, description = "Missing or invalid item_id", body = crate::error::ErrorResponse),
        (status = 409, description = "An open run exists", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_run(
    pool: web::Data<DbPool>,
    body: web::Json<CreateRunRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let item_id = body
        .item_id
        .ok_or_else(|| AppError::InvalidInput("item_id is required".to_string()))?;
    let rerun_type = parse_rerun_type(body.rerun_type.as_deref())?;

    let run = pool.create_run(item_id, body.executed_by, rerun_type).await?;

    Ok(HttpResponse::Created().json(RunResponse::from(run)))
}

/// Save (upsert) one test case's result within a run.
#[utoipa::path(
    post,
    path = "/api/test-execution-runs/{run_id}/results",
    tag = "Test Execution",
    params(
        ("run_id" = Uuid, Path, description = "Run UUID")
    ),
    request_body = SaveResultRequest,
    responses(
        (status = 200, description = "Result saved", body = ResultResponse),
        (status = 400, description = "Missing testcase_id or result", body = crate::error::ErrorResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn save_result(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<SaveResultRequest>,
) -> AppResult<HttpResponse> {
    let run_id = path.into_inner();
    let body = body.into_inner();

    let testcase_id = body
        .testcase_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput("testcase_id is required".to_string()))?;
    let result = body
        .result
        .as_deref()
        .and_then(CaseVerdict::parse)
        .ok_or_else(|| {
            AppError::InvalidInput("result must be one of Pass, Fail, Block, Skip".to_string())
        })?;

    let saved = pool
        .save_result(
            run_id,
            NewCaseResult {
                testcase_id,
                result,
                notes: body.notes,
                step_results: body.step_results,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ResultResponse::from(saved)))
}

/// Complete a run: derive its final status from recorded results and roll
/// the status up to the owning item and suite.
#[utoipa::path(
    put,
    path = "/api/test-execution-runs/{id}/complete",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Run UUID")
    ),
    request_body = CompleteRunRequest,
    responses(
        (status = 200, description = "Run finalized", body = RunResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn complete_run(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CompleteRunRequest>,
) -> AppResult<HttpResponse> {
    let run_id = path.into_inner();
    let run = pool.complete_run(run_id, body.into_inner().notes).await?;

    Ok(HttpResponse::Ok().json(RunResponse::from(run)))
}

/// Delete a run and its results.
#[utoipa::path(
    delete,
    path = "/api/test-execution-runs/{id}",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Run UUID")
    ),
    responses(
        (status = 200, description = "Run deleted", body = MessageResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_run(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let run_id = path.into_inner();
    pool.delete_run(run_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Run deleted successfully".to_string(),
    }))
}

/// Configure test execution run routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-execution-runs").route(web::post().to(create_run)),
    )
    .service(
        web::resource("/test-execution-runs/item/{item_id}")
            .route(web::get().to(get_runs_for_item)),
    )
    .service(
        web::resource("/test-execution-runs/{run_id}/results")
            .route(web::post().to(save_result)),
    )
    .service(
        web::resource("/test-execution-runs/{id}/complete")
            .route(web::put().to(complete_run)),
    )
    .service(
        web::resource("/test-execution-runs/{id}")
            .route(web::get().to(get_run))
            .route(web::delete().to(delete_run)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rerun_type() {
        assert_eq!(parse_rerun_type(None).unwrap(), None);
        assert_eq!(parse_rerun_type(Some("all")).unwrap(), Some(RerunType::All));
        assert_eq!(
            parse_rerun_type(Some("failed")).unwrap(),
            Some(RerunType::Failed)
        );
        assert!(parse_rerun_type(Some("everything")).is_err());
    }

    #[test]
    fn test_result_response_decodes_step_results() {
        let model = case_result::Model {
            id: Uuid::now_v7(),
            run_id: Uuid::now_v7(),
            testcase_id: "TC-001".to_string(),
            result: "Pass".to_string(),
            notes: None,
            step_results: serde_json::json!([
                {"step_number": 1, "result": "Pass"},
                {"step_number": 2, "result": "Fail", "notes": "button missing"}
            ]),
            executed_at: Utc::now(),
        };

        let response = ResultResponse::from(model);
        assert_eq!(response.step_results.len(), 2);
        assert_eq!(response.step_results[1].result, CaseVerdict::Fail);
        assert_eq!(
            response.step_results[1].notes.as_deref(),
            Some("button missing")
        );
    }

    #[test]
    fn test_result_response_tolerates_malformed_step_results() {
        let model = case_result::Model {
            id: Uuid::now_v7(),
            run_id: Uuid::now_v7(),
            testcase_id: "TC-002".to_string(),
            result: "Skip".to_string(),
            notes: None,
            step_results: serde_json::json!({"not": "a list"}),
            executed_at: Utc::now(),
        };

        let response = ResultResponse::from(model);
        assert!(response.step_results.is_empty());
    }
}
