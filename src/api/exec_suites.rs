//! Test execution suite API handlers.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::exec_suites::{NewExecSuite, SuiteItemSummary, SuiteWithCounts, UpdateExecSuite};
use crate::entity::exec_suite;
use crate::error::{AppError, AppResult};
use crate::models::ExecStatus;

use super::exec_runs::MessageResponse;

/// Response for a suite.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuiteResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<exec_suite::Model> for SuiteResponse {
    fn from(suite: exec_suite::Model) -> Self {
        SuiteResponse {
            id: suite.id,
            project_id: suite.project_id,
            name: suite.name,
            purpose: suite.purpose,
            description: suite.description,
            status: suite.status,
            created_at: suite.created_at,
        }
    }
}

/// A suite annotated with item and run counts.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuiteWithCountsResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
    pub run_count: i64,
}

impl From<SuiteWithCounts> for SuiteWithCountsResponse {
    fn from(suite: SuiteWithCounts) -> Self {
        SuiteWithCountsResponse {
            id: suite.id,
            project_id: suite.project_id,
            name: suite.name,
            purpose: suite.purpose,
            description: suite.description,
            status: suite.status,
            created_at: suite.created_at,
            item_count: suite.item_count,
            run_count: suite.run_count,
        }
    }
}

/// An item summary inside the suite detail view.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuiteItemResponse {
    pub id: Uuid,
    pub suite_id: Uuid,
    pub name: String,
    pub requirement_ids: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub run_count: i64,
    /// Status of the highest-numbered run, when any run exists.
    pub latest_run_status: Option<String>,
}

impl From<SuiteItemSummary> for SuiteItemResponse {
    fn from(item: SuiteItemSummary) -> Self {
        let requirement_ids = serde_json::from_value(item.requirement_ids).unwrap_or_default();
        SuiteItemResponse {
            id: item.id,
            suite_id: item.suite_id,
            name: item.name,
            requirement_ids,
            status: item.status,
            created_at: item.created_at,
            run_count: item.run_count,
            latest_run_status: item.latest_run_status,
        }
    }
}

/// Response for a suite with its item summaries.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuiteDetailResponse {
    #[serde(flatten)]
    pub suite: SuiteResponse,
    pub items: Vec<SuiteItemResponse>,
}

/// Request to create a suite.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSuiteRequest {
    pub project_id: Option<Uuid>,
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub description: Option<String>,
}

/// Request to update a suite.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSuiteRequest {
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub description: Option<String>,
    /// Optional status override (one of Not Started, In Progress, Pass,
    /// Fail, Block).
    pub status: Option<String>,
}

/// Get all suites in a project with item/run counts.
#[utoipa::path(
    get,
    path = "/api/test-execution-suites/project/{project_id}",
    tag = "Test Execution",
    params(
        ("project_id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Suites in the project", body = [SuiteWithCountsResponse]),
    )
)]
pub async fn get_suites_for_project(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project_id = path.into_inner();
    let suites = pool.suites_for_project(project_id).await?;

    let response: Vec<SuiteWithCountsResponse> = suites
        .into_iter()
        .map(SuiteWithCountsResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a suite with its item summaries.
#[utoipa::path(
    get,
    path = "/api/test-execution-suites/{id}",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Suite UUID")
    ),
    responses(
        (status = 200, description = "Suite with items", body = SuiteDetailResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_suite(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    let (suite, items) = pool.get_suite_with_items(suite_id).await?;

    let response = SuiteDetailResponse {
        suite: SuiteResponse::from(suite),
        items: items.into_iter().map(SuiteItemResponse::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Create a new suite in a project.
#[utoipa::path(
    post,
    path = "/api/test-execution-suites",
    tag = "Test Execution",
    request_body = CreateSuiteRequest,
    responses(
        (status = 201, description = "Suite created", body = SuiteResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_suite(
    pool: web::Data<DbPool>,
    body: web::Json<CreateSuiteRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(project_id), Some(name)) = (body.project_id, body.name) else {
        return Err(AppError::InvalidInput(
            "project_id and name are required".to_string(),
        ));
    };

    let suite = pool
        .insert_suite(NewExecSuite {
            project_id,
            name,
            purpose: body.purpose,
            description: body.description,
        })
        .await?;

    Ok(HttpResponse::Created().json(SuiteResponse::from(suite)))
}

/// Update a suite.
#[utoipa::path(
    put,
    path = "/api/test-execution-suites/{id}",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Suite UUID")
    ),
    request_body = UpdateSuiteRequest,
    responses(
        (status = 200, description = "Suite updated", body = SuiteResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_suite(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSuiteRequest>,
) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    let body = body.into_inner();

    let Some(name) = body.name else {
        return Err(AppError::InvalidInput("name is required".to_string()));
    };
    let status = match body.status.as_deref() {
        None => None,
        Some(s) => Some(ExecStatus::parse(s).ok_or_else(|| {
            AppError::InvalidInput(format!("'{}' is not a valid status", s))
        })?),
    };

    let suite = pool
        .update_suite(
            suite_id,
            UpdateExecSuite {
                name,
                purpose: body.purpose,
                description: body.description,
                status,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(SuiteResponse::from(suite)))
}

/// Delete a suite; items, runs, and results cascade.
#[utoipa::path(
    delete,
    path = "/api/test-execution-suites/{id}",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Suite UUID")
    ),
    responses(
        (status = 200, description = "Suite deleted", body = MessageResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_suite(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    pool.delete_suite(suite_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Suite deleted successfully".to_string(),
    }))
}

/// Configure test execution suite routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-execution-suites").route(web::post().to(create_suite)),
    )
    .service(
        web::resource("/test-execution-suites/project/{project_id}")
            .route(web::get().to(get_suites_for_project)),
    )
    .service(
        web::resource("/test-execution-suites/{id}")
            .route(web::get().to(get_suite))
            .route(web::put().to(update_suite))
            .route(web::delete().to(delete_suite)),
    );
}
