//! Test execution item API handlers, including the start-test
//! (resume/discard) flow.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::exec_items::{ItemWithRunCount, NewExecItem, UpdateExecItem};
use crate::entity::exec_item;
use crate::error::{AppError, AppResult};
use crate::models::{ExecStatus, StartDecision};

use super::exec_runs::{MessageResponse, ResultResponse, RunResponse, parse_rerun_type};
use super::testcases::TestcaseResponse;

/// Response for an item.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    pub id: Uuid,
    pub suite_id: Uuid,
    pub name: String,
    pub requirement_ids: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<exec_item::Model> for ItemResponse {
    fn from(item: exec_item::Model) -> Self {
        let requirement_ids = item.requirement_id_list();
        ItemResponse {
            id: item.id,
            suite_id: item.suite_id,
            name: item.name,
            requirement_ids,
            status: item.status,
            created_at: item.created_at,
        }
    }
}

/// An item annotated with its run count.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemWithRunCountResponse {
    pub id: Uuid,
    pub suite_id: Uuid,
    pub name: String,
    pub requirement_ids: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub run_count: i64,
}

impl From<ItemWithRunCount> for ItemWithRunCountResponse {
    fn from(item: ItemWithRunCount) -> Self {
        let requirement_ids = serde_json::from_value(item.requirement_ids).unwrap_or_default();
        ItemWithRunCountResponse {
            id: item.id,
            suite_id: item.suite_id,
            name: item.name,
            requirement_ids,
            status: item.status,
            created_at: item.created_at,
            run_count: item.run_count,
        }
    }
}

/// A run with its results, nested in the item detail view.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemRunResponse {
    pub id: Uuid,
    pub run_number: i32,
    pub executed_by: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub results: Vec<ResultResponse>,
}

/// Response for an item with all of its runs and results.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDetailResponse {
    pub id: Uuid,
    pub suite_id: Uuid,
    pub name: String,
    pub requirement_ids: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub runs: Vec<ItemRunResponse>,
}

/// Request to create an item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub suite_id: Option<Uuid>,
    pub name: Option<String>,
    pub requirement_ids: Option<Vec<String>>,
}

/// Request to update an item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub requirement_ids: Option<Vec<String>>,
    /// Optional status override (one of Not Started, In Progress, Pass,
    /// Fail, Block).
    pub status: Option<String>,
}

/// Request to start testing an item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartTestRequest {
    pub executed_by: Option<String>,
    /// "all" or "failed"; applies when a new run gets created.
    pub rerun_type: Option<String>,
    /// "resume" or "discard"; required once an open run exists.
    pub decision: Option<String>,
}

/// Response of the start-test flow.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartTestResponse {
    /// True when the existing open run was resumed rather than a new one
    /// created.
    pub resumed: bool,
    pub run: RunResponse,
}

/// Get all items in a suite with their run counts.
#[utoipa::path(
    get,
    path = "/api/test-execution-items/suite/{suite_id}",
    tag = "Test Execution",
    params(
        ("suite_id" = Uuid, Path, description = "Suite UUID")
    ),
    responses(
        (status = 200, description = "Items in the suite", body = [ItemWithRunCountResponse]),
    )
)]
pub async fn get_items_for_suite(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    let items = pool.items_for_suite(suite_id).await?;

    let response: Vec<ItemWithRunCountResponse> = items
        .into_iter()
        .map(ItemWithRunCountResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a single item with all runs and their results.
#[utoipa::path(
    get,
    path = "/api/test-execution-items/{id}",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Item UUID")
    ),
    responses(
        (status = 200, description = "Item with runs", body = ItemDetailResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_item(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let item_id = path.into_inner();
    let (item, runs) = pool.get_item_with_runs(item_id).await?;

    let runs = runs
        .into_iter()
        .map(|(run, results)| ItemRunResponse {
            id: run.id,
            run_number: run.run_number,
            executed_by: run.executed_by,
            status: run.status,
            notes: run.notes,
            started_at: run.started_at,
            completed_at: run.completed_at,
            results: results.into_iter().map(ResultResponse::from).collect(),
        })
        .collect();

    let requirement_ids = item.requirement_id_list();
    let response = ItemDetailResponse {
        id: item.id,
        suite_id: item.suite_id,
        name: item.name,
        requirement_ids,
        status: item.status,
        created_at: item.created_at,
        runs,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Get the test cases covered by an item (requirement-id intersection).
#[utoipa::path(
    get,
    path = "/api/test-execution-items/{id}/testcases",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Item UUID")
    ),
    responses(
        (status = 200, description = "Test cases under the item", body = [TestcaseResponse]),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_item_testcases(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let item_id = path.into_inner();
    let testcases = pool.testcases_for_item(item_id).await?;

    let response: Vec<TestcaseResponse> = testcases
        .into_iter()
        .map(TestcaseResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Create a new item in a suite.
#[utoipa::path(
    post,
    path = "/api/test-execution-items",
    tag = "Test Execution",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_item(
    pool: web::Data<DbPool>,
    body: web::Json<CreateItemRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(suite_id), Some(name), Some(requirement_ids)) =
        (body.suite_id, body.name, body.requirement_ids)
    else {
        return Err(AppError::InvalidInput(
            "suite_id, name, and requirement_ids are required".to_string(),
        ));
    };

    let item = pool
        .insert_item(NewExecItem {
            suite_id,
            name,
            requirement_ids,
        })
        .await?;

    Ok(HttpResponse::Created().json(ItemResponse::from(item)))
}

/// Update an item.
#[utoipa::path(
    put,
    path = "/api/test-execution-items/{id}",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Item UUID")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_item(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateItemRequest>,
) -> AppResult<HttpResponse> {
    let item_id = path.into_inner();
    let body = body.into_inner();

    let (Some(name), Some(requirement_ids)) = (body.name, body.requirement_ids) else {
        return Err(AppError::InvalidInput(
            "name and requirement_ids are required".to_string(),
        ));
    };
    let status = match body.status.as_deref() {
        None => None,
        Some(s) => Some(ExecStatus::parse(s).ok_or_else(|| {
            AppError::InvalidInput(format!("'{}' is not a valid status", s))
        })?),
    };

    let item = pool
        .update_item(
            item_id,
            UpdateExecItem {
                name,
                requirement_ids,
                status,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ItemResponse::from(item)))
}

/// Delete an item; its runs and results cascade.
#[utoipa::path(
    delete,
    path = "/api/test-execution-items/{id}",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Item UUID")
    ),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_item(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let item_id = path.into_inner();
    pool.delete_item(item_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Item deleted successfully".to_string(),
    }))
}

/// Start testing an item.
///
/// With no open run this creates a new one. With an open run the caller
/// must pick `decision=resume` (continue the open run) or `decision=discard`
/// (drop it and start fresh); without a decision the request is rejected
/// with 409 so the client can present the choice.
#[utoipa::path(
    post,
    path = "/api/test-execution-items/{id}/start",
    tag = "Test Execution",
    params(
        ("id" = Uuid, Path, description = "Item UUID")
    ),
    request_body = StartTestRequest,
    responses(
        (status = 200, description = "Open run resumed", body = StartTestResponse),
        (status = 201, description = "New run created", body = StartTestResponse),
        (status = 409, description = "Open run needs a resume/discard decision", body = crate::error::ErrorResponse),
    )
)]
pub async fn start_test(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<StartTestRequest>,
) -> AppResult<HttpResponse> {
    let item_id = path.into_inner();
    let body = body.into_inner();

    let rerun_type = parse_rerun_type(body.rerun_type.as_deref())?;
    let decision = match body.decision.as_deref() {
        None => None,
        Some(s) => Some(StartDecision::parse(s).ok_or_else(|| {
            AppError::InvalidInput("decision must be 'resume' or 'discard'".to_string())
        })?),
    };

    let outcome = pool
        .start_test(item_id, body.executed_by, rerun_type, decision)
        .await?;

    let response = StartTestResponse {
        resumed: outcome.resumed,
        run: RunResponse::from(outcome.run),
    };

    if response.resumed {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::Created().json(response))
    }
}

/// Configure test execution item routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-execution-items").route(web::post().to(create_item)),
    )
    .service(
        web::resource("/test-execution-items/suite/{suite_id}")
            .route(web::get().to(get_items_for_suite)),
    )
    .service(
        web::resource("/test-execution-items/{id}/testcases")
            .route(web::get().to(get_item_testcases)),
    )
    .service(
        web::resource("/test-execution-items/{id}/start").route(web::post().to(start_test)),
    )
    .service(
        web::resource("/test-execution-items/{id}")
            .route(web::get().to(get_item))
            .route(web::put().to(update_item))
            .route(web::delete().to(delete_item)),
    );
}
