//! Requirement API handlers.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::requirements::{NewRequirement, UpdateRequirement};
use crate::entity::requirement;
use crate::error::{AppError, AppResult};

use super::exec_runs::MessageResponse;

/// Response for a requirement.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequirementResponse {
    pub id: String,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<requirement::Model> for RequirementResponse {
    fn from(req: requirement::Model) -> Self {
        RequirementResponse {
            id: req.id,
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            category: req.category,
            sub_category: req.sub_category,
            priority: req.priority,
            status: req.status,
            notes: req.notes,
            created_at: req.created_at,
            updated_at: req.updated_at,
        }
    }
}

/// Request to create a requirement. The id is a user-supplied business key
/// such as "REQ-001".
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequirementRequest {
    pub id: Option<String>,
    pub project_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Request to update a requirement.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequirementRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Get all requirements in a project.
#[utoipa::path(
    get,
    path = "/api/requirements/project/{project_id}",
    tag = "Requirements",
    params(
        ("project_id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Requirements in the project", body = [RequirementResponse]),
    )
)]
pub async fn get_requirements_for_project(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project_id = path.into_inner();
    let requirements = pool.requirements_for_project(project_id).await?;

    let response: Vec<RequirementResponse> = requirements
        .into_iter()
        .map(RequirementResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a single requirement.
#[utoipa::path(
    get,
    path = "/api/requirements/{id}",
    tag = "Requirements",
    params(
        ("id" = String, Path, description = "Requirement id (e.g. REQ-001)")
    ),
    responses(
        (status = 200, description = "Requirement", body = RequirementResponse),
        (status = 404, description = "Requirement not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_requirement(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let requirement = pool.get_requirement(&id).await?;

    Ok(HttpResponse::Ok().json(RequirementResponse::from(requirement)))
}

/// Create a requirement.
#[utoipa::path(
    post,
    path = "/api/requirements",
    tag = "Requirements",
    request_body = CreateRequirementRequest,
    responses(
        (status = 201, description = "Requirement created", body = RequirementResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorResponse),
        (status = 409, description = "Requirement id already exists", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_requirement(
    pool: web::Data<DbPool>,
    body: web::Json<CreateRequirementRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(id), Some(project_id), Some(title)) = (body.id, body.project_id, body.title) else {
        return Err(AppError::InvalidInput(
            "id, project_id, and title are required".to_string(),
        ));
    };

    let requirement = pool
        .insert_requirement(NewRequirement {
            id,
            project_id,
            title,
            description: body.description,
            category: body.category,
            sub_category: body.sub_category,
            priority: body.priority,
            status: body.status,
            notes: body.notes,
        })
        .await?;

    Ok(HttpResponse::Created().json(RequirementResponse::from(requirement)))
}

/// Update a requirement.
#[utoipa::path(
    put,
    path = "/api/requirements/{id}",
    tag = "Requirements",
    params(
        ("id" = String, Path, description = "Requirement id")
    ),
    request_body = UpdateRequirementRequest,
    responses(
        (status = 200, description = "Requirement updated", body = RequirementResponse),
        (status = 404, description = "Requirement not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_requirement(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<UpdateRequirementRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let body = body.into_inner();

    let Some(title) = body.title else {
        return Err(AppError::InvalidInput("title is required".to_string()));
    };

    let requirement = pool
        .update_requirement(
            &id,
            UpdateRequirement {
                title,
                description: body.description,
                category: body.category,
                sub_category: body.sub_category,
                priority: body.priority,
                status: body.status,
                notes: body.notes,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(RequirementResponse::from(requirement)))
}

/// Delete a requirement.
#[utoipa::path(
    delete,
    path = "/api/requirements/{id}",
    tag = "Requirements",
    params(
        ("id" = String, Path, description = "Requirement id")
    ),
    responses(
        (status = 200, description = "Requirement deleted", body = MessageResponse),
        (status = 404, description = "Requirement not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_requirement(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    pool.delete_requirement(&id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Requirement deleted successfully".to_string(),
    }))
}

/// Configure requirement routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/requirements").route(web::post().to(create_requirement)))
        .service(
            web::resource("/requirements/project/{project_id}")
                .route(web::get().to(get_requirements_for_project)),
        )
        .service(
            web::resource("/requirements/{id}")
                .route(web::get().to(get_requirement))
                .route(web::put().to(update_requirement))
                .route(web::delete().to(delete_requirement)),
        );
}
