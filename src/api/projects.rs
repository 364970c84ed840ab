//! Project API handlers.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::project;
use crate::error::{AppError, AppResult};

use super::exec_runs::MessageResponse;

/// Response for a project.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<project::Model> for ProjectResponse {
    fn from(project: project::Model) -> Self {
        ProjectResponse {
            id: project.id,
            name: project.name,
            description: project.description,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Request to create a project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Request to update a project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// List all projects, newest first.
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "All projects", body = [ProjectResponse]),
    )
)]
pub async fn list_projects(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let projects = pool.list_projects().await?;

    let response: Vec<ProjectResponse> =
        projects.into_iter().map(ProjectResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a single project.
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_project(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project_id = path.into_inner();
    let project = pool.get_project(project_id).await?;

    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

/// Create a project.
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Missing name", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_project(
    pool: web::Data<DbPool>,
    body: web::Json<CreateProjectRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let Some(name) = body.name.filter(|n| !n.is_empty()) else {
        return Err(AppError::InvalidInput("Project name is required".to_string()));
    };

    let project = pool.insert_project(name, body.description).await?;

    Ok(HttpResponse::Created().json(ProjectResponse::from(project)))
}

/// Update a project.
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project UUID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_project(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProjectRequest>,
) -> AppResult<HttpResponse> {
    let project_id = path.into_inner();
    let body = body.into_inner();

    let Some(name) = body.name.filter(|n| !n.is_empty()) else {
        return Err(AppError::InvalidInput("Project name is required".to_string()));
    };

    let project = pool
        .update_project(project_id, name, body.description)
        .await?;

    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

/// Delete a project and everything scoped to it.
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_project(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project_id = path.into_inner();
    pool.delete_project(project_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Project deleted successfully".to_string(),
    }))
}

/// Configure project routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects")
            .route(web::get().to(list_projects))
            .route(web::post().to(create_project)),
    )
    .service(
        web::resource("/projects/{id}")
            .route(web::get().to(get_project))
            .route(web::put().to(update_project))
            .route(web::delete().to(delete_project)),
    );
}
