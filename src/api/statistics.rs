//! Statistics API handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::statistics::StatusCount;
use crate::error::AppResult;

use super::projects::ProjectResponse;

/// Count of test cases per status value.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCountResponse {
    pub status: Option<String>,
    pub count: i64,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(entry: StatusCount) -> Self {
        StatusCountResponse {
            status: entry.status,
            count: entry.count,
        }
    }
}

/// Requirement coverage summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct CoverageResponse {
    pub total: i64,
    pub covered: i64,
    pub percentage: f64,
}

/// Statistics for one project.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectStatisticsResponse {
    pub project: ProjectResponse,
    pub requirements_count: u64,
    pub testcases_count: u64,
    pub status_breakdown: Vec<StatusCountResponse>,
    pub coverage: CoverageResponse,
}

/// Statistics across all projects.
#[derive(Debug, Serialize, ToSchema)]
pub struct OverallStatisticsResponse {
    pub projects_count: u64,
    pub requirements_count: u64,
    pub testcases_count: u64,
    pub status_breakdown: Vec<StatusCountResponse>,
}

/// Get statistics for one project.
#[utoipa::path(
    get,
    path = "/api/statistics/project/{project_id}",
    tag = "Statistics",
    params(
        ("project_id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Project statistics", body = ProjectStatisticsResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_project_statistics(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let project_id = path.into_inner();
    let stats = pool.project_statistics(project_id).await?;

    let response = ProjectStatisticsResponse {
        project: ProjectResponse::from(stats.project),
        requirements_count: stats.requirements_count,
        testcases_count: stats.testcases_count,
        status_breakdown: stats
            .status_breakdown
            .into_iter()
            .map(StatusCountResponse::from)
            .collect(),
        coverage: CoverageResponse {
            total: stats.coverage.total_requirements,
            covered: stats.coverage.covered_requirements,
            percentage: stats.coverage.percentage(),
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Get statistics across all projects.
#[utoipa::path(
    get,
    path = "/api/statistics/overall",
    tag = "Statistics",
    responses(
        (status = 200, description = "Overall statistics", body = OverallStatisticsResponse),
    )
)]
pub async fn get_overall_statistics(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let stats = pool.overall_statistics().await?;

    let response = OverallStatisticsResponse {
        projects_count: stats.projects_count,
        requirements_count: stats.requirements_count,
        testcases_count: stats.testcases_count,
        status_breakdown: stats
            .status_breakdown
            .into_iter()
            .map(StatusCountResponse::from)
            .collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Configure statistics routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/statistics/project/{project_id}")
            .route(web::get().to(get_project_statistics)),
    )
    .service(
        web::resource("/statistics/overall").route(web::get().to(get_overall_statistics)),
    );
}
