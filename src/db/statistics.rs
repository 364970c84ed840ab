//! Database queries for project and overall statistics.

use sea_orm::{ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, Statement};
use uuid::Uuid;

use crate::entity::project;
use crate::entity::requirement::{self, Entity as Requirement};
use crate::entity::testcase::{self, Entity as Testcase};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Count of test cases per status value.
#[derive(Debug, FromQueryResult)]
pub struct StatusCount {
    pub status: Option<String>,
    pub count: i64,
}

/// Requirement coverage: how many requirements have at least one linked
/// test case.
#[derive(Debug, FromQueryResult)]
pub struct CoverageCounts {
    pub total_requirements: i64,
    pub covered_requirements: i64,
}

/// Statistics for one project.
pub struct ProjectStatistics {
    pub project: project::Model,
    pub requirements_count: u64,
    pub testcases_count: u64,
    pub status_breakdown: Vec<StatusCount>,
    pub coverage: CoverageCounts,
}

/// Statistics across all projects.
pub struct OverallStatistics {
    pub projects_count: u64,
    pub requirements_count: u64,
    pub testcases_count: u64,
    pub status_breakdown: Vec<StatusCount>,
}

impl CoverageCounts {
    /// Coverage percentage rounded to two decimals; 0 when there are no
    /// requirements.
    pub fn percentage(&self) -> f64 {
        if self.total_requirements == 0 {
            return 0.0;
        }
        let raw = (self.covered_requirements as f64 / self.total_requirements as f64) * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

impl DbPool {
    /// Gather statistics for one project.
    pub async fn project_statistics(&self, project_id: Uuid) -> AppResult<ProjectStatistics> {
        let project = self.get_project(project_id).await?;

        let requirements_count = Requirement::find()
            .filter(requirement::Column::ProjectId.eq(project_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count requirements: {}", e)))?;

        let testcases_count = Testcase::find()
            .filter(testcase::Column::ProjectId.eq(project_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        let status_breakdown = StatusCount::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            r#"
                SELECT status, COUNT(*) AS count
                FROM testcases
                WHERE project_id = $1
                GROUP BY status
            "#,
            [project_id.into()],
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to query status breakdown: {}", e)))?;

        let coverage = CoverageCounts::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            r#"
                SELECT
                    COUNT(DISTINCT r.id) AS total_requirements,
                    COUNT(DISTINCT tr.requirement_id) AS covered_requirements
                FROM requirements r
                LEFT JOIN testcase_requirements tr ON tr.requirement_id = r.id
                WHERE r.project_id = $1
            "#,
            [project_id.into()],
        ))
        .one(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to query coverage: {}", e)))?
        .unwrap_or(CoverageCounts {
            total_requirements: 0,
            covered_requirements: 0,
        });

        Ok(ProjectStatistics {
            project,
            requirements_count,
            testcases_count,
            status_breakdown,
            coverage,
        })
    }

    /// Gather statistics across all projects.
    pub async fn overall_statistics(&self) -> AppResult<OverallStatistics> {
        let projects_count = project::Entity::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count projects: {}", e)))?;

        let requirements_count = Requirement::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count requirements: {}", e)))?;

        let testcases_count = Testcase::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        let status_breakdown = StatusCount::find_by_statement(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT status, COUNT(*) AS count FROM testcases GROUP BY status".to_owned(),
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to query status breakdown: {}", e)))?;

        Ok(OverallStatistics {
            projects_count,
            requirements_count,
            testcases_count,
            status_breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_percentage() {
        let coverage = CoverageCounts {
            total_requirements: 3,
            covered_requirements: 2,
        };
        assert_eq!(coverage.percentage(), 66.67);
    }

    #[test]
    fn test_coverage_percentage_no_requirements() {
        let coverage = CoverageCounts {
            total_requirements: 0,
            covered_requirements: 0,
        };
        assert_eq!(coverage.percentage(), 0.0);
    }

    #[test]
    fn test_coverage_percentage_full() {
        let coverage = CoverageCounts {
            total_requirements: 5,
            covered_requirements: 5,
        };
        assert_eq!(coverage.percentage(), 100.0);
    }
}
