//! Database queries for test execution suites.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, EntityTrait, FromQueryResult, Set, Statement,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::exec_suite::{self, ActiveModel as ExecSuiteActiveModel, Entity as ExecSuite};
use crate::entity::project::Entity as Project;
use crate::error::{AppError, AppResult};
use crate::models::ExecStatus;

use super::DbPool;

/// A suite annotated with item and run counts.
#[derive(Debug, FromQueryResult)]
pub struct SuiteWithCounts {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: chrono::DateTime<Utc>,
    pub item_count: i64,
    pub run_count: i64,
}

/// An item row inside a suite detail view, annotated with its run count and
/// the status of its latest run.
#[derive(Debug, FromQueryResult)]
pub struct SuiteItemSummary {
    pub id: Uuid,
    pub suite_id: Uuid,
    pub name: String,
    pub requirement_ids: JsonValue,
    pub status: String,
    pub created_at: chrono::DateTime<Utc>,
    pub run_count: i64,
    pub latest_run_status: Option<String>,
}

/// Represents a suite to be inserted.
pub struct NewExecSuite {
    pub project_id: Uuid,
    pub name: String,
    pub purpose: Option<String>,
    pub description: Option<String>,
}

/// Fields accepted by a suite update.
pub struct UpdateExecSuite {
    pub name: String,
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub status: Option<ExecStatus>,
}

impl DbPool {
    /// Get all suites in a project with item/run counts, newest first.
    pub async fn suites_for_project(&self, project_id: Uuid) -> AppResult<Vec<SuiteWithCounts>> {
        let sql = r#"
            SELECT s.id, s.project_id, s.name, s.purpose, s.description, s.status, s.created_at,
                COUNT(DISTINCT i.id) AS item_count,
                COUNT(DISTINCT r.id) AS run_count
            FROM test_execution_suites s
            LEFT JOIN test_execution_items i ON i.suite_id = s.id
            LEFT JOIN test_execution_runs r ON r.item_id = i.id
            WHERE s.project_id = $1
            GROUP BY s.id
            ORDER BY s.created_at DESC
        "#;

        let suites = SuiteWithCounts::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            [project_id.into()],
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to query suites: {}", e)))?;

        Ok(suites)
    }

    /// Get a single suite by id.
    pub async fn get_suite(&self, suite_id: Uuid) -> AppResult<exec_suite::Model> {
        ExecSuite::find_by_id(suite_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load suite: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Suite".to_string()))
    }

    /// Get a suite together with item summaries (run count and latest run
    /// status per item), items oldest first.
    pub async fn get_suite_with_items(
        &self,
        suite_id: Uuid,
    ) -> AppResult<(exec_suite::Model, Vec<SuiteItemSummary>)> {
        let suite = self.get_suite(suite_id).await?;

        let sql = r#"
            SELECT i.id, i.suite_id, i.name, i.requirement_ids, i.status, i.created_at,
                COUNT(DISTINCT r.id) AS run_count,
                (SELECT r2.status FROM test_execution_runs r2
                 WHERE r2.item_id = i.id
                 ORDER BY r2.run_number DESC LIMIT 1) AS latest_run_status
            FROM test_execution_items i
            LEFT JOIN test_execution_runs r ON r.item_id = i.id
            WHERE i.suite_id = $1
            GROUP BY i.id
            ORDER BY i.created_at
        "#;

        let items = SuiteItemSummary::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            [suite_id.into()],
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to query suite items: {}", e)))?;

        Ok((suite, items))
    }

    /// Insert a new suite into a project.
    pub async fn insert_suite(&self, suite: NewExecSuite) -> AppResult<exec_suite::Model> {
        let project = Project::find_by_id(suite.project_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load project: {}", e)))?;
        if project.is_none() {
            return Err(AppError::InvalidInput(
                "project_id does not reference an existing project".to_string(),
            ));
        }

        let model = ExecSuiteActiveModel {
            id: Set(Uuid::now_v7()),
            project_id: Set(suite.project_id),
            name: Set(suite.name),
            purpose: Set(suite.purpose),
            description: Set(suite.description),
            status: Set(ExecStatus::NotStarted.as_str().to_string()),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert suite: {}", e)))?;

        Ok(result)
    }

    /// Update a suite's descriptive fields and optionally its status.
    pub async fn update_suite(
        &self,
        suite_id: Uuid,
        update: UpdateExecSuite,
    ) -> AppResult<exec_suite::Model> {
        let suite = self.get_suite(suite_id).await?;

        let mut active: ExecSuiteActiveModel = suite.into();
        active.name = Set(update.name);
        active.purpose = Set(update.purpose);
        active.description = Set(update.description);
        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
        }

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update suite: {}", e)))?;

        Ok(result)
    }

    /// Delete a suite; its items, runs, and results go with it via cascade.
    pub async fn delete_suite(&self, suite_id: Uuid) -> AppResult<()> {
        let suite = self.get_suite(suite_id).await?;

        ExecSuite::delete_by_id(suite.id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete suite: {}", e)))?;

        Ok(())
    }
}
