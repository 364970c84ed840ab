//! Database queries for test execution items.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Set,
    Statement, TransactionTrait,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::case_result::{self, Entity as CaseResult};
use crate::entity::exec_item::{self, ActiveModel as ExecItemActiveModel, Entity as ExecItem};
use crate::entity::exec_run::{self, Entity as ExecRun};
use crate::entity::exec_suite::Entity as ExecSuite;
use crate::entity::testcase::{self, Entity as Testcase};
use crate::entity::testcase_requirement::{self, Entity as TestcaseRequirement};
use crate::error::{AppError, AppResult};
use crate::models::ExecStatus;

use super::DbPool;
use super::exec_runs::recompute_suite_status;

/// An item annotated with how many runs it has accumulated.
#[derive(Debug, FromQueryResult)]
pub struct ItemWithRunCount {
    pub id: Uuid,
    pub suite_id: Uuid,
    pub name: String,
    pub requirement_ids: JsonValue,
    pub status: String,
    pub created_at: chrono::DateTime<Utc>,
    pub run_count: i64,
}

/// Represents an item to be inserted.
pub struct NewExecItem {
    pub suite_id: Uuid,
    pub name: String,
    pub requirement_ids: Vec<String>,
}

/// Fields accepted by an item update.
pub struct UpdateExecItem {
    pub name: String,
    pub requirement_ids: Vec<String>,
    pub status: Option<ExecStatus>,
}

impl DbPool {
    /// Get all items in a suite with their run counts, oldest first.
    pub async fn items_for_suite(&self, suite_id: Uuid) -> AppResult<Vec<ItemWithRunCount>> {
        let sql = r#"
            SELECT i.id, i.suite_id, i.name, i.requirement_ids, i.status, i.created_at,
                COUNT(DISTINCT r.id) AS run_count
            FROM test_execution_items i
            LEFT JOIN test_execution_runs r ON r.item_id = i.id
            WHERE i.suite_id = $1
            GROUP BY i.id
            ORDER BY i.created_at
        "#;

        let items = ItemWithRunCount::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            [suite_id.into()],
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to query items: {}", e)))?;

        Ok(items)
    }

    /// Get a single item by id.
    pub async fn get_item(&self, item_id: Uuid) -> AppResult<exec_item::Model> {
        ExecItem::find_by_id(item_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load item: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))
    }

    /// Get an item together with all its runs and their results, runs
    /// ordered by run number.
    pub async fn get_item_with_runs(
        &self,
        item_id: Uuid,
    ) -> AppResult<(
        exec_item::Model,
        Vec<(exec_run::Model, Vec<case_result::Model>)>,
    )> {
        let item = self.get_item(item_id).await?;

        let runs = ExecRun::find()
            .filter(exec_run::Column::ItemId.eq(item_id))
            .order_by_asc(exec_run::Column::RunNumber)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load runs: {}", e)))?;

        let run_ids: Vec<Uuid> = runs.iter().map(|r| r.id).collect();
        let all_results = if run_ids.is_empty() {
            Vec::new()
        } else {
            CaseResult::find()
                .filter(case_result::Column::RunId.is_in(run_ids))
                .order_by_asc(case_result::Column::ExecutedAt)
                .all(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to load results: {}", e)))?
        };

        // Group results by run (order within each group is preserved).
        let mut grouped: std::collections::HashMap<Uuid, Vec<case_result::Model>> =
            std::collections::HashMap::new();
        for result in all_results {
            grouped.entry(result.run_id).or_default().push(result);
        }

        let runs_with_results = runs
            .into_iter()
            .map(|run| {
                let results = grouped.remove(&run.id).unwrap_or_default();
                (run, results)
            })
            .collect();

        Ok((item, runs_with_results))
    }

    /// The test cases covered by an item: those whose requirement links
    /// intersect the item's requirement-id set. Computed at read time; the
    /// membership is never stored.
    pub async fn testcases_for_item(&self, item_id: Uuid) -> AppResult<Vec<testcase::Model>> {
        let item = self.get_item(item_id).await?;
        let requirement_ids = item.requirement_id_list();
        if requirement_ids.is_empty() {
            return Ok(Vec::new());
        }

        let links = TestcaseRequirement::find()
            .filter(testcase_requirement::Column::RequirementId.is_in(requirement_ids))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load requirement links: {}", e)))?;

        let testcase_ids: Vec<String> = links
            .into_iter()
            .map(|l| l.testcase_id)
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        if testcase_ids.is_empty() {
            return Ok(Vec::new());
        }

        let testcases = Testcase::find()
            .filter(testcase::Column::Id.is_in(testcase_ids))
            .order_by_asc(testcase::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load test cases: {}", e)))?;

        Ok(testcases)
    }

    /// Insert a new item into a suite.
    pub async fn insert_item(&self, item: NewExecItem) -> AppResult<exec_item::Model> {
        let suite = ExecSuite::find_by_id(item.suite_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load suite: {}", e)))?;
        if suite.is_none() {
            return Err(AppError::InvalidInput(
                "suite_id does not reference an existing suite".to_string(),
            ));
        }

        let model = ExecItemActiveModel {
            id: Set(Uuid::now_v7()),
            suite_id: Set(item.suite_id),
            name: Set(item.name),
            requirement_ids: Set(serde_json::to_value(&item.requirement_ids)?),
            status: Set(ExecStatus::NotStarted.as_str().to_string()),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert item: {}", e)))?;

        Ok(result)
    }

    /// Update an item's name, requirement set, and optionally its status.
    pub async fn update_item(
        &self,
        item_id: Uuid,
        update: UpdateExecItem,
    ) -> AppResult<exec_item::Model> {
        let item = self.get_item(item_id).await?;

        let mut active: ExecItemActiveModel = item.into();
        active.name = Set(update.name);
        active.requirement_ids = Set(serde_json::to_value(&update.requirement_ids)?);
        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
        }

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update item: {}", e)))?;

        Ok(result)
    }

    /// Delete an item (cascading to its runs and results) and refresh the
    /// suite's status cache, in one transaction.
    pub async fn delete_item(&self, item_id: Uuid) -> AppResult<()> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let item = ExecItem::find_by_id(item_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to load item: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let suite_id = item.suite_id;
        ExecItem::delete_by_id(item_id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete item: {}", e)))?;

        recompute_suite_status(&txn, suite_id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit item deletion: {}", e)))?;

        Ok(())
    }
}
