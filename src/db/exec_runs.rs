//! Database queries for test execution runs and per-test-case results.
//!
//! Run creation, rerun carry-over, completion rollup, and the start-test
//! (resume/discard) flow all live here. Every multi-step write runs inside
//! one transaction; run numbering is protected by the unique index on
//! (item_id, run_number) with a bounded retry on conflict.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, Set, SqlErr, Statement, TransactionTrait,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::case_result::{self, ActiveModel as CaseResultActiveModel, Entity as CaseResult};
use crate::entity::exec_item::{self, Entity as ExecItem};
use crate::entity::exec_run::{self, ActiveModel as ExecRunActiveModel, Entity as ExecRun};
use crate::entity::exec_suite::{self, Entity as ExecSuite};
use crate::error::{AppError, AppResult};
use crate::models::{
    CaseVerdict, ExecStatus, RerunType, StartAction, StartDecision, StepResult, carries_forward,
    resolve_start, run_verdict, suite_rollup,
};

use super::DbPool;

/// Attempts at claiming a run number before giving up. Two concurrent
/// starters conflict at most once each; three attempts is already generous.
const RUN_NUMBER_RETRIES: usize = 3;

/// A run annotated with aggregate result counts.
#[derive(Debug, FromQueryResult)]
pub struct RunWithCounts {
    pub id: Uuid,
    pub item_id: Uuid,
    pub run_number: i32,
    pub executed_by: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub started_at: chrono::DateTime<Utc>,
    pub completed_at: Option<chrono::DateTime<Utc>>,
    pub total_tests: i64,
    pub pass_count: i64,
    pub fail_count: i64,
    pub block_count: i64,
    pub skip_count: i64,
}

/// Outcome of a start-test request.
pub struct StartOutcome {
    pub run: exec_run::Model,
    /// True when an existing open run was resumed rather than created.
    pub resumed: bool,
}

/// New per-test-case result to upsert into a run.
pub struct NewCaseResult {
    pub testcase_id: String,
    pub result: CaseVerdict,
    pub notes: Option<String>,
    pub step_results: Option<Vec<StepResult>>,
}

enum RunInsertError {
    /// Another transaction claimed the same run number first.
    NumberTaken,
    Other(AppError),
}

impl DbPool {
    /// Create a new numbered run for an item.
    ///
    /// Rejects with a conflict while the item still has an open run; clients
    /// route through [`DbPool::start_test`] to resolve resume-or-discard.
    pub async fn create_run(
        &self,
        item_id: Uuid,
        executed_by: Option<String>,
        rerun_type: Option<RerunType>,
    ) -> AppResult<exec_run::Model> {
        ensure_item_exists(self.connection(), item_id).await?;

        if let Some(open) = find_open_run(self.connection(), item_id).await? {
            return Err(AppError::Conflict(format!(
                "Item has an open run (run {}); resume or discard it first",
                open.run_number
            )));
        }

        self.create_numbered_run(item_id, executed_by, rerun_type)
            .await
    }

    /// Start-test flow for an item: resolves the resume/discard decision
    /// against any open run, then creates or resumes accordingly.
    pub async fn start_test(
        &self,
        item_id: Uuid,
        executed_by: Option<String>,
        rerun_type: Option<RerunType>,
        decision: Option<StartDecision>,
    ) -> AppResult<StartOutcome> {
        ensure_item_exists(self.connection(), item_id).await?;

        let open_run = find_open_run(self.connection(), item_id).await?;
        match resolve_start(open_run.as_ref().map(|r| r.id), decision) {
            StartAction::Create => {
                let run = self
                    .create_numbered_run(item_id, executed_by, rerun_type)
                    .await?;
                Ok(StartOutcome { run, resumed: false })
            }
            StartAction::Resume(_) => {
                let run = open_run.expect("resolve_start returned Resume without an open run");
                Ok(StartOutcome { run, resumed: true })
            }
            StartAction::DiscardAndCreate(_) => {
                let open = open_run.expect("resolve_start returned Discard without an open run");
                let run = self
                    .discard_and_create(open, executed_by, rerun_type)
                    .await?;
                Ok(StartOutcome { run, resumed: false })
            }
            StartAction::NeedsDecision(run_id) => Err(AppError::Conflict(format!(
                "Item has an open run ({}); supply decision=resume or decision=discard",
                run_id
            ))),
        }
    }

    /// Upsert the outcome of one test case within a run.
    ///
    /// Keyed on (run_id, testcase_id); a second save updates result, notes,
    /// step results, and executed_at in place. No status rollup happens here.
    pub async fn save_result(
        &self,
        run_id: Uuid,
        new: NewCaseResult,
    ) -> AppResult<case_result::Model> {
        ExecRun::find_by_id(run_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load run: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Run".to_string()))?;

        let step_results = match &new.step_results {
            Some(steps) => serde_json::to_value(steps)?,
            None => JsonValue::Array(Vec::new()),
        };

        let model = CaseResultActiveModel {
            id: Set(Uuid::now_v7()),
            run_id: Set(run_id),
            testcase_id: Set(new.testcase_id),
            result: Set(new.result.as_str().to_string()),
            notes: Set(new.notes),
            step_results: Set(step_results),
            executed_at: Set(Utc::now()),
        };

        let on_conflict = OnConflict::columns([
            case_result::Column::RunId,
            case_result::Column::TestcaseId,
        ])
        .update_columns([
            case_result::Column::Result,
            case_result::Column::Notes,
            case_result::Column::StepResults,
            case_result::Column::ExecutedAt,
        ])
        .to_owned();

        let result = CaseResult::insert(model)
            .on_conflict(on_conflict)
            .exec_with_returning(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to save result: {}", e)))?;

        Ok(result)
    }

    /// Finalize a run: derive its status from recorded results and cascade
    /// the rollup to the owning item and suite, all in one transaction.
    pub async fn complete_run(
        &self,
        run_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<exec_run::Model> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let run = ExecRun::find_by_id(run_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to load run: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Run".to_string()))?;

        let results = CaseResult::find()
            .filter(case_result::Column::RunId.eq(run_id))
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to load results: {}", e)))?;

        let final_status = run_verdict(
            results
                .iter()
                .filter_map(|r| CaseVerdict::parse(&r.result)),
        );

        let item_id = run.item_id;
        let mut active: ExecRunActiveModel = run.into();
        active.status = Set(final_status.as_str().to_string());
        active.notes = Set(notes);
        active.completed_at = Set(Some(Utc::now()));
        let run = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update run: {}", e)))?;

        // The completed run is the latest by construction; its verdict
        // becomes the item's status, then the suite rollup follows.
        let item = set_item_status(&txn, item_id, final_status).await?;
        recompute_suite_status(&txn, item.suite_id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit run completion: {}", e)))?;

        Ok(run)
    }

    /// Delete a run and its results, then refresh the item and suite status
    /// caches from what remains.
    pub async fn delete_run(&self, run_id: Uuid) -> AppResult<()> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let run = ExecRun::find_by_id(run_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to load run: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Run".to_string()))?;

        let item_id = run.item_id;
        ExecRun::delete_by_id(run_id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete run: {}", e)))?;

        let item = recompute_item_status(&txn, item_id).await?;
        recompute_suite_status(&txn, item.suite_id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit run deletion: {}", e)))?;

        Ok(())
    }

    /// Get all runs for an item, annotated with per-verdict result counts,
    /// ordered by run number.
    pub async fn runs_for_item(&self, item_id: Uuid) -> AppResult<Vec<RunWithCounts>> {
        let sql = r#"
            SELECT r.id, r.item_id, r.run_number, r.executed_by, r.status,
                r.notes, r.started_at, r.completed_at,
                COUNT(tcr.id) AS total_tests,
                COALESCE(SUM(CASE WHEN tcr.result = 'Pass' THEN 1 ELSE 0 END), 0)::BIGINT AS pass_count,
                COALESCE(SUM(CASE WHEN tcr.result = 'Fail' THEN 1 ELSE 0 END), 0)::BIGINT AS fail_count,
                COALESCE(SUM(CASE WHEN tcr.result = 'Block' THEN 1 ELSE 0 END), 0)::BIGINT AS block_count,
                COALESCE(SUM(CASE WHEN tcr.result = 'Skip' THEN 1 ELSE 0 END), 0)::BIGINT AS skip_count
            FROM test_execution_runs r
            LEFT JOIN test_case_results tcr ON tcr.run_id = r.id
            WHERE r.item_id = $1
            GROUP BY r.id
            ORDER BY r.run_number
        "#;

        let runs = RunWithCounts::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            [item_id.into()],
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to query runs: {}", e)))?;

        Ok(runs)
    }

    /// Get a single run together with its results, ordered by execution time.
    pub async fn get_run_with_results(
        &self,
        run_id: Uuid,
    ) -> AppResult<(exec_run::Model, Vec<case_result::Model>)> {
        let run = ExecRun::find_by_id(run_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load run: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Run".to_string()))?;

        let results = CaseResult::find()
            .filter(case_result::Column::RunId.eq(run_id))
            .order_by_asc(case_result::Column::ExecutedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load results: {}", e)))?;

        Ok((run, results))
    }

    /// Claim the next run number and insert the run (plus any carry-over
    /// results) in one transaction, retrying when a concurrent creator wins
    /// the unique index race on (item_id, run_number).
    async fn create_numbered_run(
        &self,
        item_id: Uuid,
        executed_by: Option<String>,
        rerun_type: Option<RerunType>,
    ) -> AppResult<exec_run::Model> {
        for _ in 0..RUN_NUMBER_RETRIES {
            let txn = self
                .connection()
                .begin()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            match insert_next_run(&txn, item_id, executed_by.clone(), rerun_type, 0).await {
                Ok(run) => {
                    txn.commit().await.map_err(|e| {
                        AppError::Database(format!("Failed to commit run creation: {}", e))
                    })?;
                    return Ok(run);
                }
                Err(RunInsertError::NumberTaken) => {
                    txn.rollback().await.ok();
                    continue;
                }
                Err(RunInsertError::Other(e)) => {
                    txn.rollback().await.ok();
                    return Err(e);
                }
            }
        }

        Err(AppError::Database(
            "Run number assignment kept conflicting with concurrent creations".to_string(),
        ))
    }

    /// Discard an abandoned open run and start a fresh one in a single
    /// transaction. The fresh run is numbered past the discarded one, so run
    /// numbers are never reused even though a gap appears where the
    /// discarded run was.
    async fn discard_and_create(
        &self,
        open: exec_run::Model,
        executed_by: Option<String>,
        rerun_type: Option<RerunType>,
    ) -> AppResult<exec_run::Model> {
        for _ in 0..RUN_NUMBER_RETRIES {
            let txn = self
                .connection()
                .begin()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            ExecRun::delete_by_id(open.id)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to discard run: {}", e)))?;

            let item = recompute_item_status(&txn, open.item_id).await?;
            recompute_suite_status(&txn, item.suite_id).await?;

            match insert_next_run(
                &txn,
                open.item_id,
                executed_by.clone(),
                rerun_type,
                open.run_number,
            )
            .await
            {
                Ok(run) => {
                    txn.commit().await.map_err(|e| {
                        AppError::Database(format!("Failed to commit discard-and-create: {}", e))
                    })?;
                    return Ok(run);
                }
                Err(RunInsertError::NumberTaken) => {
                    txn.rollback().await.ok();
                    continue;
                }
                Err(RunInsertError::Other(e)) => {
                    txn.rollback().await.ok();
                    return Err(e);
                }
            }
        }

        Err(AppError::Database(
            "Run number assignment kept conflicting with concurrent creations".to_string(),
        ))
    }
}

/// Insert a run numbered one past the item's current maximum (and past
/// `floor`, which protects a just-discarded number from reuse), applying the
/// rerun carry-over policy against the run numbered exactly one below.
async fn insert_next_run(
    txn: &DatabaseTransaction,
    item_id: Uuid,
    executed_by: Option<String>,
    rerun_type: Option<RerunType>,
    floor: i32,
) -> Result<exec_run::Model, RunInsertError> {
    let latest_number = ExecRun::find()
        .filter(exec_run::Column::ItemId.eq(item_id))
        .order_by_desc(exec_run::Column::RunNumber)
        .one(txn)
        .await
        .map_err(|e| {
            RunInsertError::Other(AppError::Database(format!(
                "Failed to read latest run: {}",
                e
            )))
        })?
        .map(|r| r.run_number)
        .unwrap_or(0);

    let next_number = latest_number.max(floor) + 1;

    let model = ExecRunActiveModel {
        id: Set(Uuid::now_v7()),
        item_id: Set(item_id),
        run_number: Set(next_number),
        executed_by: Set(executed_by),
        status: Set(ExecStatus::InProgress.as_str().to_string()),
        notes: Set(None),
        started_at: Set(Utc::now()),
        completed_at: Set(None),
    };

    let run = match model.insert(txn).await {
        Ok(run) => run,
        Err(e) => {
            return Err(match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => RunInsertError::NumberTaken,
                _ => RunInsertError::Other(AppError::Database(format!(
                    "Failed to insert run: {}",
                    e
                ))),
            });
        }
    };

    // Carry-over reads the immediately preceding run by exact number; after
    // a discard that number is gone and nothing is copied.
    if let Some(rerun) = rerun_type
        && next_number > 1
    {
        let previous = ExecRun::find()
            .filter(exec_run::Column::ItemId.eq(item_id))
            .filter(exec_run::Column::RunNumber.eq(next_number - 1))
            .one(txn)
            .await
            .map_err(|e| {
                RunInsertError::Other(AppError::Database(format!(
                    "Failed to read previous run: {}",
                    e
                )))
            })?;

        if let Some(prev) = previous {
            carry_results_forward(txn, &prev, &run, rerun)
                .await
                .map_err(RunInsertError::Other)?;
        }
    }

    Ok(run)
}

/// Copy forward the previous run's still-good outcomes into the new run.
///
/// Only result and notes travel; step results reset and executed_at is
/// stamped fresh. `RerunType::All` copies nothing.
async fn carry_results_forward(
    txn: &DatabaseTransaction,
    previous: &exec_run::Model,
    new_run: &exec_run::Model,
    rerun: RerunType,
) -> AppResult<()> {
    if rerun == RerunType::All {
        return Ok(());
    }

    let prior_results = CaseResult::find()
        .filter(case_result::Column::RunId.eq(previous.id))
        .all(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load previous results: {}", e)))?;

    let now = Utc::now();
    for prior in prior_results {
        let Some(verdict) = CaseVerdict::parse(&prior.result) else {
            continue;
        };
        if !carries_forward(rerun, verdict) {
            continue;
        }

        let copy = CaseResultActiveModel {
            id: Set(Uuid::now_v7()),
            run_id: Set(new_run.id),
            testcase_id: Set(prior.testcase_id),
            result: Set(prior.result),
            notes: Set(prior.notes),
            step_results: Set(JsonValue::Array(Vec::new())),
            executed_at: Set(now),
        };
        copy.insert(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to carry result forward: {}", e)))?;
    }

    Ok(())
}

/// Find any open (`In Progress`) run for an item. Detection does not assume
/// uniqueness; the highest-numbered open run is selected.
pub async fn find_open_run<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
) -> AppResult<Option<exec_run::Model>> {
    let run = ExecRun::find()
        .filter(exec_run::Column::ItemId.eq(item_id))
        .filter(exec_run::Column::Status.eq(ExecStatus::InProgress.as_str()))
        .order_by_desc(exec_run::Column::RunNumber)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to look up open run: {}", e)))?;

    Ok(run)
}

/// Item status aggregator: item.status := status of the highest-numbered
/// run, or `Not Started` when no runs remain.
pub async fn recompute_item_status<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
) -> AppResult<exec_item::Model> {
    let latest = ExecRun::find()
        .filter(exec_run::Column::ItemId.eq(item_id))
        .order_by_desc(exec_run::Column::RunNumber)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to read latest run: {}", e)))?;

    let status = latest
        .and_then(|r| ExecStatus::parse(&r.status))
        .unwrap_or(ExecStatus::NotStarted);

    set_item_status(conn, item_id, status).await
}

/// Suite status aggregator: suite.status := precedence rollup over all item
/// statuses (Fail > Block > In Progress > Pass; empty stays Not Started).
pub async fn recompute_suite_status<C: ConnectionTrait>(
    conn: &C,
    suite_id: Uuid,
) -> AppResult<ExecStatus> {
    let items = ExecItem::find()
        .filter(exec_item::Column::SuiteId.eq(suite_id))
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load suite items: {}", e)))?;

    let statuses: Vec<ExecStatus> = items
        .iter()
        .filter_map(|i| ExecStatus::parse(&i.status))
        .collect();
    let status = suite_rollup(&statuses);

    let suite = ExecSuite::find_by_id(suite_id)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load suite: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Suite".to_string()))?;

    let mut active: exec_suite::ActiveModel = suite.into();
    active.status = Set(status.as_str().to_string());
    active
        .update(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update suite status: {}", e)))?;

    Ok(status)
}

async fn set_item_status<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
    status: ExecStatus,
) -> AppResult<exec_item::Model> {
    let item = ExecItem::find_by_id(item_id)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load item: {}", e)))?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

    let mut active: exec_item::ActiveModel = item.into();
    active.status = Set(status.as_str().to_string());
    let item = active
        .update(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update item status: {}", e)))?;

    Ok(item)
}

async fn ensure_item_exists<C: ConnectionTrait>(conn: &C, item_id: Uuid) -> AppResult<()> {
    let found = ExecItem::find_by_id(item_id)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load item: {}", e)))?;

    match found {
        Some(_) => Ok(()),
        None => Err(AppError::InvalidInput(
            "item_id does not reference an existing item".to_string(),
        )),
    }
}
