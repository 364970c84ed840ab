//! Database queries for test cases, their steps, and requirement links.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use sea_orm::{ConnectionTrait, DatabaseTransaction};
use uuid::Uuid;

use crate::entity::project::Entity as Project;
use crate::entity::test_step::{self, ActiveModel as TestStepActiveModel, Entity as TestStep};
use crate::entity::testcase::{self, ActiveModel as TestcaseActiveModel, Entity as Testcase};
use crate::entity::testcase_requirement::{
    self, ActiveModel as LinkActiveModel, Entity as TestcaseRequirement,
};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// A test step to be inserted alongside a test case.
pub struct NewTestStep {
    pub step_number: i32,
    pub action: String,
    pub expected_result: String,
}

/// Represents a test case to be inserted. The id is a user-supplied
/// business key such as "TC-001".
pub struct NewTestcase {
    pub id: String,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub preconditions: Option<String>,
    pub postconditions: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub steps: Vec<NewTestStep>,
    pub requirement_ids: Vec<String>,
}

/// Fields accepted by a test case update. Steps and requirement links are
/// replaced wholesale.
pub struct UpdateTestcase {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub preconditions: Option<String>,
    pub postconditions: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub steps: Vec<NewTestStep>,
    pub requirement_ids: Vec<String>,
}

/// A test case model joined with its requirement-link ids.
pub struct TestcaseWithLinks {
    pub testcase: testcase::Model,
    pub requirement_ids: Vec<String>,
}

/// A fully loaded test case: row, ordered steps, and requirement links.
pub struct TestcaseDetail {
    pub testcase: testcase::Model,
    pub steps: Vec<test_step::Model>,
    pub requirement_ids: Vec<String>,
}

impl DbPool {
    /// Get all test cases in a project with their requirement links, newest
    /// first.
    pub async fn testcases_for_project(
        &self,
        project_id: Uuid,
    ) -> AppResult<Vec<TestcaseWithLinks>> {
        let testcases = Testcase::find()
            .filter(testcase::Column::ProjectId.eq(project_id))
            .order_by_desc(testcase::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query test cases: {}", e)))?;

        let ids: Vec<String> = testcases.iter().map(|tc| tc.id.clone()).collect();
        let links = if ids.is_empty() {
            Vec::new()
        } else {
            TestcaseRequirement::find()
                .filter(testcase_requirement::Column::TestcaseId.is_in(ids))
                .all(self.connection())
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to query requirement links: {}", e))
                })?
        };

        // Build a lookup map from test case id to its requirement ids.
        let mut link_map: std::collections::HashMap<String, Vec<String>> =
            std::collections::HashMap::new();
        for link in links {
            link_map
                .entry(link.testcase_id)
                .or_default()
                .push(link.requirement_id);
        }

        let result = testcases
            .into_iter()
            .map(|tc| {
                let requirement_ids = link_map.remove(&tc.id).unwrap_or_default();
                TestcaseWithLinks {
                    testcase: tc,
                    requirement_ids,
                }
            })
            .collect();

        Ok(result)
    }

    /// Get a single test case with its steps and requirement links.
    pub async fn get_testcase(&self, id: &str) -> AppResult<TestcaseDetail> {
        let testcase = Testcase::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load test case: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Test case".to_string()))?;

        let steps = TestStep::find()
            .filter(test_step::Column::TestcaseId.eq(id))
            .order_by_asc(test_step::Column::StepNumber)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load steps: {}", e)))?;

        let requirement_ids = TestcaseRequirement::find()
            .filter(testcase_requirement::Column::TestcaseId.eq(id))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load requirement links: {}", e)))?
            .into_iter()
            .map(|l| l.requirement_id)
            .collect();

        Ok(TestcaseDetail {
            testcase,
            steps,
            requirement_ids,
        })
    }

    /// Insert a test case with its steps and requirement links in one
    /// transaction.
    pub async fn insert_testcase(&self, new: NewTestcase) -> AppResult<TestcaseDetail> {
        let project = Project::find_by_id(new.project_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load project: {}", e)))?;
        if project.is_none() {
            return Err(AppError::InvalidInput(
                "project_id does not reference an existing project".to_string(),
            ));
        }

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let now = Utc::now();
        let model = TestcaseActiveModel {
            id: Set(new.id.clone()),
            project_id: Set(new.project_id),
            title: Set(new.title),
            description: Set(new.description),
            priority: Set(new.priority),
            category: Set(new.category),
            preconditions: Set(new.preconditions),
            postconditions: Set(new.postconditions),
            status: Set(new.status),
            tags: Set(Some(serde_json::to_value(&new.tags)?)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let testcase = model.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict(format!("Test case '{}' already exists", new.id))
            }
            _ => AppError::Database(format!("Failed to insert test case: {}", e)),
        })?;

        let steps = insert_steps(&txn, &testcase.id, &new.steps).await?;
        let requirement_ids = insert_links(&txn, &testcase.id, &new.requirement_ids).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit test case insert: {}", e)))?;

        Ok(TestcaseDetail {
            testcase,
            steps,
            requirement_ids,
        })
    }

    /// Update a test case, replacing its steps and requirement links, in one
    /// transaction.
    pub async fn update_testcase(&self, id: &str, update: UpdateTestcase) -> AppResult<TestcaseDetail> {
        let existing = Testcase::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load test case: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Test case".to_string()))?;

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut active: TestcaseActiveModel = existing.into();
        active.title = Set(update.title);
        active.description = Set(update.description);
        active.priority = Set(update.priority);
        active.category = Set(update.category);
        active.preconditions = Set(update.preconditions);
        active.postconditions = Set(update.postconditions);
        active.status = Set(update.status);
        active.tags = Set(Some(serde_json::to_value(&update.tags)?));
        active.updated_at = Set(Utc::now());

        let testcase = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update test case: {}", e)))?;

        TestStep::delete_many()
            .filter(test_step::Column::TestcaseId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear steps: {}", e)))?;
        TestcaseRequirement::delete_many()
            .filter(testcase_requirement::Column::TestcaseId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear requirement links: {}", e)))?;

        let steps = insert_steps(&txn, &testcase.id, &update.steps).await?;
        let requirement_ids = insert_links(&txn, &testcase.id, &update.requirement_ids).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit test case update: {}", e)))?;

        Ok(TestcaseDetail {
            testcase,
            steps,
            requirement_ids,
        })
    }

    /// Delete a test case; steps and requirement links cascade.
    pub async fn delete_testcase(&self, id: &str) -> AppResult<()> {
        let testcase = Testcase::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load test case: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Test case".to_string()))?;

        Testcase::delete_by_id(testcase.id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete test case: {}", e)))?;

        Ok(())
    }
}

async fn insert_steps(
    txn: &DatabaseTransaction,
    testcase_id: &str,
    steps: &[NewTestStep],
) -> AppResult<Vec<test_step::Model>> {
    let mut inserted = Vec::with_capacity(steps.len());
    for step in steps {
        let model = TestStepActiveModel {
            id: Set(Uuid::now_v7()),
            testcase_id: Set(testcase_id.to_string()),
            step_number: Set(step.step_number),
            action: Set(step.action.clone()),
            expected_result: Set(step.expected_result.clone()),
        };
        let step = model
            .insert(txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert step: {}", e)))?;
        inserted.push(step);
    }
    Ok(inserted)
}

async fn insert_links<C: ConnectionTrait>(
    conn: &C,
    testcase_id: &str,
    requirement_ids: &[String],
) -> AppResult<Vec<String>> {
    for requirement_id in requirement_ids {
        let model = LinkActiveModel {
            testcase_id: Set(testcase_id.to_string()),
            requirement_id: Set(requirement_id.clone()),
        };
        model.insert(conn).await.map_err(|e| {
            AppError::Database(format!("Failed to link requirement: {}", e))
        })?;
    }
    Ok(requirement_ids.to_vec())
}
