//! Database queries for requirements.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr};
use uuid::Uuid;

use crate::entity::project::Entity as Project;
use crate::entity::requirement::{self, ActiveModel as RequirementActiveModel, Entity as Requirement};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Represents a requirement to be inserted. The id is a user-supplied
/// business key such as "REQ-001".
pub struct NewRequirement {
    pub id: String,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Fields accepted by a requirement update.
pub struct UpdateRequirement {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl DbPool {
    /// Get all requirements in a project, newest first.
    pub async fn requirements_for_project(
        &self,
        project_id: Uuid,
    ) -> AppResult<Vec<requirement::Model>> {
        let requirements = Requirement::find()
            .filter(requirement::Column::ProjectId.eq(project_id))
            .order_by_desc(requirement::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query requirements: {}", e)))?;

        Ok(requirements)
    }

    /// Get a single requirement by id.
    pub async fn get_requirement(&self, id: &str) -> AppResult<requirement::Model> {
        Requirement::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load requirement: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Requirement".to_string()))
    }

    /// Insert a new requirement.
    pub async fn insert_requirement(&self, req: NewRequirement) -> AppResult<requirement::Model> {
        let project = Project::find_by_id(req.project_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load project: {}", e)))?;
        if project.is_none() {
            return Err(AppError::InvalidInput(
                "project_id does not reference an existing project".to_string(),
            ));
        }

        let now = Utc::now();
        let model = RequirementActiveModel {
            id: Set(req.id.clone()),
            project_id: Set(req.project_id),
            title: Set(req.title),
            description: Set(req.description),
            category: Set(req.category),
            sub_category: Set(req.sub_category),
            priority: Set(req.priority),
            status: Set(req.status),
            notes: Set(req.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(self.connection()).await.map_err(|e| {
            match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::Conflict(format!("Requirement '{}' already exists", req.id))
                }
                _ => AppError::Database(format!("Failed to insert requirement: {}", e)),
            }
        })?;

        Ok(result)
    }

    /// Update a requirement.
    pub async fn update_requirement(
        &self,
        id: &str,
        update: UpdateRequirement,
    ) -> AppResult<requirement::Model> {
        let requirement = self.get_requirement(id).await?;

        let mut active: RequirementActiveModel = requirement.into();
        active.title = Set(update.title);
        active.description = Set(update.description);
        active.category = Set(update.category);
        active.sub_category = Set(update.sub_category);
        active.priority = Set(update.priority);
        active.status = Set(update.status);
        active.notes = Set(update.notes);
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update requirement: {}", e)))?;

        Ok(result)
    }

    /// Delete a requirement; test-case links cascade.
    pub async fn delete_requirement(&self, id: &str) -> AppResult<()> {
        let requirement = self.get_requirement(id).await?;

        Requirement::delete_by_id(requirement.id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete requirement: {}", e)))?;

        Ok(())
    }
}
