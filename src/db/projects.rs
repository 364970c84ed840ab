//! Database queries for projects.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::project::{self, ActiveModel as ProjectActiveModel, Entity as Project};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Get all projects, newest first.
    pub async fn list_projects(&self) -> AppResult<Vec<project::Model>> {
        let projects = Project::find()
            .order_by_desc(project::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query projects: {}", e)))?;

        Ok(projects)
    }

    /// Get a single project by id.
    pub async fn get_project(&self, project_id: Uuid) -> AppResult<project::Model> {
        Project::find_by_id(project_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load project: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))
    }

    /// Insert a new project.
    pub async fn insert_project(
        &self,
        name: String,
        description: Option<String>,
    ) -> AppResult<project::Model> {
        let now = Utc::now();

        let model = ProjectActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert project: {}", e)))?;

        Ok(result)
    }

    /// Update a project's name and description.
    pub async fn update_project(
        &self,
        project_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<project::Model> {
        let project = self.get_project(project_id).await?;

        let mut active: ProjectActiveModel = project.into();
        active.name = Set(name);
        active.description = Set(description);
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update project: {}", e)))?;

        Ok(result)
    }

    /// Delete a project; requirements, test cases, and execution suites all
    /// cascade.
    pub async fn delete_project(&self, project_id: Uuid) -> AppResult<()> {
        let project = self.get_project(project_id).await?;

        Project::delete_by_id(project.id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete project: {}", e)))?;

        Ok(())
    }
}
