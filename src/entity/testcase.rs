//! Test case entity for SeaORM.
//!
//! Test case ids are user-supplied business keys (e.g. "TC-001"). Steps live
//! in the `test_steps` table; requirement links in `testcase_requirements`.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "testcases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub preconditions: Option<String>,
    pub postconditions: Option<String>,
    pub status: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub tags: Option<JsonValue>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(has_many = "super::test_step::Entity")]
    Steps,
    #[sea_orm(has_many = "super::testcase_requirement::Entity")]
    RequirementLinks,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::test_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Steps.def()
    }
}

impl Related<super::testcase_requirement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequirementLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
