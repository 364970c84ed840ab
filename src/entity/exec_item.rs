//! Test execution item entity for SeaORM.
//!
//! An item bundles requirement ids; the test cases under test are computed at
//! read time by intersecting `requirement_ids` with each test case's
//! requirement links. Like the suite, `status` is a persisted rollup cache.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_execution_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub suite_id: Uuid,
    pub name: String,
    /// JSONB list of requirement ids (strings).
    #[sea_orm(column_type = "JsonBinary")]
    pub requirement_ids: JsonValue,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exec_suite::Entity",
        from = "Column::SuiteId",
        to = "super::exec_suite::Column::Id",
        on_delete = "Cascade"
    )]
    Suite,
    #[sea_orm(has_many = "super::exec_run::Entity")]
    Runs,
}

impl Related<super::exec_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suite.def()
    }
}

impl Related<super::exec_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Runs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the JSONB requirement-id list.
    pub fn requirement_id_list(&self) -> Vec<String> {
        serde_json::from_value(self.requirement_ids.clone()).unwrap_or_default()
    }
}
