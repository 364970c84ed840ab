//! Per-test-case result entity for SeaORM.
//!
//! At most one row per (run_id, testcase_id); a re-save updates in place and
//! refreshes `executed_at`.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_case_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub run_id: Uuid,
    pub testcase_id: String,
    pub result: String,
    pub notes: Option<String>,
    /// JSONB list of per-step results, defaults to an empty list.
    #[sea_orm(column_type = "JsonBinary")]
    pub step_results: JsonValue,
    pub executed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exec_run::Entity",
        from = "Column::RunId",
        to = "super::exec_run::Column::Id",
        on_delete = "Cascade"
    )]
    Run,
}

impl Related<super::exec_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Run.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
