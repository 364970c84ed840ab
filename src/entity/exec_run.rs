//! Test execution run entity for SeaORM.
//!
//! `run_number` is 1-based and unique per item (enforced by a composite
//! unique index); `completed_at` stays null while the run is open.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_execution_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub run_number: i32,
    pub executed_by: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub started_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exec_item::Entity",
        from = "Column::ItemId",
        to = "super::exec_item::Column::Id",
        on_delete = "Cascade"
    )]
    Item,
    #[sea_orm(has_many = "super::case_result::Entity")]
    Results,
}

impl Related<super::exec_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::case_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
