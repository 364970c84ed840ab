//! Test step entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_steps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub testcase_id: String,
    pub step_number: i32,
    pub action: String,
    pub expected_result: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::testcase::Entity",
        from = "Column::TestcaseId",
        to = "super::testcase::Column::Id",
        on_delete = "Cascade"
    )]
    Testcase,
}

impl Related<super::testcase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Testcase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
