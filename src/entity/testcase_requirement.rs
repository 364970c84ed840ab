//! Requirement link entity joining test cases to requirements.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "testcase_requirements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub testcase_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub requirement_id: String,
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
    #[sea_orm(
        belongs_to = "super::requirement::Entity",
        from = "Column::RequirementId",
        to = "super::requirement::Column::Id",
        on_delete = "Cascade"
    )]
    Requirement,
}

impl Related<super::testcase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Testcase.def()
    }
}

impl Related<super::requirement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requirement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
