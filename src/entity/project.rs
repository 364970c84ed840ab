//! Project entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::requirement::Entity")]
    Requirements,
    #[sea_orm(has_many = "super::testcase::Entity")]
    Testcases,
    #[sea_orm(has_many = "super::exec_suite::Entity")]
    ExecSuites,
}

impl Related<super::requirement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requirements.def()
    }
}

impl Related<super::testcase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Testcases.def()
    }
}

impl Related<super::exec_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExecSuites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
