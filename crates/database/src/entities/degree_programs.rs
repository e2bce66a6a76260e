use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "degree_programs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String, // e.g. "CS-BS"
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::specializations::Entity")]
    Specializations,
    #[sea_orm(has_many = "super::student_programs::Entity")]
    StudentPrograms,
}

impl Related<super::specializations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Specializations.def()
    }
}

impl Related<super::student_programs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentPrograms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
