use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub office_location: Option<String>,
    pub phone_number: Option<String>,
    pub center_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::education_centers::Entity",
        from = "Column::CenterId",
        to = "super::education_centers::Column::Id"
    )]
    EducationCenter,
    #[sea_orm(has_many = "super::courses::Entity")]
    Courses,
    #[sea_orm(has_many = "super::professors::Entity")]
    Professors,
}

impl Related<super::education_centers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EducationCenter.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl Related<super::professors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
