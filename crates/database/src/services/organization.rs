use crate::{
    entities::{courses, departments, education_centers, professors},
    services::{count_ids, non_empty, required},
};
use log::info;
use models::{
    context::RequestContext,
    error::{ServiceError, ServiceResult},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCenter {
    pub name: String,
    pub phone_number: Option<String>,
}

/// A department always belongs to an education center
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    pub office_location: Option<String>,
    pub phone_number: Option<String>,
    pub center_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenterSummary {
    #[serde(flatten)]
    pub center: education_centers::Model,
    pub department_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSummary {
    #[serde(flatten)]
    pub department: departments::Model,
    pub center: Option<String>,
    pub professor_count: u64,
    pub course_count: u64,
}

pub struct OrganizationService;

impl OrganizationService {
    pub async fn create_center(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        new_center: NewCenter,
    ) -> ServiceResult<education_centers::Model> {
        ctx.require_staff()?;
        let name = required(new_center.name, "name")?;

        let center = education_centers::ActiveModel {
            name: Set(name),
            phone_number: Set(non_empty(new_center.phone_number)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Added education center {}", center.name);
        Ok(center)
    }

    /// Education centers ordered by name, with their department counts
    pub async fn list_centers(db: &DatabaseConnection) -> ServiceResult<Vec<CenterSummary>> {
        let centers = education_centers::Entity::find()
            .order_by_asc(education_centers::Column::Name)
            .all(db)
            .await?;

        let department_counts = count_ids(
            departments::Entity::find()
                .select_only()
                .column(departments::Column::CenterId)
                .into_tuple::<Option<i32>>()
                .all(db)
                .await?
                .into_iter()
                .flatten(),
        );

        Ok(centers
            .into_iter()
            .map(|center| CenterSummary {
                department_count: department_counts.get(&center.id).copied().unwrap_or(0),
                center,
            })
            .collect())
    }

    /// Removes a center that no department belongs to
    pub async fn delete_center(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        center_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;
        let center = education_centers::Entity::find_by_id(center_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("education center", center_id))?;

        let dependents = departments::Entity::find()
            .filter(departments::Column::CenterId.eq(center_id))
            .count(db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::InUse {
                entity: "education center",
                id: center_id,
                dependents,
            });
        }

        let name = center.name.clone();
        center.delete(db).await?;
        info!("Deleted education center {name}");
        Ok(())
    }

    pub async fn create_department(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        new_department: NewDepartment,
    ) -> ServiceResult<departments::Model> {
        ctx.require_staff()?;
        let name = required(new_department.name, "name")?;
        education_centers::Entity::find_by_id(new_department.center_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found("education center", new_department.center_id)
            })?;

        let department = departments::ActiveModel {
            name: Set(name),
            office_location: Set(non_empty(new_department.office_location)),
            phone_number: Set(non_empty(new_department.phone_number)),
            center_id: Set(Some(new_department.center_id)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Added department {}", department.name);
        Ok(department)
    }

    /// Departments ordered by name, with their center and usage counts
    pub async fn list_departments(
        db: &DatabaseConnection,
    ) -> ServiceResult<Vec<DepartmentSummary>> {
        let departments = departments::Entity::find()
            .order_by_asc(departments::Column::Name)
            .all(db)
            .await?;

        let center_names: HashMap<i32, String> = education_centers::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let professor_counts = count_ids(
            professors::Entity::find()
                .select_only()
                .column(professors::Column::DepartmentId)
                .into_tuple::<Option<i32>>()
                .all(db)
                .await?
                .into_iter()
                .flatten(),
        );
        let course_counts = count_ids(
            courses::Entity::find()
                .select_only()
                .column(courses::Column::DepartmentId)
                .into_tuple::<Option<i32>>()
                .all(db)
                .await?
                .into_iter()
                .flatten(),
        );

        Ok(departments
            .into_iter()
            .map(|department| DepartmentSummary {
                center: department
                    .center_id
                    .and_then(|id| center_names.get(&id).cloned()),
                professor_count: professor_counts.get(&department.id).copied().unwrap_or(0),
                course_count: course_counts.get(&department.id).copied().unwrap_or(0),
                department,
            })
            .collect())
    }

    /// Removes a department with no professors and no courses
    pub async fn delete_department(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        department_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;
        let department = find_department(db, department_id).await?;

        let professors = professors::Entity::find()
            .filter(professors::Column::DepartmentId.eq(department_id))
            .count(db)
            .await?;
        let courses = courses::Entity::find()
            .filter(courses::Column::DepartmentId.eq(department_id))
            .count(db)
            .await?;
        if professors + courses > 0 {
            return Err(ServiceError::InUse {
                entity: "department",
                id: department_id,
                dependents: professors + courses,
            });
        }

        let name = department.name.clone();
        department.delete(db).await?;
        info!("Deleted department {name}");
        Ok(())
    }
}

pub(crate) async fn find_department<C: ConnectionTrait>(
    db: &C,
    department_id: i32,
) -> ServiceResult<departments::Model> {
    departments::Entity::find_by_id(department_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("department", department_id))
}
