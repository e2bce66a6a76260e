use crate::{
    entities::{activities, course_prerequisites, courses, departments},
    services::{activity::find_course, non_empty, organization::find_department, required},
};
use log::info;
use models::{
    activity::{ActivityType, RequestStatus},
    context::RequestContext,
    error::{ServiceError, ServiceResult, ValidationError},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIN_CREDIT: i32 = 1;
pub const MAX_CREDIT: i32 = 10;
pub const MAX_PASSING_SCORE: i32 = 100;

/// Fields staff supply when adding a course to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCourse {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub credit: i32,
    pub passing_score: i32,
    pub department_id: Option<i32>,
}

impl NewCourse {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::MissingField("code"));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if !(MIN_CREDIT..=MAX_CREDIT).contains(&self.credit) {
            return Err(ValidationError::OutOfRange {
                field: "credit",
                value: self.credit,
                min: MIN_CREDIT,
                max: MAX_CREDIT,
            });
        }
        if !(0..=MAX_PASSING_SCORE).contains(&self.passing_score) {
            return Err(ValidationError::OutOfRange {
                field: "passing_score",
                value: self.passing_score,
                min: 0,
                max: MAX_PASSING_SCORE,
            });
        }
        Ok(())
    }
}

/// Catalog fields staff may edit; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub credit: Option<i32>,
    pub passing_score: Option<i32>,
    pub department_id: Option<i32>,
}

/// A catalog entry with its department name and enrollment count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: courses::Model,
    pub department: Option<String>,
    pub student_count: u64,
}

pub struct CourseService;

impl CourseService {
    /// The whole catalog, ordered by course code
    pub async fn list_courses(db: &DatabaseConnection) -> ServiceResult<Vec<CourseSummary>> {
        let courses = courses::Entity::find()
            .order_by_asc(courses::Column::Code)
            .all(db)
            .await?;

        let department_names: HashMap<i32, String> = departments::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        // One row per (course, student) with an approved enrollment in any semester
        let enrolled: Vec<(i32, i32)> = activities::Entity::find()
            .select_only()
            .column(activities::Column::CourseId)
            .column(activities::Column::StudentId)
            .distinct()
            .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Approved))
            .into_tuple()
            .all(db)
            .await?;

        let mut student_counts: HashMap<i32, u64> = HashMap::new();
        for (course_id, _) in enrolled {
            *student_counts.entry(course_id).or_default() += 1;
        }

        Ok(courses
            .into_iter()
            .map(|course| CourseSummary {
                department: course
                    .department_id
                    .and_then(|id| department_names.get(&id).cloned()),
                student_count: student_counts.get(&course.id).copied().unwrap_or(0),
                course,
            })
            .collect())
    }

    pub async fn create_course(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        new_course: NewCourse,
    ) -> ServiceResult<courses::Model> {
        ctx.require_staff()?;
        new_course.validate()?;

        let code = new_course.code.trim().to_string();
        let existing = courses::Entity::find()
            .filter(courses::Column::Code.eq(code.as_str()))
            .count(db)
            .await?;
        if existing > 0 {
            return Err(duplicate_code(&code));
        }

        let course = courses::ActiveModel {
            code: Set(code.clone()),
            title: Set(new_course.title.trim().to_string()),
            description: Set(new_course
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())),
            credit: Set(new_course.credit),
            passing_score: Set(new_course.passing_score),
            department_id: Set(new_course.department_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_code(&code),
            _ => ServiceError::from(err),
        })?;

        info!("Added course {} ({} credits)", course.code, course.credit);
        Ok(course)
    }

    /// Removes a course nobody has filed a request for, along with its prerequisite links
    pub async fn delete_course(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        course_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;
        let course = find_course(db, course_id).await?;

        let dependents = activities::Entity::find()
            .filter(activities::Column::CourseId.eq(course_id))
            .count(db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::InUse {
                entity: "course",
                id: course_id,
                dependents,
            });
        }

        let code = course.code.clone();
        let txn = db.begin().await?;

        course_prerequisites::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(course_prerequisites::Column::CourseId.eq(course_id))
                    .add(course_prerequisites::Column::PrerequisiteId.eq(course_id)),
            )
            .exec(&txn)
            .await?;
        course.delete(&txn).await?;

        txn.commit().await?;

        info!("Deleted course {code}");
        Ok(())
    }

    pub async fn add_prerequisite(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        course_id: i32,
        prerequisite_id: i32,
    ) -> ServiceResult<course_prerequisites::Model> {
        ctx.require_staff()?;
        if course_id == prerequisite_id {
            return Err(ValidationError::SelfPrerequisite.into());
        }

        let course = find_course(db, course_id).await?;
        let prerequisite = find_course(db, prerequisite_id).await?;

        let existing = course_prerequisites::Entity::find_by_id((course_id, prerequisite_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "{} is already a prerequisite of {}",
                prerequisite.code, course.code
            )));
        }

        let link = course_prerequisites::ActiveModel {
            course_id: Set(course_id),
            prerequisite_id: Set(prerequisite_id),
        }
        .insert(db)
        .await?;

        info!("{} now requires {}", course.code, prerequisite.code);
        Ok(link)
    }

    pub async fn remove_prerequisite(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        course_id: i32,
        prerequisite_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;

        let result = course_prerequisites::Entity::delete_by_id((course_id, prerequisite_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("prerequisite", prerequisite_id));
        }
        Ok(())
    }

    /// Courses that must be completed before `course_id`, ordered by code
    pub async fn prerequisites_of(
        db: &DatabaseConnection,
        course_id: i32,
    ) -> ServiceResult<Vec<courses::Model>> {
        find_course(db, course_id).await?;

        let ids: Vec<i32> = course_prerequisites::Entity::find()
            .select_only()
            .column(course_prerequisites::Column::PrerequisiteId)
            .filter(course_prerequisites::Column::CourseId.eq(course_id))
            .into_tuple()
            .all(db)
            .await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(courses::Entity::find()
            .filter(courses::Column::Id.is_in(ids))
            .order_by_asc(courses::Column::Code)
            .all(db)
            .await?)
    }

    /// Edits a course in place; the code never changes
    pub async fn update_course(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        course_id: i32,
        changes: CourseChanges,
    ) -> ServiceResult<courses::Model> {
        ctx.require_staff()?;
        let course = find_course(db, course_id).await?;

        let credit = changes.credit.unwrap_or(course.credit);
        let passing_score = changes.passing_score.unwrap_or(course.passing_score);
        NewCourse {
            code: course.code.clone(),
            title: course.title.clone(),
            description: None,
            credit,
            passing_score,
            department_id: None,
        }
        .validate()?;

        let mut active = course.into_active_model();
        if let Some(title) = changes.title {
            active.title = Set(required(title, "title")?);
        }
        if changes.description.is_some() {
            active.description = Set(non_empty(changes.description));
        }
        if let Some(department_id) = changes.department_id {
            find_department(db, department_id).await?;
            active.department_id = Set(Some(department_id));
        }
        active.credit = Set(credit);
        active.passing_score = Set(passing_score);

        let course = active.update(db).await?;
        info!("Updated course {}", course.code);
        Ok(course)
    }
}

fn duplicate_code(code: &str) -> ServiceError {
    ServiceError::Conflict(format!("a course with code {code} already exists"))
}
