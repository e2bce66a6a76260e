use crate::{
    entities::{activities, semesters},
    services::activity::find_semester,
};
use log::info;
use models::{
    context::RequestContext,
    error::{ServiceError, ServiceResult},
    semester::{SemesterWindow, semester_name},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    prelude::Date,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A semester with how much it is used
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterSummary {
    #[serde(flatten)]
    pub semester: semesters::Model,
    pub student_count: u64,
    pub activity_count: u64,
}

pub struct SemesterService;

impl SemesterService {
    pub async fn create_semester(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        start_date: Date,
        end_date: Date,
    ) -> ServiceResult<semesters::Model> {
        ctx.require_staff()?;
        let window = SemesterWindow::new(start_date, end_date)?;

        let clashes = semesters::Entity::find()
            .filter(
                Condition::any()
                    .add(semesters::Column::StartDate.eq(window.start))
                    .add(semesters::Column::EndDate.eq(window.end)),
            )
            .count(db)
            .await?;
        if clashes > 0 {
            return Err(ServiceError::Conflict(format!(
                "a semester starting on {} or ending on {} already exists",
                window.start, window.end
            )));
        }

        let semester = semesters::ActiveModel {
            name: Set(semester_name(window.start)),
            start_date: Set(window.start),
            end_date: Set(window.end),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(
            "Created semester {} ({} to {})",
            semester.name, semester.start_date, semester.end_date
        );
        Ok(semester)
    }

    /// All semesters, newest first
    pub async fn list_semesters(db: &DatabaseConnection) -> ServiceResult<Vec<SemesterSummary>> {
        let semesters = semesters::Entity::find()
            .order_by_desc(semesters::Column::StartDate)
            .all(db)
            .await?;

        let activity_counts: HashMap<i32, i64> = activities::Entity::find()
            .select_only()
            .column(activities::Column::SemesterId)
            .column_as(activities::Column::Id.count(), "count")
            .group_by(activities::Column::SemesterId)
            .into_tuple::<(i32, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let enrolled_pairs: Vec<(i32, i32)> = activities::Entity::find()
            .select_only()
            .column(activities::Column::SemesterId)
            .column(activities::Column::StudentId)
            .distinct()
            .into_tuple()
            .all(db)
            .await?;

        let mut students: HashMap<i32, HashSet<i32>> = HashMap::new();
        for (semester_id, student_id) in enrolled_pairs {
            students.entry(semester_id).or_default().insert(student_id);
        }

        Ok(semesters
            .into_iter()
            .map(|semester| SemesterSummary {
                student_count: students.get(&semester.id).map_or(0, |s| s.len() as u64),
                activity_count: activity_counts
                    .get(&semester.id)
                    .map_or(0, |c| (*c).max(0) as u64),
                semester,
            })
            .collect())
    }

    /// The semester with the latest start date
    pub async fn current_semester(
        db: &DatabaseConnection,
    ) -> ServiceResult<Option<semesters::Model>> {
        Ok(semesters::Entity::find()
            .order_by_desc(semesters::Column::StartDate)
            .one(db)
            .await?)
    }

    pub async fn semester_window(
        db: &DatabaseConnection,
        semester_id: i32,
    ) -> ServiceResult<SemesterWindow> {
        let semester = find_semester(db, semester_id).await?;
        Ok(semester.window()?)
    }

    pub async fn delete_semester(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        semester_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;
        let semester = find_semester(db, semester_id).await?;

        let dependents = activities::Entity::find()
            .filter(activities::Column::SemesterId.eq(semester_id))
            .count(db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::InUse {
                entity: "semester",
                id: semester_id,
                dependents,
            });
        }

        let name = semester.name.clone();
        semester.delete(db).await?;
        info!("Deleted semester {name}");
        Ok(())
    }
}
