use crate::entities::{activities, courses, exam_delays, semesters, users};
use futures::{TryFutureExt, try_join};
use models::{
    activity::{ActivityType, RequestStatus, SortOrder},
    context::RequestContext,
    error::{ServiceError, ServiceResult},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait,
};
use serde::Serialize;
use std::collections::HashMap;

/// Summary counters shown on a student's dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StudentStats {
    pub enrolled: u64,
    pub credits: i64,
    pub pending: u64,
}

/// Pending requests awaiting review, per activity type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingCounts {
    pub enrollment: u64,
    pub withdrawal: u64,
    pub exam_delay: u64,
    pub total: u64,
}

/// Which activities a staff review listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewFilter {
    pub activity_type: ActivityType,
    pub status: Option<RequestStatus>,
    pub order: SortOrder,
}

impl ReviewFilter {
    /// Pending requests of one type, newest first
    pub fn pending(activity_type: ActivityType) -> Self {
        Self {
            activity_type,
            status: Some(RequestStatus::Pending),
            order: SortOrder::NewestFirst,
        }
    }
}

/// An activity with the names a reviewer or student needs to read it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: activities::Model,
    pub student_name: String,
    pub course_code: String,
    pub course_title: String,
    pub credit: i32,
    pub semester_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_delay: Option<exam_delays::Model>,
}

pub struct ActivityQueryService;

impl ActivityQueryService {
    pub async fn get_student_stats(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: i32,
        semester_id: Option<i32>,
    ) -> ServiceResult<StudentStats> {
        ctx.ensure_can_view_student(student_id)?;

        let scoped = || {
            activities::Entity::find()
                .filter(activities::Column::StudentId.eq(student_id))
                .apply_if(semester_id, |q, id| {
                    q.filter(activities::Column::SemesterId.eq(id))
                })
        };

        let enrolled = scoped()
            .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Approved))
            .count(db);
        // Open requests are counted across every semester
        let pending = activities::Entity::find()
            .filter(activities::Column::StudentId.eq(student_id))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Pending))
            .count(db);
        let credits = Self::approved_credits(db, student_id, semester_id);

        let (enrolled, pending, credits) = try_join!(
            enrolled.map_err(ServiceError::from),
            pending.map_err(ServiceError::from),
            credits,
        )?;

        Ok(StudentStats {
            enrolled,
            credits,
            pending,
        })
    }

    /// Credits of approved and pending enrollments in a semester
    ///
    /// This is the load the ceiling is checked against, so requests still
    /// under review count towards it.
    pub async fn credit_load<C: ConnectionTrait>(
        db: &C,
        student_id: i32,
        semester_id: i32,
    ) -> ServiceResult<i64> {
        Self::sum_enrollment_credits(
            db,
            student_id,
            Some(semester_id),
            &[RequestStatus::Approved, RequestStatus::Pending],
        )
        .await
    }

    /// Credits of approved enrollments, in one semester or across all of them
    pub async fn approved_credits<C: ConnectionTrait>(
        db: &C,
        student_id: i32,
        semester_id: Option<i32>,
    ) -> ServiceResult<i64> {
        Self::sum_enrollment_credits(db, student_id, semester_id, &[RequestStatus::Approved]).await
    }

    async fn sum_enrollment_credits<C: ConnectionTrait>(
        db: &C,
        student_id: i32,
        semester_id: Option<i32>,
        statuses: &[RequestStatus],
    ) -> ServiceResult<i64> {
        let total: Option<Option<i64>> = activities::Entity::find()
            .select_only()
            .column_as(courses::Column::Credit.sum(), "total")
            .inner_join(courses::Entity)
            .filter(activities::Column::StudentId.eq(student_id))
            .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
            .filter(activities::Column::RequestStatus.is_in(statuses.iter().copied()))
            .apply_if(semester_id, |q, id| {
                q.filter(activities::Column::SemesterId.eq(id))
            })
            .into_tuple()
            .one(db)
            .await?;

        Ok(total.flatten().unwrap_or(0))
    }

    pub async fn pending_counts(
        db: &DatabaseConnection,
        ctx: &RequestContext,
    ) -> ServiceResult<PendingCounts> {
        ctx.require_staff()?;

        let rows: Vec<(ActivityType, i64)> = activities::Entity::find()
            .select_only()
            .column(activities::Column::ActivityType)
            .column_as(activities::Column::Id.count(), "count")
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Pending))
            .group_by(activities::Column::ActivityType)
            .into_tuple()
            .all(db)
            .await?;

        let mut counts = PendingCounts::default();
        for (activity_type, count) in rows {
            let count = count.max(0) as u64;
            match activity_type {
                ActivityType::Enrollment => counts.enrollment = count,
                ActivityType::Withdrawal => counts.withdrawal = count,
                ActivityType::ExamDelay => counts.exam_delay = count,
            }
            counts.total += count;
        }
        Ok(counts)
    }

    /// Activities of one type for staff review
    pub async fn list_for_review(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        filter: ReviewFilter,
    ) -> ServiceResult<Vec<ActivityDetail>> {
        ctx.require_staff()?;

        let order = match filter.order {
            SortOrder::NewestFirst => Order::Desc,
            SortOrder::OldestFirst => Order::Asc,
        };

        let rows = activities::Entity::find()
            .filter(activities::Column::ActivityType.eq(filter.activity_type))
            .apply_if(filter.status, |q, status| {
                q.filter(activities::Column::RequestStatus.eq(status))
            })
            .order_by(activities::Column::SubmissionDate, order.clone())
            .order_by(activities::Column::Id, order)
            .all(db)
            .await?;

        Self::with_details(db, rows).await
    }

    /// A student's own activities, newest first
    pub async fn student_history(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: i32,
        activity_type: Option<ActivityType>,
    ) -> ServiceResult<Vec<ActivityDetail>> {
        ctx.ensure_can_view_student(student_id)?;

        let rows = activities::Entity::find()
            .filter(activities::Column::StudentId.eq(student_id))
            .apply_if(activity_type, |q, t| {
                q.filter(activities::Column::ActivityType.eq(t))
            })
            .order_by_desc(activities::Column::SubmissionDate)
            .order_by_desc(activities::Column::Id)
            .all(db)
            .await?;

        Self::with_details(db, rows).await
    }

    /// The latest activities, for one student or (staff only) everyone
    pub async fn recent_activity(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: Option<i32>,
        limit: u64,
    ) -> ServiceResult<Vec<ActivityDetail>> {
        match student_id {
            Some(id) => ctx.ensure_can_view_student(id)?,
            None => {
                ctx.require_staff()?;
            }
        }

        let rows = activities::Entity::find()
            .apply_if(student_id, |q, id| {
                q.filter(activities::Column::StudentId.eq(id))
            })
            .order_by_desc(activities::Column::SubmissionDate)
            .order_by_desc(activities::Column::Id)
            .limit(limit)
            .all(db)
            .await?;

        Self::with_details(db, rows).await
    }

    /// Loads the related names in batches and attaches them to each row
    pub(crate) async fn with_details(
        db: &DatabaseConnection,
        rows: Vec<activities::Model>,
    ) -> ServiceResult<Vec<ActivityDetail>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<i32> = rows.iter().map(|a| a.course_id).collect();
        let semester_ids: Vec<i32> = rows.iter().map(|a| a.semester_id).collect();
        let student_ids: Vec<i32> = rows.iter().map(|a| a.student_id).collect();
        let delay_ids: Vec<i32> = rows
            .iter()
            .filter(|a| a.activity_type == ActivityType::ExamDelay)
            .map(|a| a.id)
            .collect();

        let courses: HashMap<i32, courses::Model> = courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let semester_names: HashMap<i32, String> = semesters::Entity::find()
            .filter(semesters::Column::Id.is_in(semester_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        let student_names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(student_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name()))
            .collect();

        let mut delays: HashMap<i32, exam_delays::Model> = if delay_ids.is_empty() {
            HashMap::new()
        } else {
            exam_delays::Entity::find()
                .filter(exam_delays::Column::ActivityId.is_in(delay_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|d| (d.activity_id, d))
                .collect()
        };

        let details = rows
            .into_iter()
            .map(|activity| {
                let course = courses.get(&activity.course_id);
                ActivityDetail {
                    student_name: student_names
                        .get(&activity.student_id)
                        .cloned()
                        .unwrap_or_default(),
                    course_code: course.map(|c| c.code.clone()).unwrap_or_default(),
                    course_title: course.map(|c| c.title.clone()).unwrap_or_default(),
                    credit: course.map(|c| c.credit).unwrap_or_default(),
                    semester_name: semester_names
                        .get(&activity.semester_id)
                        .cloned()
                        .unwrap_or_default(),
                    exam_delay: delays.remove(&activity.id),
                    activity,
                }
            })
            .collect();

        Ok(details)
    }
}
