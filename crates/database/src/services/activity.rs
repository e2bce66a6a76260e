use crate::{
    entities::{activities, course_prerequisites, courses, exam_delays, semesters},
    services::activity_query::ActivityQueryService,
};
use chrono::Utc;
use log::{info, warn};
use models::{
    activity::{ActivityType, Decision, RequestStatus},
    context::RequestContext,
    credits::{self, CreditWarning},
    error::{ServiceError, ServiceResult},
    exam_delay::ExamDelayRequest,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use std::collections::HashSet;

/// An accepted request, together with anything the student should be told about it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub activity: activities::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_delay: Option<exam_delays::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<CreditWarning>,
}

impl Submission {
    fn new(activity: activities::Model) -> Self {
        Self {
            activity,
            exam_delay: None,
            warning: None,
        }
    }
}

pub struct ActivityService;

impl ActivityService {
    /// Files a pending enrollment for the calling student
    pub async fn submit_enrollment(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        course_id: i32,
        semester_id: i32,
    ) -> ServiceResult<Submission> {
        let student_id = ctx.require_student()?;
        let course = find_course(db, course_id).await?;
        let semester = find_semester(db, semester_id).await?;

        Self::ensure_not_blocked(db, student_id, course_id, semester_id, ActivityType::Enrollment)
            .await?;
        Self::ensure_prerequisites(db, student_id, &course, &semester).await?;

        let current = ActivityQueryService::credit_load(db, student_id, semester_id).await?;
        let total = credits::check_ceiling(current, course.credit.into())?;

        let activity = insert_pending(
            db,
            student_id,
            course_id,
            semester_id,
            ActivityType::Enrollment,
        )
        .await?;

        info!(
            "Student {student_id} requested enrollment in {} for semester {} ({total} credits)",
            course.code, semester.name
        );
        Ok(Submission::new(activity))
    }

    /// Files a pending withdrawal from a course the student is enrolled in
    pub async fn submit_withdrawal(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        course_id: i32,
        semester_id: i32,
    ) -> ServiceResult<Submission> {
        let student_id = ctx.require_student()?;
        let course = find_course(db, course_id).await?;
        find_semester(db, semester_id).await?;

        Self::ensure_enrolled(db, student_id, course_id, semester_id).await?;
        Self::ensure_not_blocked(db, student_id, course_id, semester_id, ActivityType::Withdrawal)
            .await?;

        let current = ActivityQueryService::credit_load(db, student_id, semester_id).await?;
        let warning = credits::withdrawal_warning(current, course.credit.into());
        if let Some(CreditWarning::BelowMinimum { remaining, minimum }) = warning {
            warn!(
                "Withdrawal from {} leaves student {student_id} with {remaining} credits, below {minimum}",
                course.code
            );
        }

        let activity = insert_pending(
            db,
            student_id,
            course_id,
            semester_id,
            ActivityType::Withdrawal,
        )
        .await?;

        info!(
            "Student {student_id} requested withdrawal from {} for semester {semester_id}",
            course.code
        );
        Ok(Submission {
            warning,
            ..Submission::new(activity)
        })
    }

    /// Files a pending exam delay; the activity and its detail row are written together
    pub async fn submit_exam_delay(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        course_id: i32,
        semester_id: i32,
        request: ExamDelayRequest,
    ) -> ServiceResult<Submission> {
        let student_id = ctx.require_student()?;
        let semester = find_semester(db, semester_id).await?;
        request.validate(&semester.window()?)?;
        let course = find_course(db, course_id).await?;

        Self::ensure_enrolled(db, student_id, course_id, semester_id).await?;
        Self::ensure_not_blocked(db, student_id, course_id, semester_id, ActivityType::ExamDelay)
            .await?;

        let txn = db.begin().await?;

        let activity = insert_pending(
            &txn,
            student_id,
            course_id,
            semester_id,
            ActivityType::ExamDelay,
        )
        .await?;

        let detail = exam_delays::ActiveModel {
            activity_id: Set(activity.id),
            reason: Set(request.reason.trim().to_string()),
            old_exam_date: Set(request.old_date),
            new_exam_date: Set(request.new_date),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            "Student {student_id} requested moving the {} exam from {} to {}",
            course.code, detail.old_exam_date, detail.new_exam_date
        );
        Ok(Submission {
            exam_delay: Some(detail),
            ..Submission::new(activity)
        })
    }

    /// Moves a pending activity to its final state
    ///
    /// The status check and the write happen in one conditional update, so of
    /// two concurrent decisions on the same activity exactly one succeeds.
    pub async fn decide(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        activity_id: i32,
        decision: Decision,
    ) -> ServiceResult<activities::Model> {
        let reviewer_id = ctx.require_staff()?;
        let status = RequestStatus::from(decision);

        let result = activities::Entity::update_many()
            .col_expr(activities::Column::RequestStatus, Expr::value(status))
            .col_expr(activities::Column::ReviewerId, Expr::value(reviewer_id))
            .filter(activities::Column::Id.eq(activity_id))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Pending))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return match activities::Entity::find_by_id(activity_id).one(db).await? {
                None => Err(ServiceError::not_found("activity", activity_id)),
                Some(activity) if activity.request_status.can_transition_to(status) => {
                    Err(ServiceError::Conflict(format!(
                        "activity {activity_id} was modified while being decided"
                    )))
                }
                Some(activity) => Err(ServiceError::InvalidTransition {
                    activity_id,
                    current: activity.request_status,
                }),
            };
        }

        let activity = activities::Entity::find_by_id(activity_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("activity", activity_id))?;

        info!(
            "Staff {reviewer_id} marked {} request {activity_id} as {status}",
            activity.activity_type
        );
        Ok(activity)
    }

    /// Rejects a request that repeats a pending one, or one already approved this semester
    async fn ensure_not_blocked<C: ConnectionTrait>(
        db: &C,
        student_id: i32,
        course_id: i32,
        semester_id: i32,
        activity_type: ActivityType,
    ) -> ServiceResult<()> {
        let existing = activities::Entity::find()
            .filter(activities::Column::StudentId.eq(student_id))
            .filter(activities::Column::CourseId.eq(course_id))
            .filter(activities::Column::ActivityType.eq(activity_type))
            .filter(
                Condition::any()
                    .add(activities::Column::RequestStatus.eq(RequestStatus::Pending))
                    .add(
                        Condition::all()
                            .add(activities::Column::RequestStatus.eq(RequestStatus::Approved))
                            .add(activities::Column::SemesterId.eq(semester_id)),
                    ),
            )
            .order_by_desc(activities::Column::Id)
            .one(db)
            .await?;

        match existing {
            Some(activity) => Err(ServiceError::DuplicateRequest {
                existing_id: Some(activity.id),
                status: activity.request_status,
            }),
            None => Ok(()),
        }
    }

    async fn ensure_enrolled<C: ConnectionTrait>(
        db: &C,
        student_id: i32,
        course_id: i32,
        semester_id: i32,
    ) -> ServiceResult<()> {
        let enrollment = activities::Entity::find()
            .filter(activities::Column::StudentId.eq(student_id))
            .filter(activities::Column::CourseId.eq(course_id))
            .filter(activities::Column::SemesterId.eq(semester_id))
            .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Approved))
            .one(db)
            .await?;

        match enrollment {
            Some(_) => Ok(()),
            None => Err(ServiceError::NoApprovedEnrollment { course_id }),
        }
    }

    /// Every prerequisite needs an approved enrollment in a semester that started earlier
    async fn ensure_prerequisites<C: ConnectionTrait>(
        db: &C,
        student_id: i32,
        course: &courses::Model,
        semester: &semesters::Model,
    ) -> ServiceResult<()> {
        let required: Vec<i32> = course_prerequisites::Entity::find()
            .select_only()
            .column(course_prerequisites::Column::PrerequisiteId)
            .filter(course_prerequisites::Column::CourseId.eq(course.id))
            .into_tuple()
            .all(db)
            .await?;

        if required.is_empty() {
            return Ok(());
        }

        let completed: HashSet<i32> = activities::Entity::find()
            .select_only()
            .column(activities::Column::CourseId)
            .distinct()
            .inner_join(semesters::Entity)
            .filter(activities::Column::StudentId.eq(student_id))
            .filter(activities::Column::CourseId.is_in(required.clone()))
            .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Approved))
            .filter(semesters::Column::StartDate.lt(semester.start_date))
            .into_tuple::<i32>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let mut missing: Vec<i32> = required
            .into_iter()
            .filter(|id| !completed.contains(id))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            missing.sort_unstable();
            Err(ServiceError::PrerequisiteNotMet {
                course_id: course.id,
                missing,
            })
        }
    }
}

async fn insert_pending<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    course_id: i32,
    semester_id: i32,
    activity_type: ActivityType,
) -> ServiceResult<activities::Model> {
    activities::ActiveModel {
        student_id: Set(student_id),
        course_id: Set(course_id),
        semester_id: Set(semester_id),
        activity_type: Set(activity_type),
        submission_date: Set(Utc::now().date_naive()),
        request_status: Set(RequestStatus::Pending),
        reviewer_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(insert_error)
}

/// A unique violation here can only come from the pending-request index
fn insert_error(err: DbErr) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::DuplicateRequest {
            existing_id: None,
            status: RequestStatus::Pending,
        },
        _ => err.into(),
    }
}

pub(crate) async fn find_course<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
) -> ServiceResult<courses::Model> {
    courses::Entity::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("course", course_id))
}

pub(crate) async fn find_semester<C: ConnectionTrait>(
    db: &C,
    semester_id: i32,
) -> ServiceResult<semesters::Model> {
    semesters::Entity::find_by_id(semester_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("semester", semester_id))
}
