use crate::{
    entities::{activities, courses, professor_courses, semesters, users},
    services::{
        activity::{find_course, find_semester},
        activity_query::{ActivityDetail, ActivityQueryService},
        program::{StudentProgram, student_program_list},
        user::{find_professor, find_student},
    },
};
use chrono::NaiveDate;
use log::info;
use models::{
    activity::{ActivityType, RequestStatus},
    context::{RequestContext, Role},
    error::{ServiceError, ServiceResult},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const FACULTY: [Role; 2] = [Role::Professor, Role::Staff];

/// A teaching assignment with the names needed to display it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeachingAssignment {
    #[serde(flatten)]
    pub assignment: professor_courses::Model,
    pub course_code: String,
    pub course_title: String,
    pub semester_name: String,
}

/// One semester as seen from a professor's dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeachingSemester {
    #[serde(flatten)]
    pub semester: semesters::Model,
    pub course_count: u64,
    pub student_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeachingOverview {
    pub courses: u64,
    pub students: u64,
    pub pending: u64,
}

/// A course a professor teaches, with the enrollment requests filed for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaughtCourse {
    #[serde(flatten)]
    pub course: courses::Model,
    pub enrolled_students: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub student_id: i32,
    pub student_name: String,
    pub email: String,
    pub request_status: RequestStatus,
    pub submission_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub activity_type: ActivityType,
    pub request_status: RequestStatus,
    pub count: u64,
}

/// Everything a professor sees when looking up a student
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub student_id: i32,
    pub student_name: String,
    pub credit_load: i64,
    pub enrolled: u64,
    pub pending: u64,
    pub enrollments: Vec<ActivityDetail>,
    pub breakdown: Vec<StatusCount>,
    pub programs: Vec<StudentProgram>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentCredits {
    pub student_id: i32,
    pub student_name: String,
    pub total_credits: i64,
}

pub struct TeachingService;

impl TeachingService {
    pub async fn assign_professor(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        professor_id: i32,
        course_id: i32,
        semester_id: i32,
    ) -> ServiceResult<professor_courses::Model> {
        ctx.require_staff()?;
        find_professor(db, professor_id).await?;
        let course = find_course(db, course_id).await?;
        let semester = find_semester(db, semester_id).await?;

        let existing =
            professor_courses::Entity::find_by_id((professor_id, course_id, semester_id))
                .one(db)
                .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "professor {professor_id} already teaches {} in {}",
                course.code, semester.name
            )));
        }

        let assignment = professor_courses::ActiveModel {
            professor_id: Set(professor_id),
            course_id: Set(course_id),
            semester_id: Set(semester_id),
        }
        .insert(db)
        .await?;

        info!(
            "Professor {professor_id} assigned to {} in {}",
            course.code, semester.name
        );
        Ok(assignment)
    }

    pub async fn unassign(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        professor_id: i32,
        course_id: i32,
        semester_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;

        let result =
            professor_courses::Entity::delete_by_id((professor_id, course_id, semester_id))
                .exec(db)
                .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("teaching assignment", course_id));
        }
        Ok(())
    }

    /// Every assignment of a professor, latest semester first
    pub async fn assignments_of(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        professor_id: i32,
    ) -> ServiceResult<Vec<TeachingAssignment>> {
        ctx.ensure_can_view_professor(professor_id)?;

        let assignments = professor_courses::Entity::find()
            .filter(professor_courses::Column::ProfessorId.eq(professor_id))
            .all(db)
            .await?;
        if assignments.is_empty() {
            return Ok(Vec::new());
        }

        let courses: HashMap<i32, courses::Model> = courses::Entity::find()
            .filter(courses::Column::Id.is_in(assignments.iter().map(|a| a.course_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let semesters: HashMap<i32, semesters::Model> = semesters::Entity::find()
            .filter(semesters::Column::Id.is_in(assignments.iter().map(|a| a.semester_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut rows: Vec<(Option<NaiveDate>, TeachingAssignment)> = assignments
            .into_iter()
            .map(|assignment| {
                let course = courses.get(&assignment.course_id);
                let semester = semesters.get(&assignment.semester_id);
                (
                    semester.map(|s| s.start_date),
                    TeachingAssignment {
                        course_code: course.map(|c| c.code.clone()).unwrap_or_default(),
                        course_title: course.map(|c| c.title.clone()).unwrap_or_default(),
                        semester_name: semester.map(|s| s.name.clone()).unwrap_or_default(),
                        assignment,
                    },
                )
            })
            .collect();
        rows.sort_by(|(a_start, a), (b_start, b)| {
            b_start
                .cmp(a_start)
                .then_with(|| a.course_code.cmp(&b.course_code))
        });

        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    /// All semesters, latest first, with what the professor taught in each
    pub async fn teaching_semesters(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        professor_id: i32,
    ) -> ServiceResult<Vec<TeachingSemester>> {
        ctx.ensure_can_view_professor(professor_id)?;

        let semesters = semesters::Entity::find()
            .order_by_desc(semesters::Column::StartDate)
            .all(db)
            .await?;

        let assignments = professor_courses::Entity::find()
            .filter(professor_courses::Column::ProfessorId.eq(professor_id))
            .all(db)
            .await?;
        let taught: HashSet<(i32, i32)> = assignments
            .iter()
            .map(|a| (a.course_id, a.semester_id))
            .collect();

        let approved = if taught.is_empty() {
            Vec::new()
        } else {
            activities::Entity::find()
                .filter(activities::Column::CourseId.is_in(taught.iter().map(|(c, _)| *c)))
                .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
                .filter(activities::Column::RequestStatus.eq(RequestStatus::Approved))
                .all(db)
                .await?
        };

        let mut course_counts: HashMap<i32, u64> = HashMap::new();
        for (_, semester_id) in &taught {
            *course_counts.entry(*semester_id).or_default() += 1;
        }
        let mut students: HashMap<i32, HashSet<i32>> = HashMap::new();
        for activity in approved
            .iter()
            .filter(|a| taught.contains(&(a.course_id, a.semester_id)))
        {
            students
                .entry(activity.semester_id)
                .or_default()
                .insert(activity.student_id);
        }

        Ok(semesters
            .into_iter()
            .map(|semester| TeachingSemester {
                course_count: course_counts.get(&semester.id).copied().unwrap_or(0),
                student_count: students
                    .get(&semester.id)
                    .map(|s| s.len() as u64)
                    .unwrap_or(0),
                semester,
            })
            .collect())
    }

    /// Headline counters for one semester of teaching
    ///
    /// `pending` only counts enrollment requests; withdrawals and exam delays
    /// are handled by staff.
    pub async fn professor_overview(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        professor_id: i32,
        semester_id: i32,
    ) -> ServiceResult<TeachingOverview> {
        ctx.ensure_can_view_professor(professor_id)?;

        let course_ids = assigned_course_ids(db, professor_id, semester_id).await?;
        let requests = enrollment_requests(db, &course_ids, semester_id).await?;

        let students: HashSet<i32> = requests
            .iter()
            .filter(|a| a.request_status == RequestStatus::Approved)
            .map(|a| a.student_id)
            .collect();
        let pending = requests
            .iter()
            .filter(|a| a.request_status == RequestStatus::Pending)
            .count();

        Ok(TeachingOverview {
            courses: course_ids.len() as u64,
            students: students.len() as u64,
            pending: pending as u64,
        })
    }

    /// Courses taught in a semester, ordered by code
    pub async fn taught_courses(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        professor_id: i32,
        semester_id: i32,
    ) -> ServiceResult<Vec<TaughtCourse>> {
        ctx.ensure_can_view_professor(professor_id)?;

        let course_ids = assigned_course_ids(db, professor_id, semester_id).await?;
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let courses = courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids.iter().copied()))
            .order_by_asc(courses::Column::Code)
            .all(db)
            .await?;
        let requests = enrollment_requests(db, &course_ids, semester_id).await?;

        Ok(courses
            .into_iter()
            .map(|course| {
                let course_id = course.id;
                let mut taught = TaughtCourse {
                    course,
                    enrolled_students: 0,
                    pending: 0,
                    approved: 0,
                    rejected: 0,
                };
                let mut students = HashSet::new();
                for request in requests.iter().filter(|a| a.course_id == course_id) {
                    match request.request_status {
                        RequestStatus::Pending => taught.pending += 1,
                        RequestStatus::Approved => {
                            taught.approved += 1;
                            students.insert(request.student_id);
                        }
                        RequestStatus::Rejected => taught.rejected += 1,
                    }
                }
                taught.enrolled_students = students.len() as u64;
                taught
            })
            .collect())
    }

    /// Enrollment requests filed for a course in a semester
    ///
    /// Open to staff and to the professors assigned to that course.
    pub async fn course_roster(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        course_id: i32,
        semester_id: i32,
    ) -> ServiceResult<Vec<RosterEntry>> {
        let caller = ctx.require_any(&FACULTY)?;
        if ctx.role == Role::Professor {
            let assigned = professor_courses::Entity::find_by_id((caller, course_id, semester_id))
                .one(db)
                .await?;
            if assigned.is_none() {
                return Err(ServiceError::Forbidden(format!(
                    "professor {caller} does not teach course {course_id} in semester {semester_id}"
                )));
            }
        }

        let requests = enrollment_requests(db, &[course_id], semester_id).await?;
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let users: HashMap<i32, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(requests.iter().map(|a| a.student_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut roster: Vec<RosterEntry> = requests
            .into_iter()
            .map(|request| {
                let user = users.get(&request.student_id);
                RosterEntry {
                    student_id: request.student_id,
                    student_name: user.map(|u| u.full_name()).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    request_status: request.request_status,
                    submission_date: request.submission_date,
                }
            })
            .collect();
        roster.sort_by(|a, b| {
            a.request_status
                .as_str()
                .cmp(b.request_status.as_str())
                .then_with(|| a.student_name.cmp(&b.student_name))
        });

        Ok(roster)
    }

    pub async fn student_report(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: i32,
        semester_id: i32,
    ) -> ServiceResult<StudentReport> {
        ctx.require_any(&FACULTY)?;
        find_student(db, student_id).await?;
        find_semester(db, semester_id).await?;

        let student_name = users::Entity::find_by_id(student_id)
            .one(db)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_default();

        let credit_load = ActivityQueryService::credit_load(db, student_id, semester_id).await?;
        let enrolled = activities::Entity::find()
            .filter(activities::Column::StudentId.eq(student_id))
            .filter(activities::Column::SemesterId.eq(semester_id))
            .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Approved))
            .count(db)
            .await?;
        let pending = activities::Entity::find()
            .filter(activities::Column::StudentId.eq(student_id))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Pending))
            .count(db)
            .await?;

        let enrollments = activities::Entity::find()
            .filter(activities::Column::StudentId.eq(student_id))
            .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
            .order_by_desc(activities::Column::SubmissionDate)
            .order_by_desc(activities::Column::Id)
            .all(db)
            .await?;
        let enrollments = ActivityQueryService::with_details(db, enrollments).await?;

        let breakdown: Vec<(ActivityType, RequestStatus, i64)> = activities::Entity::find()
            .select_only()
            .column(activities::Column::ActivityType)
            .column(activities::Column::RequestStatus)
            .column_as(activities::Column::Id.count(), "count")
            .filter(activities::Column::StudentId.eq(student_id))
            .group_by(activities::Column::ActivityType)
            .group_by(activities::Column::RequestStatus)
            .order_by_asc(activities::Column::ActivityType)
            .order_by_asc(activities::Column::RequestStatus)
            .into_tuple()
            .all(db)
            .await?;

        Ok(StudentReport {
            student_id,
            student_name,
            credit_load,
            enrolled,
            pending,
            enrollments,
            breakdown: breakdown
                .into_iter()
                .map(|(activity_type, request_status, count)| StatusCount {
                    activity_type,
                    request_status,
                    count: count.max(0) as u64,
                })
                .collect(),
            programs: student_program_list(db, student_id).await?,
        })
    }

    /// Approved credits per student in a semester, highest first
    pub async fn credit_report(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        semester_id: i32,
    ) -> ServiceResult<Vec<StudentCredits>> {
        ctx.require_any(&FACULTY)?;
        find_semester(db, semester_id).await?;

        let totals: Vec<(i32, Option<i64>)> = activities::Entity::find()
            .select_only()
            .column(activities::Column::StudentId)
            .column_as(courses::Column::Credit.sum(), "total")
            .inner_join(courses::Entity)
            .filter(activities::Column::SemesterId.eq(semester_id))
            .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
            .filter(activities::Column::RequestStatus.eq(RequestStatus::Approved))
            .group_by(activities::Column::StudentId)
            .into_tuple()
            .all(db)
            .await?;
        if totals.is_empty() {
            return Ok(Vec::new());
        }

        let names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(totals.iter().map(|(id, _)| *id)))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name()))
            .collect();

        let mut report: Vec<StudentCredits> = totals
            .into_iter()
            .map(|(student_id, total)| StudentCredits {
                student_id,
                student_name: names.get(&student_id).cloned().unwrap_or_default(),
                total_credits: total.unwrap_or(0),
            })
            .collect();
        report.sort_by(|a, b| {
            b.total_credits
                .cmp(&a.total_credits)
                .then_with(|| a.student_name.cmp(&b.student_name))
        });

        Ok(report)
    }
}

async fn assigned_course_ids<C: ConnectionTrait>(
    db: &C,
    professor_id: i32,
    semester_id: i32,
) -> ServiceResult<Vec<i32>> {
    Ok(professor_courses::Entity::find()
        .select_only()
        .column(professor_courses::Column::CourseId)
        .filter(professor_courses::Column::ProfessorId.eq(professor_id))
        .filter(professor_courses::Column::SemesterId.eq(semester_id))
        .into_tuple()
        .all(db)
        .await?)
}

async fn enrollment_requests<C: ConnectionTrait>(
    db: &C,
    course_ids: &[i32],
    semester_id: i32,
) -> ServiceResult<Vec<activities::Model>> {
    if course_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(activities::Entity::find()
        .filter(activities::Column::CourseId.is_in(course_ids.iter().copied()))
        .filter(activities::Column::SemesterId.eq(semester_id))
        .filter(activities::Column::ActivityType.eq(ActivityType::Enrollment))
        .all(db)
        .await?)
}
