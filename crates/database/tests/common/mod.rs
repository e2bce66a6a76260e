#![allow(dead_code)]

use chrono::NaiveDate;
use database::entities::{
    activities, course_prerequisites, courses, departments, professor_courses, professors,
    semesters, staff, students, users,
};
use migration::{Migrator, MigratorTrait};
use models::{
    activity::{ActivityType, RequestStatus},
    context::RequestContext,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection};

pub const STAFF_ID: i32 = 1;

/// A migrated in-memory database with one staff member
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");

    insert_user(&db, STAFF_ID, "Grace", "Hopper").await;
    staff::ActiveModel {
        user_id: Set(STAFF_ID),
        position: Set("Registrar".to_string()),
    }
    .insert(&db)
    .await
    .expect("failed to insert staff");

    db
}

pub fn staff_ctx() -> RequestContext {
    RequestContext::staff(STAFF_ID)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn insert_user(db: &DatabaseConnection, id: i32, first: &str, last: &str) {
    users::ActiveModel {
        id: Set(id),
        first_name: Set(first.to_string()),
        last_name: Set(last.to_string()),
        email: Set(format!("{}.{id}@uni.test", first.to_lowercase())),
        phone_number: Set(None),
    }
    .insert(db)
    .await
    .expect("failed to insert user");
}

pub async fn student(db: &DatabaseConnection, id: i32, first: &str, last: &str) -> RequestContext {
    insert_user(db, id, first, last).await;
    students::ActiveModel {
        user_id: Set(id),
        birthday: Set(None),
    }
    .insert(db)
    .await
    .expect("failed to insert student");
    RequestContext::student(id)
}

pub async fn professor(
    db: &DatabaseConnection,
    id: i32,
    department_id: Option<i32>,
) -> RequestContext {
    insert_user(db, id, "Alan", "Turing").await;
    professors::ActiveModel {
        user_id: Set(id),
        office_location: Set(None),
        department_id: Set(department_id),
    }
    .insert(db)
    .await
    .expect("failed to insert professor");
    RequestContext::professor(id)
}

pub async fn department(db: &DatabaseConnection, name: &str) -> departments::Model {
    departments::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert department")
}

pub async fn course(db: &DatabaseConnection, id: i32, code: &str, credit: i32) -> courses::Model {
    courses::ActiveModel {
        id: Set(id),
        code: Set(code.to_string()),
        title: Set(format!("{code} title")),
        description: Set(None),
        credit: Set(credit),
        passing_score: Set(50),
        department_id: Set(None),
    }
    .insert(db)
    .await
    .expect("failed to insert course")
}

/// Assigns a professor to teach a course in a semester
pub async fn teaches(db: &DatabaseConnection, professor_id: i32, course_id: i32, semester_id: i32) {
    professor_courses::ActiveModel {
        professor_id: Set(professor_id),
        course_id: Set(course_id),
        semester_id: Set(semester_id),
    }
    .insert(db)
    .await
    .expect("failed to insert teaching assignment");
}

pub async fn requires(db: &DatabaseConnection, course_id: i32, prerequisite_id: i32) {
    course_prerequisites::ActiveModel {
        course_id: Set(course_id),
        prerequisite_id: Set(prerequisite_id),
    }
    .insert(db)
    .await
    .expect("failed to insert prerequisite");
}

pub async fn semester(
    db: &DatabaseConnection,
    name: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> semesters::Model {
    semesters::ActiveModel {
        name: Set(name.to_string()),
        start_date: Set(start),
        end_date: Set(end),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert semester")
}

pub async fn fall_2024(db: &DatabaseConnection) -> semesters::Model {
    semester(db, "241", date(2024, 9, 1), date(2024, 12, 20)).await
}

/// Inserts an activity directly, bypassing the workflow checks
pub async fn activity(
    db: &DatabaseConnection,
    student_id: i32,
    course_id: i32,
    semester_id: i32,
    activity_type: ActivityType,
    status: RequestStatus,
) -> activities::Model {
    activities::ActiveModel {
        student_id: Set(student_id),
        course_id: Set(course_id),
        semester_id: Set(semester_id),
        activity_type: Set(activity_type),
        submission_date: Set(date(2024, 9, 5)),
        request_status: Set(status),
        reviewer_id: Set((status != RequestStatus::Pending).then_some(STAFF_ID)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert activity")
}

pub async fn approved_enrollment(
    db: &DatabaseConnection,
    student_id: i32,
    course_id: i32,
    semester_id: i32,
) -> activities::Model {
    activity(
        db,
        student_id,
        course_id,
        semester_id,
        ActivityType::Enrollment,
        RequestStatus::Approved,
    )
    .await
}
