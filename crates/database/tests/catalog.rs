mod common;

use common::*;
use database::{
    entities::course_prerequisites,
    services::{
        auth::AuthService,
        course::{CourseChanges, CourseService, NewCourse},
        organization::OrganizationService,
        semester::SemesterService,
    },
};
use models::{
    activity::{ActivityType, RequestStatus},
    context::{RequestContext, Role},
    error::{ServiceError, ValidationError},
};
use sea_orm::EntityTrait;

fn new_course(code: &str, credit: i32) -> NewCourse {
    NewCourse {
        code: code.to_string(),
        title: "Data Structures".to_string(),
        description: Some("  Lists, trees and graphs ".to_string()),
        credit,
        passing_score: 60,
        department_id: None,
    }
}

#[tokio::test]
async fn test_create_semester_derives_name() {
    let db = setup().await;

    let fall = SemesterService::create_semester(
        &db,
        &staff_ctx(),
        date(2024, 9, 1),
        date(2024, 12, 20),
    )
    .await
    .unwrap();
    assert_eq!(fall.name, "241");

    let spring = SemesterService::create_semester(
        &db,
        &staff_ctx(),
        date(2025, 1, 15),
        date(2025, 5, 15),
    )
    .await
    .unwrap();
    assert_eq!(spring.name, "252");

    let current = SemesterService::current_semester(&db).await.unwrap();
    assert_eq!(current, Some(spring));
}

#[tokio::test]
async fn test_create_semester_rejects_bad_input() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;

    assert!(matches!(
        SemesterService::create_semester(&db, &ctx, date(2024, 9, 1), date(2024, 12, 20)).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        SemesterService::create_semester(&db, &staff_ctx(), date(2024, 9, 1), date(2024, 9, 1))
            .await,
        Err(ServiceError::Validation(
            ValidationError::SemesterDatesNotOrdered { .. }
        ))
    ));

    SemesterService::create_semester(&db, &staff_ctx(), date(2024, 9, 1), date(2024, 12, 20))
        .await
        .unwrap();
    assert!(matches!(
        SemesterService::create_semester(&db, &staff_ctx(), date(2024, 9, 1), date(2025, 1, 10))
            .await,
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        SemesterService::create_semester(&db, &staff_ctx(), date(2024, 8, 1), date(2024, 12, 20))
            .await,
        Err(ServiceError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_list_and_delete_semesters() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    student(&db, 6, "Charles", "Babbage").await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS102", 3).await;
    let fall = fall_2024(&db).await;
    let spring = semester(&db, "252", date(2025, 1, 15), date(2025, 5, 15)).await;

    approved_enrollment(&db, 5, 1, fall.id).await;
    approved_enrollment(&db, 5, 2, fall.id).await;
    activity(&db, 6, 1, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;

    let listed = SemesterService::list_semesters(&db).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].semester.id, spring.id);
    assert_eq!(listed[0].activity_count, 0);
    assert_eq!(listed[1].student_count, 2);
    assert_eq!(listed[1].activity_count, 3);

    let window = SemesterService::semester_window(&db, fall.id).await.unwrap();
    assert_eq!(window.start, date(2024, 9, 1));
    assert_eq!(window.end, date(2024, 12, 20));

    assert_eq!(
        SemesterService::delete_semester(&db, &staff_ctx(), fall.id).await,
        Err(ServiceError::InUse {
            entity: "semester",
            id: fall.id,
            dependents: 3,
        })
    );
    SemesterService::delete_semester(&db, &staff_ctx(), spring.id)
        .await
        .unwrap();
    assert_eq!(
        SemesterService::semester_window(&db, spring.id).await,
        Err(ServiceError::not_found("semester", spring.id))
    );
}

#[tokio::test]
async fn test_create_course_validates_fields() {
    let db = setup().await;

    let created = CourseService::create_course(&db, &staff_ctx(), new_course("CS201", 4))
        .await
        .unwrap();
    assert_eq!(created.code, "CS201");
    assert_eq!(created.description.as_deref(), Some("Lists, trees and graphs"));

    assert!(matches!(
        CourseService::create_course(&db, &staff_ctx(), new_course("CS201", 3)).await,
        Err(ServiceError::Conflict(_))
    ));
    assert_eq!(
        CourseService::create_course(&db, &staff_ctx(), new_course("CS301", 11)).await,
        Err(ServiceError::from(ValidationError::OutOfRange {
            field: "credit",
            value: 11,
            min: 1,
            max: 10,
        }))
    );
    assert_eq!(
        CourseService::create_course(&db, &staff_ctx(), new_course("  ", 3)).await,
        Err(ServiceError::from(ValidationError::MissingField("code")))
    );

    let mut bad_score = new_course("CS302", 3);
    bad_score.passing_score = 101;
    assert!(matches!(
        CourseService::create_course(&db, &staff_ctx(), bad_score).await,
        Err(ServiceError::Validation(ValidationError::OutOfRange {
            field: "passing_score",
            ..
        }))
    ));
}

#[tokio::test]
async fn test_list_courses() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    student(&db, 6, "Charles", "Babbage").await;
    let dept = department(&db, "Computer Science").await;
    let mut with_dept = new_course("CS101", 3);
    with_dept.department_id = Some(dept.id);
    let cs101 = CourseService::create_course(&db, &staff_ctx(), with_dept)
        .await
        .unwrap();
    let art = CourseService::create_course(&db, &staff_ctx(), new_course("ART100", 2))
        .await
        .unwrap();
    let fall = fall_2024(&db).await;
    let spring = semester(&db, "252", date(2025, 1, 15), date(2025, 5, 15)).await;

    approved_enrollment(&db, 5, cs101.id, fall.id).await;
    approved_enrollment(&db, 5, cs101.id, spring.id).await;
    approved_enrollment(&db, 6, cs101.id, fall.id).await;
    activity(&db, 6, art.id, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;

    let courses = CourseService::list_courses(&db).await.unwrap();
    let codes: Vec<&str> = courses.iter().map(|c| c.course.code.as_str()).collect();
    assert_eq!(codes, vec!["ART100", "CS101"]);
    assert_eq!(courses[0].student_count, 0);
    assert_eq!(courses[0].department, None);
    assert_eq!(courses[1].student_count, 2);
    assert_eq!(courses[1].department.as_deref(), Some("Computer Science"));

    let departments = OrganizationService::list_departments(&db).await.unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].department, dept);
    assert_eq!(departments[0].course_count, 1);
    assert_eq!(departments[0].professor_count, 0);
}

#[tokio::test]
async fn test_update_course() {
    let db = setup().await;
    let dept = department(&db, "Mathematics").await;
    let created = CourseService::create_course(&db, &staff_ctx(), new_course("MA101", 3))
        .await
        .unwrap();

    let updated = CourseService::update_course(
        &db,
        &staff_ctx(),
        created.id,
        CourseChanges {
            title: Some("  Calculus I ".to_string()),
            credit: Some(4),
            department_id: Some(dept.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.code, "MA101");
    assert_eq!(updated.title, "Calculus I");
    assert_eq!(updated.credit, 4);
    assert_eq!(updated.passing_score, 60);
    assert_eq!(updated.description.as_deref(), Some("Lists, trees and graphs"));
    assert_eq!(updated.department_id, Some(dept.id));

    let cleared = CourseService::update_course(
        &db,
        &staff_ctx(),
        created.id,
        CourseChanges {
            description: Some("   ".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.credit, 4);

    assert!(matches!(
        CourseService::update_course(
            &db,
            &staff_ctx(),
            created.id,
            CourseChanges {
                credit: Some(11),
                ..Default::default()
            },
        )
        .await,
        Err(ServiceError::Validation(ValidationError::OutOfRange { field: "credit", .. }))
    ));
    assert!(matches!(
        CourseService::update_course(
            &db,
            &staff_ctx(),
            created.id,
            CourseChanges {
                title: Some(" ".to_string()),
                ..Default::default()
            },
        )
        .await,
        Err(ServiceError::Validation(ValidationError::MissingField("title")))
    ));
    assert_eq!(
        CourseService::update_course(&db, &staff_ctx(), 999, CourseChanges::default()).await,
        Err(ServiceError::not_found("course", 999))
    );
    assert!(matches!(
        CourseService::update_course(
            &db,
            &RequestContext::student(5),
            created.id,
            CourseChanges::default()
        )
        .await,
        Err(ServiceError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_prerequisite_management() {
    let db = setup().await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS201", 3).await;
    course(&db, 3, "MATH101", 3).await;

    assert_eq!(
        CourseService::add_prerequisite(&db, &staff_ctx(), 2, 2).await,
        Err(ServiceError::from(ValidationError::SelfPrerequisite))
    );
    assert_eq!(
        CourseService::add_prerequisite(&db, &staff_ctx(), 2, 99).await,
        Err(ServiceError::not_found("course", 99))
    );

    CourseService::add_prerequisite(&db, &staff_ctx(), 2, 3)
        .await
        .unwrap();
    CourseService::add_prerequisite(&db, &staff_ctx(), 2, 1)
        .await
        .unwrap();
    assert!(matches!(
        CourseService::add_prerequisite(&db, &staff_ctx(), 2, 1).await,
        Err(ServiceError::Conflict(_))
    ));

    let required = CourseService::prerequisites_of(&db, 2).await.unwrap();
    let codes: Vec<&str> = required.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["CS101", "MATH101"]);

    CourseService::remove_prerequisite(&db, &staff_ctx(), 2, 3)
        .await
        .unwrap();
    assert_eq!(
        CourseService::remove_prerequisite(&db, &staff_ctx(), 2, 3).await,
        Err(ServiceError::not_found("prerequisite", 3))
    );
    assert_eq!(CourseService::prerequisites_of(&db, 2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_course() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS201", 3).await;
    course(&db, 3, "CS301", 3).await;
    requires(&db, 2, 1).await;
    requires(&db, 3, 2).await;
    let fall = fall_2024(&db).await;
    approved_enrollment(&db, 5, 1, fall.id).await;

    assert_eq!(
        CourseService::delete_course(&db, &staff_ctx(), 1).await,
        Err(ServiceError::InUse {
            entity: "course",
            id: 1,
            dependents: 1,
        })
    );
    assert!(matches!(
        CourseService::delete_course(&db, &RequestContext::student(5), 2).await,
        Err(ServiceError::Forbidden(_))
    ));

    CourseService::delete_course(&db, &staff_ctx(), 2).await.unwrap();
    assert!(
        course_prerequisites::Entity::find()
            .all(&db)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        CourseService::prerequisites_of(&db, 2).await,
        Err(ServiceError::not_found("course", 2))
    );
}

#[tokio::test]
async fn test_authenticate() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    let dept = department(&db, "Mathematics").await;
    professor(&db, 7, Some(dept.id)).await;

    let ada = AuthService::authenticate(&db, 5, Role::Student)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ada.full_name(), "Ada Lovelace");
    assert_eq!(ada.context(), RequestContext::student(5));

    let registrar = AuthService::authenticate(&db, STAFF_ID, Role::Staff)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(registrar.position.as_deref(), Some("Registrar"));

    let prof = AuthService::authenticate(&db, 7, Role::Professor)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(prof.department.as_deref(), Some("Mathematics"));

    // A student id does not grant staff access
    assert_eq!(
        AuthService::authenticate(&db, 5, Role::Staff).await.unwrap(),
        None
    );
    assert_eq!(
        AuthService::authenticate(&db, 42, Role::Student)
            .await
            .unwrap(),
        None
    );
}
