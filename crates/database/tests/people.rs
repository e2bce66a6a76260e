mod common;

use common::*;
use database::{
    entities::{professors, staff, student_programs, students, users},
    services::{
        organization::{NewCenter, NewDepartment, OrganizationService},
        program::{NewProgram, ProgramService},
        user::{NewProfessor, NewStaff, NewStudent, NewUser, UserChanges, UserService},
    },
};
use models::{
    activity::{ActivityType, RequestStatus},
    context::RequestContext,
    error::{ServiceError, ValidationError},
};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

fn new_user(first: &str, email: &str) -> NewUser {
    NewUser {
        first_name: first.to_string(),
        last_name: "Hamilton".to_string(),
        email: email.to_string(),
        phone_number: Some(" 0901 234 567 ".to_string()),
    }
}

fn new_student(email: &str) -> NewStudent {
    NewStudent {
        user: new_user("Margaret", email),
        birthday: Some(date(2004, 3, 14)),
        program_id: None,
    }
}

#[tokio::test]
async fn test_create_user_of_each_role() {
    let db = setup().await;
    let program = ProgramService::create_program(
        &db,
        &staff_ctx(),
        NewProgram {
            code: "CS".to_string(),
            name: "Computer Science".to_string(),
        },
    )
    .await
    .unwrap();
    let dept = department(&db, "Mathematics").await;

    let student_id = UserService::create_student(
        &db,
        &staff_ctx(),
        NewStudent {
            program_id: Some(program.id),
            ..new_student("margaret@uni.test")
        },
    )
    .await
    .unwrap();
    let professor_id = UserService::create_professor(
        &db,
        &staff_ctx(),
        NewProfessor {
            user: new_user("Emmy", "emmy@uni.test"),
            office_location: Some("B4-201".to_string()),
            department_id: Some(dept.id),
        },
    )
    .await
    .unwrap();
    let staff_id = UserService::create_staff(
        &db,
        &staff_ctx(),
        NewStaff {
            user: new_user("Katherine", "katherine@uni.test"),
            position: " Advisor ".to_string(),
        },
    )
    .await
    .unwrap();
    assert_ne!(student_id, professor_id);
    assert_ne!(professor_id, staff_id);

    let user = users::Entity::find_by_id(student_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.email, "margaret@uni.test");
    assert_eq!(user.phone_number.as_deref(), Some("0901 234 567"));
    let student = students::Entity::find_by_id(student_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.birthday, Some(date(2004, 3, 14)));
    assert!(
        student_programs::Entity::find_by_id((student_id, program.id))
            .one(&db)
            .await
            .unwrap()
            .is_some()
    );

    let professor = professors::Entity::find_by_id(professor_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(professor.department_id, Some(dept.id));
    let member = staff::Entity::find_by_id(staff_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.position, "Advisor");

    let students = UserService::list_students(&db, &staff_ctx()).await.unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].program_count, 1);

    let professors = UserService::list_professors(&db, &staff_ctx()).await.unwrap();
    assert_eq!(professors[0].department.as_deref(), Some("Mathematics"));
    assert_eq!(professors[0].office_location.as_deref(), Some("B4-201"));

    let staff = UserService::list_staff(&db, &staff_ctx()).await.unwrap();
    let ids: Vec<i32> = staff.iter().map(|s| s.user.id).collect();
    assert_eq!(ids, vec![STAFF_ID, staff_id]);
}

#[tokio::test]
async fn test_create_user_rejects_bad_input() {
    let db = setup().await;

    assert_eq!(
        UserService::create_student(&db, &staff_ctx(), new_student("not-an-address")).await,
        Err(ServiceError::Validation(ValidationError::InvalidEmail(
            "not-an-address".to_string()
        )))
    );
    assert_eq!(
        UserService::create_student(
            &db,
            &staff_ctx(),
            NewStudent {
                user: new_user(" ", "blank@uni.test"),
                ..new_student("blank@uni.test")
            },
        )
        .await,
        Err(ServiceError::Validation(ValidationError::MissingField(
            "first_name"
        )))
    );
    // The staff fixture already owns this address
    assert!(matches!(
        UserService::create_student(&db, &staff_ctx(), new_student("grace.1@uni.test")).await,
        Err(ServiceError::Conflict(_))
    ));
    assert_eq!(
        UserService::create_student(
            &db,
            &staff_ctx(),
            NewStudent {
                program_id: Some(77),
                ..new_student("margaret@uni.test")
            },
        )
        .await,
        Err(ServiceError::not_found("program", 77))
    );
    assert!(matches!(
        UserService::create_staff(
            &db,
            &staff_ctx(),
            NewStaff {
                user: new_user("Katherine", "katherine@uni.test"),
                position: String::new(),
            },
        )
        .await,
        Err(ServiceError::Validation(ValidationError::MissingField("position")))
    ));
    assert!(matches!(
        UserService::create_student(
            &db,
            &RequestContext::student(5),
            new_student("margaret@uni.test")
        )
        .await,
        Err(ServiceError::Forbidden(_))
    ));

    assert_eq!(users::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_role_insert_leaves_no_user() {
    let db = setup().await;
    db.execute_unprepared("DROP TABLE students").await.unwrap();

    assert!(matches!(
        UserService::create_student(&db, &staff_ctx(), new_student("margaret@uni.test")).await,
        Err(ServiceError::BackendFailure { code: None, .. })
    ));

    let users = users::Entity::find().all(&db).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, STAFF_ID);
}

#[tokio::test]
async fn test_update_user_and_role_details() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    professor(&db, 7, None).await;
    let dept = department(&db, "Physics").await;

    let updated = UserService::update_user(
        &db,
        &staff_ctx(),
        5,
        UserChanges {
            last_name: Some(" King ".to_string()),
            email: Some("ada.king@uni.test".to_string()),
            phone_number: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.first_name, "Ada");
    assert_eq!(updated.last_name, "King");
    assert_eq!(updated.email, "ada.king@uni.test");
    assert_eq!(updated.phone_number, None);

    // Keeping your own address is not a clash
    assert!(
        UserService::update_user(
            &db,
            &staff_ctx(),
            5,
            UserChanges {
                email: Some("ada.king@uni.test".to_string()),
                ..Default::default()
            },
        )
        .await
        .is_ok()
    );
    assert!(matches!(
        UserService::update_user(
            &db,
            &staff_ctx(),
            7,
            UserChanges {
                email: Some("ada.king@uni.test".to_string()),
                ..Default::default()
            },
        )
        .await,
        Err(ServiceError::Conflict(_))
    ));
    assert_eq!(
        UserService::update_user(&db, &staff_ctx(), 99, UserChanges::default()).await,
        Err(ServiceError::not_found("user", 99))
    );

    let student = UserService::update_student(&db, &staff_ctx(), 5, Some(date(2003, 12, 10)))
        .await
        .unwrap();
    assert_eq!(student.birthday, Some(date(2003, 12, 10)));

    let professor = UserService::update_professor(
        &db,
        &staff_ctx(),
        7,
        Some("C2-105".to_string()),
        Some(dept.id),
    )
    .await
    .unwrap();
    assert_eq!(professor.office_location.as_deref(), Some("C2-105"));
    assert_eq!(professor.department_id, Some(dept.id));
    assert_eq!(
        UserService::update_professor(&db, &staff_ctx(), 7, None, Some(404)).await,
        Err(ServiceError::not_found("department", 404))
    );

    let member = UserService::update_staff(&db, &staff_ctx(), STAFF_ID, "Dean".to_string())
        .await
        .unwrap();
    assert_eq!(member.position, "Dean");
}

#[tokio::test]
async fn test_delete_users_refused_while_referenced() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    student(&db, 6, "Charles", "Babbage").await;
    professor(&db, 7, None).await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    teaches(&db, 7, 10, fall.id).await;
    // Approved by the staff fixture, so it is the reviewer
    activity(&db, 5, 10, fall.id, ActivityType::Enrollment, RequestStatus::Approved).await;

    assert_eq!(
        UserService::delete_student(&db, &staff_ctx(), 5).await,
        Err(ServiceError::InUse {
            entity: "student",
            id: 5,
            dependents: 1,
        })
    );
    assert_eq!(
        UserService::delete_professor(&db, &staff_ctx(), 7).await,
        Err(ServiceError::InUse {
            entity: "professor",
            id: 7,
            dependents: 1,
        })
    );
    assert!(matches!(
        UserService::delete_staff(&db, &staff_ctx(), STAFF_ID).await,
        Err(ServiceError::Forbidden(_))
    ));

    let other_staff = UserService::create_staff(
        &db,
        &staff_ctx(),
        NewStaff {
            user: new_user("Katherine", "katherine@uni.test"),
            position: "Advisor".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        UserService::delete_staff(&db, &RequestContext::staff(other_staff), STAFF_ID).await,
        Err(ServiceError::InUse {
            entity: "staff",
            id: STAFF_ID,
            dependents: 1,
        })
    );

    UserService::delete_student(&db, &staff_ctx(), 6).await.unwrap();
    UserService::delete_staff(&db, &staff_ctx(), other_staff)
        .await
        .unwrap();
    assert!(users::Entity::find_by_id(6).one(&db).await.unwrap().is_none());
    assert!(
        users::Entity::find_by_id(other_staff)
            .one(&db)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(
        UserService::delete_student(&db, &staff_ctx(), 6).await,
        Err(ServiceError::not_found("student", 6))
    );
}

#[tokio::test]
async fn test_listing_students_needs_faculty() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    let prof = professor(&db, 7, None).await;

    assert_eq!(UserService::list_students(&db, &prof).await.unwrap().len(), 1);
    assert!(matches!(
        UserService::list_students(&db, &RequestContext::student(5)).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        UserService::list_professors(&db, &prof).await,
        Err(ServiceError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_centers_and_departments() {
    let db = setup().await;
    let center = OrganizationService::create_center(
        &db,
        &staff_ctx(),
        NewCenter {
            name: " School of Engineering ".to_string(),
            phone_number: Some("  ".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(center.name, "School of Engineering");
    assert_eq!(center.phone_number, None);

    let dept = OrganizationService::create_department(
        &db,
        &staff_ctx(),
        NewDepartment {
            name: "Computer Science".to_string(),
            office_location: Some("H6".to_string()),
            phone_number: None,
            center_id: center.id,
        },
    )
    .await
    .unwrap();
    assert_eq!(dept.center_id, Some(center.id));
    assert_eq!(
        OrganizationService::create_department(
            &db,
            &staff_ctx(),
            NewDepartment {
                name: "Nowhere".to_string(),
                office_location: None,
                phone_number: None,
                center_id: 404,
            },
        )
        .await,
        Err(ServiceError::not_found("education center", 404))
    );

    let centers = OrganizationService::list_centers(&db).await.unwrap();
    assert_eq!(centers.len(), 1);
    assert_eq!(centers[0].department_count, 1);

    professor(&db, 7, Some(dept.id)).await;
    let departments = OrganizationService::list_departments(&db).await.unwrap();
    assert_eq!(departments[0].center.as_deref(), Some("School of Engineering"));
    assert_eq!(departments[0].professor_count, 1);

    assert_eq!(
        OrganizationService::delete_center(&db, &staff_ctx(), center.id).await,
        Err(ServiceError::InUse {
            entity: "education center",
            id: center.id,
            dependents: 1,
        })
    );
    assert_eq!(
        OrganizationService::delete_department(&db, &staff_ctx(), dept.id).await,
        Err(ServiceError::InUse {
            entity: "department",
            id: dept.id,
            dependents: 1,
        })
    );

    UserService::update_professor(&db, &staff_ctx(), 7, None, None)
        .await
        .unwrap();
    OrganizationService::delete_department(&db, &staff_ctx(), dept.id)
        .await
        .unwrap();
    OrganizationService::delete_center(&db, &staff_ctx(), center.id)
        .await
        .unwrap();
    assert!(OrganizationService::list_centers(&db).await.unwrap().is_empty());

    assert!(matches!(
        OrganizationService::create_center(
            &db,
            &RequestContext::professor(7),
            NewCenter {
                name: "Annex".to_string(),
                phone_number: None,
            },
        )
        .await,
        Err(ServiceError::Forbidden(_))
    ));
}
