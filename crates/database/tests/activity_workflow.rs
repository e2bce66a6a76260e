mod common;

use common::*;
use database::{
    entities::{activities, exam_delays},
    services::{activity::ActivityService, activity_query::ActivityQueryService},
};
use models::{
    activity::{ActivityType, Decision, RequestStatus},
    context::{RequestContext, Role},
    credits::CreditWarning,
    error::{ServiceError, ValidationError},
    exam_delay::ExamDelayRequest,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};

#[tokio::test]
async fn test_second_pending_enrollment_is_a_duplicate() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;

    let first = ActivityService::submit_enrollment(&db, &ctx, 10, fall.id)
        .await
        .unwrap();
    assert_eq!(first.activity.request_status, RequestStatus::Pending);
    assert_eq!(first.activity.activity_type, ActivityType::Enrollment);
    assert_eq!(first.activity.reviewer_id, None);

    let second = ActivityService::submit_enrollment(&db, &ctx, 10, fall.id).await;
    assert_eq!(
        second,
        Err(ServiceError::DuplicateRequest {
            existing_id: Some(first.activity.id),
            status: RequestStatus::Pending,
        })
    );
}

#[tokio::test]
async fn test_approved_enrollment_blocks_same_semester_only() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    let spring = semester(&db, "252", date(2025, 1, 15), date(2025, 5, 15)).await;
    let approved = approved_enrollment(&db, 5, 10, fall.id).await;

    let again = ActivityService::submit_enrollment(&db, &ctx, 10, fall.id).await;
    assert_eq!(
        again,
        Err(ServiceError::DuplicateRequest {
            existing_id: Some(approved.id),
            status: RequestStatus::Approved,
        })
    );

    assert!(
        ActivityService::submit_enrollment(&db, &ctx, 10, spring.id)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_rejected_request_can_be_resubmitted() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    activity(
        &db,
        5,
        10,
        fall.id,
        ActivityType::Enrollment,
        RequestStatus::Rejected,
    )
    .await;

    assert!(
        ActivityService::submit_enrollment(&db, &ctx, 10, fall.id)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_credit_ceiling() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    let fall = fall_2024(&db).await;

    // 18 approved credits
    for id in 1..=6 {
        course(&db, id, &format!("GEN{id}"), 3).await;
        approved_enrollment(&db, 5, id, fall.id).await;
    }
    course(&db, 20, "CS401", 4).await;
    course(&db, 21, "CS301", 3).await;

    assert_eq!(
        ActivityService::submit_enrollment(&db, &ctx, 20, fall.id).await,
        Err(ServiceError::CreditLimitExceeded {
            current: 18,
            requested: 4,
            limit: 21,
        })
    );

    ActivityService::submit_enrollment(&db, &ctx, 21, fall.id)
        .await
        .unwrap();
    assert_eq!(
        ActivityQueryService::credit_load(&db, 5, fall.id)
            .await
            .unwrap(),
        21
    );
}

#[tokio::test]
async fn test_pending_enrollments_count_towards_ceiling() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    let fall = fall_2024(&db).await;
    for (id, code) in [(1, "MATH201"), (2, "PHYS201"), (3, "CS201")] {
        course(&db, id, code, 7).await;
    }

    ActivityService::submit_enrollment(&db, &ctx, 1, fall.id)
        .await
        .unwrap();
    ActivityService::submit_enrollment(&db, &ctx, 2, fall.id)
        .await
        .unwrap();
    ActivityService::submit_enrollment(&db, &ctx, 3, fall.id)
        .await
        .unwrap();

    course(&db, 4, "ART100", 1).await;
    assert!(matches!(
        ActivityService::submit_enrollment(&db, &ctx, 4, fall.id).await,
        Err(ServiceError::CreditLimitExceeded { current: 21, .. })
    ));
}

#[tokio::test]
async fn test_missing_prerequisite_blocks_enrollment() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS201", 3).await;
    requires(&db, 2, 1).await;
    let fall = fall_2024(&db).await;
    let spring = semester(&db, "252", date(2025, 1, 15), date(2025, 5, 15)).await;

    assert_eq!(
        ActivityService::submit_enrollment(&db, &ctx, 2, fall.id).await,
        Err(ServiceError::PrerequisiteNotMet {
            course_id: 2,
            missing: vec![1],
        })
    );

    // Completing the prerequisite in the same term does not count
    approved_enrollment(&db, 5, 1, fall.id).await;
    assert!(matches!(
        ActivityService::submit_enrollment(&db, &ctx, 2, fall.id).await,
        Err(ServiceError::PrerequisiteNotMet { .. })
    ));

    assert!(
        ActivityService::submit_enrollment(&db, &ctx, 2, spring.id)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_submission_requires_student_and_known_targets() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;

    assert!(matches!(
        ActivityService::submit_enrollment(&db, &staff_ctx(), 10, fall.id).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        ActivityService::submit_enrollment(&db, &RequestContext::new(7, Role::Professor), 10, fall.id)
            .await,
        Err(ServiceError::Forbidden(_))
    ));
    assert_eq!(
        ActivityService::submit_enrollment(&db, &ctx, 99, fall.id).await,
        Err(ServiceError::not_found("course", 99))
    );
    assert_eq!(
        ActivityService::submit_enrollment(&db, &ctx, 10, 99).await,
        Err(ServiceError::not_found("semester", 99))
    );
}

#[tokio::test]
async fn test_withdrawal_needs_approved_enrollment() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;

    assert_eq!(
        ActivityService::submit_withdrawal(&db, &ctx, 10, fall.id).await,
        Err(ServiceError::NoApprovedEnrollment { course_id: 10 })
    );

    // A pending enrollment is not enough
    ActivityService::submit_enrollment(&db, &ctx, 10, fall.id)
        .await
        .unwrap();
    assert_eq!(
        ActivityService::submit_withdrawal(&db, &ctx, 10, fall.id).await,
        Err(ServiceError::NoApprovedEnrollment { course_id: 10 })
    );
}

#[tokio::test]
async fn test_withdrawal_below_minimum_warns_but_is_accepted() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    let fall = fall_2024(&db).await;
    for id in 1..=4 {
        course(&db, id, &format!("ENG{id}"), 4).await;
        approved_enrollment(&db, 5, id, fall.id).await;
    }

    let submission = ActivityService::submit_withdrawal(&db, &ctx, 1, fall.id)
        .await
        .unwrap();
    assert_eq!(submission.activity.activity_type, ActivityType::Withdrawal);
    assert_eq!(submission.activity.request_status, RequestStatus::Pending);
    assert_eq!(
        submission.warning,
        Some(CreditWarning::BelowMinimum {
            remaining: 12,
            minimum: 14,
        })
    );

    assert!(matches!(
        ActivityService::submit_withdrawal(&db, &ctx, 1, fall.id).await,
        Err(ServiceError::DuplicateRequest { .. })
    ));
}

#[tokio::test]
async fn test_withdrawal_warning_counts_pending_enrollments() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    let fall = fall_2024(&db).await;
    for id in 1..=3 {
        course(&db, id, &format!("ENG{id}"), 4).await;
        approved_enrollment(&db, 5, id, fall.id).await;
    }
    course(&db, 4, "LAB1", 6).await;
    activity(&db, 5, 4, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;

    // 12 approved + 6 pending - 4 withdrawn leaves 14, which meets the minimum
    let submission = ActivityService::submit_withdrawal(&db, &ctx, 1, fall.id)
        .await
        .unwrap();
    assert_eq!(submission.warning, None);
}

#[tokio::test]
async fn test_exam_delay_validation() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    approved_enrollment(&db, 5, 10, fall.id).await;

    let submit = |reason: &str, old, new| {
        ActivityService::submit_exam_delay(
            &db,
            &ctx,
            10,
            fall.id,
            ExamDelayRequest::new(reason, old, new),
        )
    };

    assert!(matches!(
        submit("sick leave note", date(2024, 12, 1), date(2024, 12, 1)).await,
        Err(ServiceError::Validation(ValidationError::DatesNotOrdered { .. }))
    ));
    assert!(matches!(
        submit("sick leave note", date(2024, 12, 5), date(2024, 12, 1)).await,
        Err(ServiceError::Validation(ValidationError::DatesNotOrdered { .. }))
    ));
    assert!(matches!(
        submit("123456789", date(2024, 12, 1), date(2024, 12, 5)).await,
        Err(ServiceError::Validation(ValidationError::ReasonTooShort { .. }))
    ));
    assert!(matches!(
        submit("sick leave note", date(2024, 12, 1), date(2025, 1, 5)).await,
        Err(ServiceError::Validation(ValidationError::DateOutsideSemester { .. }))
    ));

    let accepted = submit("1234567890", date(2024, 12, 1), date(2024, 12, 5))
        .await
        .unwrap();
    assert_eq!(accepted.activity.activity_type, ActivityType::ExamDelay);

    let detail = exam_delays::Entity::find_by_id(accepted.activity.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(Some(detail.clone()), accepted.exam_delay);
    assert_eq!(detail.reason, "1234567890");
    assert_eq!(detail.new_exam_date, date(2024, 12, 5));
}

#[tokio::test]
async fn test_exam_delay_needs_enrollment() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;

    let request = ExamDelayRequest::new("family emergency", date(2024, 12, 1), date(2024, 12, 8));
    assert_eq!(
        ActivityService::submit_exam_delay(&db, &ctx, 10, fall.id, request).await,
        Err(ServiceError::NoApprovedEnrollment { course_id: 10 })
    );
    assert!(
        activities::Entity::find()
            .all(&db)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_failed_exam_delay_detail_leaves_no_activity() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    approved_enrollment(&db, 5, 10, fall.id).await;
    db.execute_unprepared("DROP TABLE exam_delays")
        .await
        .unwrap();

    let request = ExamDelayRequest::new("family emergency", date(2024, 12, 1), date(2024, 12, 8));
    assert!(matches!(
        ActivityService::submit_exam_delay(&db, &ctx, 10, fall.id, request).await,
        Err(ServiceError::BackendFailure { code: None, .. })
    ));

    let delays = activities::Entity::find()
        .filter(activities::Column::ActivityType.eq(ActivityType::ExamDelay))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(delays, 0);
    assert_eq!(activities::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_decision_is_final() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    let submitted = ActivityService::submit_enrollment(&db, &ctx, 10, fall.id)
        .await
        .unwrap()
        .activity;

    let approved = ActivityService::decide(&db, &staff_ctx(), submitted.id, Decision::Approved)
        .await
        .unwrap();
    assert_eq!(approved.request_status, RequestStatus::Approved);
    assert_eq!(approved.reviewer_id, Some(STAFF_ID));

    assert_eq!(
        ActivityService::decide(&db, &staff_ctx(), submitted.id, Decision::Rejected).await,
        Err(ServiceError::InvalidTransition {
            activity_id: submitted.id,
            current: RequestStatus::Approved,
        })
    );

    let stored = activities::Entity::find_by_id(submitted.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, approved);
}

#[tokio::test]
async fn test_decide_checks_caller_and_target() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    let submitted = ActivityService::submit_enrollment(&db, &ctx, 10, fall.id)
        .await
        .unwrap()
        .activity;

    assert!(matches!(
        ActivityService::decide(&db, &ctx, submitted.id, Decision::Approved).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert_eq!(
        ActivityService::decide(&db, &staff_ctx(), 999, Decision::Approved).await,
        Err(ServiceError::not_found("activity", 999))
    );

    let rejected = ActivityService::decide(&db, &staff_ctx(), submitted.id, Decision::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.request_status, RequestStatus::Rejected);
}

#[tokio::test]
async fn test_store_rejects_second_pending_row() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 10, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    let spring = semester(&db, "252", date(2025, 1, 15), date(2025, 5, 15)).await;
    activity(
        &db,
        5,
        10,
        fall.id,
        ActivityType::Enrollment,
        RequestStatus::Pending,
    )
    .await;

    // Even across semesters only one pending request per student, course and type
    let err = activities::ActiveModel {
        student_id: Set(5),
        course_id: Set(10),
        semester_id: Set(spring.id),
        activity_type: Set(ActivityType::Enrollment),
        submission_date: Set(date(2025, 1, 20)),
        request_status: Set(RequestStatus::Pending),
        reviewer_id: Set(None),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap_err();

    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
}
