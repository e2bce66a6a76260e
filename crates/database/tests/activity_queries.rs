mod common;

use common::*;
use database::services::{
    activity::ActivityService,
    activity_query::{ActivityQueryService, PendingCounts, ReviewFilter, StudentStats},
};
use models::{
    activity::{ActivityType, RequestStatus, SortOrder},
    error::ServiceError,
    exam_delay::ExamDelayRequest,
};

#[tokio::test]
async fn test_student_stats() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS102", 4).await;
    course(&db, 3, "CS103", 2).await;
    let fall = fall_2024(&db).await;

    approved_enrollment(&db, 5, 1, fall.id).await;
    activity(&db, 5, 2, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;
    activity(&db, 5, 3, fall.id, ActivityType::Withdrawal, RequestStatus::Approved).await;

    let stats = ActivityQueryService::get_student_stats(&db, &ctx, 5, Some(fall.id))
        .await
        .unwrap();
    assert_eq!(
        stats,
        StudentStats {
            enrolled: 1,
            credits: 3,
            pending: 1,
        }
    );

    let all_time = ActivityQueryService::get_student_stats(&db, &staff_ctx(), 5, None)
        .await
        .unwrap();
    assert_eq!(all_time, stats);
}

#[tokio::test]
async fn test_stats_are_scoped_by_semester() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS201", 4).await;
    let fall = fall_2024(&db).await;
    let spring = semester(&db, "252", date(2025, 1, 15), date(2025, 5, 15)).await;
    course(&db, 3, "CS301", 2).await;
    approved_enrollment(&db, 5, 1, fall.id).await;
    approved_enrollment(&db, 5, 2, spring.id).await;
    activity(&db, 5, 3, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;

    // Enrolled and credits follow the semester; open requests do not
    let spring_stats = ActivityQueryService::get_student_stats(&db, &ctx, 5, Some(spring.id))
        .await
        .unwrap();
    assert_eq!(
        spring_stats,
        StudentStats {
            enrolled: 1,
            credits: 4,
            pending: 1,
        }
    );

    let all_time = ActivityQueryService::get_student_stats(&db, &ctx, 5, None)
        .await
        .unwrap();
    assert_eq!(all_time.enrolled, 2);
    assert_eq!(all_time.credits, 7);
    assert_eq!(all_time.pending, 1);
}

#[tokio::test]
async fn test_students_only_see_their_own_stats() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    student(&db, 6, "Charles", "Babbage").await;

    assert!(matches!(
        ActivityQueryService::get_student_stats(&db, &ctx, 6, None).await,
        Err(ServiceError::Forbidden(_))
    ));

    let empty = ActivityQueryService::get_student_stats(&db, &ctx, 5, None)
        .await
        .unwrap();
    assert_eq!(empty, StudentStats::default());
}

#[tokio::test]
async fn test_pending_counts() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    student(&db, 6, "Charles", "Babbage").await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS102", 3).await;
    let fall = fall_2024(&db).await;

    activity(&db, 5, 1, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;
    activity(&db, 6, 1, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;
    activity(&db, 5, 2, fall.id, ActivityType::Withdrawal, RequestStatus::Pending).await;
    activity(&db, 6, 2, fall.id, ActivityType::ExamDelay, RequestStatus::Rejected).await;

    let counts = ActivityQueryService::pending_counts(&db, &staff_ctx())
        .await
        .unwrap();
    assert_eq!(
        counts,
        PendingCounts {
            enrollment: 2,
            withdrawal: 1,
            exam_delay: 0,
            total: 3,
        }
    );

    assert!(matches!(
        ActivityQueryService::pending_counts(&db, &models::context::RequestContext::student(5)).await,
        Err(ServiceError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_review_listing_filters_and_orders() {
    let db = setup().await;
    student(&db, 5, "Ada", "Lovelace").await;
    student(&db, 6, "Charles", "Babbage").await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS102", 3).await;
    let fall = fall_2024(&db).await;

    let first = activity(&db, 5, 1, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;
    let second =
        activity(&db, 6, 2, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;
    let decided =
        activity(&db, 6, 1, fall.id, ActivityType::Enrollment, RequestStatus::Approved).await;
    activity(&db, 5, 2, fall.id, ActivityType::Withdrawal, RequestStatus::Pending).await;

    let newest = ActivityQueryService::list_for_review(
        &db,
        &staff_ctx(),
        ReviewFilter::pending(ActivityType::Enrollment),
    )
    .await
    .unwrap();
    let ids: Vec<i32> = newest.iter().map(|d| d.activity.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(newest[0].student_name, "Charles Babbage");
    assert_eq!(newest[0].course_code, "CS102");
    assert_eq!(newest[0].credit, 3);
    assert_eq!(newest[0].semester_name, "241");

    let everything = ActivityQueryService::list_for_review(
        &db,
        &staff_ctx(),
        ReviewFilter {
            activity_type: ActivityType::Enrollment,
            status: None,
            order: SortOrder::OldestFirst,
        },
    )
    .await
    .unwrap();
    let ids: Vec<i32> = everything.iter().map(|d| d.activity.id).collect();
    assert_eq!(ids, vec![first.id, second.id, decided.id]);
}

#[tokio::test]
async fn test_review_listing_includes_exam_delay_detail() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    course(&db, 1, "CS101", 3).await;
    let fall = fall_2024(&db).await;
    approved_enrollment(&db, 5, 1, fall.id).await;

    ActivityService::submit_exam_delay(
        &db,
        &ctx,
        1,
        fall.id,
        ExamDelayRequest::new("hospital stay", date(2024, 12, 2), date(2024, 12, 9)),
    )
    .await
    .unwrap();

    let rows = ActivityQueryService::list_for_review(
        &db,
        &staff_ctx(),
        ReviewFilter::pending(ActivityType::ExamDelay),
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    let detail = rows[0].exam_delay.as_ref().unwrap();
    assert_eq!(detail.reason, "hospital stay");
    assert_eq!(detail.old_exam_date, date(2024, 12, 2));

    assert!(matches!(
        ActivityQueryService::list_for_review(
            &db,
            &ctx,
            ReviewFilter::pending(ActivityType::ExamDelay)
        )
        .await,
        Err(ServiceError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_student_history_and_recent_activity() {
    let db = setup().await;
    let ctx = student(&db, 5, "Ada", "Lovelace").await;
    student(&db, 6, "Charles", "Babbage").await;
    course(&db, 1, "CS101", 3).await;
    course(&db, 2, "CS102", 3).await;
    let fall = fall_2024(&db).await;

    let enrolled = approved_enrollment(&db, 5, 1, fall.id).await;
    let withdrawal =
        activity(&db, 5, 1, fall.id, ActivityType::Withdrawal, RequestStatus::Pending).await;
    let other = activity(&db, 6, 2, fall.id, ActivityType::Enrollment, RequestStatus::Pending).await;

    let history = ActivityQueryService::student_history(&db, &ctx, 5, None)
        .await
        .unwrap();
    let ids: Vec<i32> = history.iter().map(|d| d.activity.id).collect();
    assert_eq!(ids, vec![withdrawal.id, enrolled.id]);

    let enrollments =
        ActivityQueryService::student_history(&db, &ctx, 5, Some(ActivityType::Enrollment))
            .await
            .unwrap();
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0].activity.id, enrolled.id);

    assert!(matches!(
        ActivityQueryService::student_history(&db, &ctx, 6, None).await,
        Err(ServiceError::Forbidden(_))
    ));

    let recent = ActivityQueryService::recent_activity(&db, &staff_ctx(), None, 2)
        .await
        .unwrap();
    let ids: Vec<i32> = recent.iter().map(|d| d.activity.id).collect();
    assert_eq!(ids, vec![other.id, withdrawal.id]);

    assert!(matches!(
        ActivityQueryService::recent_activity(&db, &ctx, None, 5).await,
        Err(ServiceError::Forbidden(_))
    ));
    let own = ActivityQueryService::recent_activity(&db, &ctx, Some(5), 5)
        .await
        .unwrap();
    assert_eq!(own.len(), 2);
}
