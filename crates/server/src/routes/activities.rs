use crate::{
    dtos::activity::{
        ActivityDetailResponse, ActivityRequest, ActivityResponse, DecisionRequest,
        ExamDelayBody, PendingCountsResponse, RecentQueryParams, ReviewQueryParams,
        SubmissionResponse,
    },
    error::{ApiResult, ErrorResponse},
    extractors::CurrentUser,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::{
    activity::ActivityService,
    activity_query::{ActivityQueryService, ReviewFilter},
};
use models::{
    activity::{ActivityType, Decision, RequestStatus},
    exam_delay::ExamDelayRequest,
};

type Created = (StatusCode, Json<SubmissionResponse>);

/// Requests enrollment in a course
#[utoipa::path(
    post,
    path = "/activities/enrollments",
    request_body = ActivityRequest,
    responses(
        (status = 201, description = "Enrollment request filed", body = SubmissionResponse),
        (status = 403, description = "Caller is not a student", body = ErrorResponse),
        (status = 404, description = "Unknown course or semester", body = ErrorResponse),
        (status = 409, description = "A matching request already exists", body = ErrorResponse),
        (status = 422, description = "Credit limit or prerequisites not met", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Activities"
)]
pub async fn submit_enrollment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ActivityRequest>,
) -> ApiResult<Created> {
    let submission = ActivityService::submit_enrollment(
        &state.db,
        &user.context(),
        request.course_id,
        request.semester_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Requests withdrawal from an enrolled course
#[utoipa::path(
    post,
    path = "/activities/withdrawals",
    request_body = ActivityRequest,
    responses(
        (status = 201, description = "Withdrawal request filed, possibly with a credit warning", body = SubmissionResponse),
        (status = 409, description = "A matching request already exists", body = ErrorResponse),
        (status = 422, description = "No approved enrollment", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Activities"
)]
pub async fn submit_withdrawal(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ActivityRequest>,
) -> ApiResult<Created> {
    let submission = ActivityService::submit_withdrawal(
        &state.db,
        &user.context(),
        request.course_id,
        request.semester_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Requests moving an exam to a later date
#[utoipa::path(
    post,
    path = "/activities/exam-delays",
    request_body = ExamDelayBody,
    responses(
        (status = 201, description = "Exam delay request filed", body = SubmissionResponse),
        (status = 400, description = "Reason or dates rejected", body = ErrorResponse),
        (status = 409, description = "A matching request already exists", body = ErrorResponse),
        (status = 422, description = "No approved enrollment", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Activities"
)]
pub async fn submit_exam_delay(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ExamDelayBody>,
) -> ApiResult<Created> {
    let request = ExamDelayRequest::new(body.reason, body.old_exam_date, body.new_exam_date);
    let submission = ActivityService::submit_exam_delay(
        &state.db,
        &user.context(),
        body.course_id,
        body.semester_id,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Approves or rejects a pending request
#[utoipa::path(
    post,
    path = "/activities/{id}/decision",
    params(("id" = i32, Path, description = "Activity ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = ActivityResponse),
        (status = 400, description = "Decision is not Approved or Rejected", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown activity", body = ErrorResponse),
        (status = 409, description = "Activity already decided", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Activities"
)]
pub async fn decide(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<Json<ActivityResponse>> {
    let decision: Decision = request.decision.parse()?;
    let activity = ActivityService::decide(&state.db, &user.context(), id, decision).await?;
    Ok(Json(activity.into()))
}

/// Staff review listing for one activity type
#[utoipa::path(
    get,
    path = "/activities",
    params(ReviewQueryParams),
    responses(
        (status = 200, description = "Matching activities", body = Vec<ActivityDetailResponse>),
        (status = 400, description = "Unknown activity type or status", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Activities"
)]
pub async fn list_for_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ReviewQueryParams>,
) -> ApiResult<Json<Vec<ActivityDetailResponse>>> {
    let filter = ReviewFilter {
        activity_type: params.activity_type.parse::<ActivityType>()?,
        status: params
            .status
            .as_deref()
            .map(str::parse::<RequestStatus>)
            .transpose()?,
        order: params.order,
    };

    let rows = ActivityQueryService::list_for_review(&state.db, &user.context(), filter).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Number of pending requests per type
#[utoipa::path(
    get,
    path = "/activities/pending-counts",
    responses(
        (status = 200, description = "Pending counts", body = PendingCountsResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Activities"
)]
pub async fn pending_counts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<PendingCountsResponse>> {
    let counts = ActivityQueryService::pending_counts(&state.db, &user.context()).await?;
    Ok(Json(counts.into()))
}

/// Latest activities, for one student or across the portal
#[utoipa::path(
    get,
    path = "/activities/recent",
    params(RecentQueryParams),
    responses(
        (status = 200, description = "Recent activities", body = Vec<ActivityDetailResponse>),
        (status = 403, description = "Not allowed to view these activities", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Activities"
)]
pub async fn recent(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<RecentQueryParams>,
) -> ApiResult<Json<Vec<ActivityDetailResponse>>> {
    let rows = ActivityQueryService::recent_activity(
        &state.db,
        &user.context(),
        params.student_id,
        params.limit,
    )
    .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
