use crate::{
    dtos::user::{
        CreateProfessorRequest, CreateStaffRequest, CreateStudentRequest, CreatedResponse,
        ProfessorResponse, ProfessorRowResponse, StaffResponse, StaffRowResponse,
        StudentResponse, StudentRowResponse, UpdateProfessorRequest, UpdateStaffRequest,
        UpdateStudentRequest, UpdateUserRequest, UserResponse,
    },
    error::{ApiResult, ErrorResponse},
    extractors::CurrentUser,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::user::UserService;

type Created = (StatusCode, Json<CreatedResponse>);

fn created(id: i32) -> Created {
    (StatusCode::CREATED, Json(CreatedResponse { id }))
}

/// Every student, newest first
#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "Students", body = Vec<StudentResponse>),
        (status = 403, description = "Caller is a student", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn list_students(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<StudentResponse>>> {
    let students = UserService::list_students(&state.db, &user.context()).await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

/// Creates the user and student rows together
#[utoipa::path(
    post,
    path = "/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = CreatedResponse),
        (status = 400, description = "Missing field or malformed email", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown program", body = ErrorResponse),
        (status = 409, description = "Email already used", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn create_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateStudentRequest>,
) -> ApiResult<Created> {
    let id = UserService::create_student(&state.db, &user.context(), request.into()).await?;
    Ok(created(id))
}

#[utoipa::path(
    put,
    path = "/students/{id}",
    params(("id" = i32, Path, description = "Student user ID")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentRowResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown student", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn update_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStudentRequest>,
) -> ApiResult<Json<StudentRowResponse>> {
    let student =
        UserService::update_student(&state.db, &user.context(), id, request.birthday).await?;
    Ok(Json(student.into()))
}

#[utoipa::path(
    delete,
    path = "/students/{id}",
    params(("id" = i32, Path, description = "Student user ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown student", body = ErrorResponse),
        (status = 409, description = "Student has activities", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn delete_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    UserService::delete_student(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/professors",
    responses(
        (status = 200, description = "Professors", body = Vec<ProfessorResponse>),
        (status = 403, description = "Caller is not staff", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn list_professors(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<ProfessorResponse>>> {
    let professors = UserService::list_professors(&state.db, &user.context()).await?;
    Ok(Json(professors.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/professors",
    request_body = CreateProfessorRequest,
    responses(
        (status = 201, description = "Professor created", body = CreatedResponse),
        (status = 400, description = "Missing field or malformed email", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown department", body = ErrorResponse),
        (status = 409, description = "Email already used", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn create_professor(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateProfessorRequest>,
) -> ApiResult<Created> {
    let id = UserService::create_professor(&state.db, &user.context(), request.into()).await?;
    Ok(created(id))
}

#[utoipa::path(
    put,
    path = "/professors/{id}",
    params(("id" = i32, Path, description = "Professor user ID")),
    request_body = UpdateProfessorRequest,
    responses(
        (status = 200, description = "Professor updated", body = ProfessorRowResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown professor or department", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn update_professor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateProfessorRequest>,
) -> ApiResult<Json<ProfessorRowResponse>> {
    let professor = UserService::update_professor(
        &state.db,
        &user.context(),
        id,
        request.office_location,
        request.department_id,
    )
    .await?;
    Ok(Json(professor.into()))
}

#[utoipa::path(
    delete,
    path = "/professors/{id}",
    params(("id" = i32, Path, description = "Professor user ID")),
    responses(
        (status = 204, description = "Professor deleted"),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown professor", body = ErrorResponse),
        (status = 409, description = "Professor has teaching assignments", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn delete_professor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    UserService::delete_professor(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/staff",
    responses(
        (status = 200, description = "Staff members", body = Vec<StaffResponse>),
        (status = 403, description = "Caller is not staff", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn list_staff(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<StaffResponse>>> {
    let staff = UserService::list_staff(&state.db, &user.context()).await?;
    Ok(Json(staff.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/staff",
    request_body = CreateStaffRequest,
    responses(
        (status = 201, description = "Staff member created", body = CreatedResponse),
        (status = 400, description = "Missing field or malformed email", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 409, description = "Email already used", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn create_staff(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateStaffRequest>,
) -> ApiResult<Created> {
    let id = UserService::create_staff(&state.db, &user.context(), request.into()).await?;
    Ok(created(id))
}

#[utoipa::path(
    put,
    path = "/staff/{id}",
    params(("id" = i32, Path, description = "Staff user ID")),
    request_body = UpdateStaffRequest,
    responses(
        (status = 200, description = "Staff member updated", body = StaffRowResponse),
        (status = 400, description = "Blank position", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown staff member", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn update_staff(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStaffRequest>,
) -> ApiResult<Json<StaffRowResponse>> {
    let member =
        UserService::update_staff(&state.db, &user.context(), id, request.position).await?;
    Ok(Json(member.into()))
}

/// Staff cannot delete themselves or anyone who has decided a request
#[utoipa::path(
    delete,
    path = "/staff/{id}",
    params(("id" = i32, Path, description = "Staff user ID")),
    responses(
        (status = 204, description = "Staff member deleted"),
        (status = 403, description = "Caller is not staff, or deleting themselves", body = ErrorResponse),
        (status = 404, description = "Unknown staff member", body = ErrorResponse),
        (status = 409, description = "Staff member has reviewed requests", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn delete_staff(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    UserService::delete_staff(&state.db, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Changes name, email or phone number of any user
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Blank name or malformed email", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 409, description = "Email already used", body = ErrorResponse)
    ),
    security(("user_id" = [], "user_role" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let updated = UserService::update_user(&state.db, &user.context(), id, request.into()).await?;
    Ok(Json(updated.into()))
}
