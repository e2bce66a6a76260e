use chrono::NaiveDate;
use database::{
    entities::{professors, staff, students, users},
    services::user::{
        NewProfessor, NewStaff, NewStudent, NewUser, ProfessorSummary, StaffSummary,
        StudentSummary, UserChanges,
    },
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Personal details shared by every role
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl From<UserFields> for NewUser {
    fn from(fields: UserFields) -> Self {
        Self {
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone_number: fields.phone_number,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    #[serde(flatten)]
    pub user: UserFields,
    pub birthday: Option<NaiveDate>,
    /// Degree program joined on creation
    pub program_id: Option<i32>,
}

impl From<CreateStudentRequest> for NewStudent {
    fn from(request: CreateStudentRequest) -> Self {
        Self {
            user: request.user.into(),
            birthday: request.birthday,
            program_id: request.program_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProfessorRequest {
    #[serde(flatten)]
    pub user: UserFields,
    pub office_location: Option<String>,
    pub department_id: Option<i32>,
}

impl From<CreateProfessorRequest> for NewProfessor {
    fn from(request: CreateProfessorRequest) -> Self {
        Self {
            user: request.user.into(),
            office_location: request.office_location,
            department_id: request.department_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStaffRequest {
    #[serde(flatten)]
    pub user: UserFields,
    pub position: String,
}

impl From<CreateStaffRequest> for NewStaff {
    fn from(request: CreateStaffRequest) -> Self {
        Self {
            user: request.user.into(),
            position: request.position,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}

/// Fields left out keep their current value; an empty phone number clears it
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone_number: request.phone_number,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfessorRequest {
    pub office_location: Option<String>,
    pub department_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStaffRequest {
    pub position: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone_number: user.phone_number,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub birthday: Option<NaiveDate>,
    pub program_count: u64,
}

impl From<StudentSummary> for StudentResponse {
    fn from(summary: StudentSummary) -> Self {
        Self {
            user: summary.user.into(),
            birthday: summary.birthday,
            program_count: summary.program_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfessorResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub office_location: Option<String>,
    pub department: Option<String>,
    pub assignment_count: u64,
}

impl From<ProfessorSummary> for ProfessorResponse {
    fn from(summary: ProfessorSummary) -> Self {
        Self {
            user: summary.user.into(),
            office_location: summary.office_location,
            department: summary.department,
            assignment_count: summary.assignment_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub position: String,
}

impl From<StaffSummary> for StaffResponse {
    fn from(summary: StaffSummary) -> Self {
        Self {
            user: summary.user.into(),
            position: summary.position,
        }
    }
}

/// Role row after an update
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentRowResponse {
    pub user_id: i32,
    pub birthday: Option<NaiveDate>,
}

impl From<students::Model> for StudentRowResponse {
    fn from(student: students::Model) -> Self {
        Self {
            user_id: student.user_id,
            birthday: student.birthday,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfessorRowResponse {
    pub user_id: i32,
    pub office_location: Option<String>,
    pub department_id: Option<i32>,
}

impl From<professors::Model> for ProfessorRowResponse {
    fn from(professor: professors::Model) -> Self {
        Self {
            user_id: professor.user_id,
            office_location: professor.office_location,
            department_id: professor.department_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffRowResponse {
    pub user_id: i32,
    pub position: String,
}

impl From<staff::Model> for StaffRowResponse {
    fn from(member: staff::Model) -> Self {
        Self {
            user_id: member.user_id,
            position: member.position,
        }
    }
}
