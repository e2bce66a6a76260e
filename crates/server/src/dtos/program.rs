use chrono::NaiveDate;
use database::{
    entities::{degree_programs, specializations},
    services::program::{
        NewProgram, NewSpecialization, ProgramSummary, SpecializationDetail, StudentProgram,
    },
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProgramRequest {
    pub code: String,
    pub name: String,
}

impl From<CreateProgramRequest> for NewProgram {
    fn from(request: CreateProgramRequest) -> Self {
        Self {
            code: request.code,
            name: request.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgramResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
}

impl From<degree_programs::Model> for ProgramResponse {
    fn from(program: degree_programs::Model) -> Self {
        Self {
            id: program.id,
            code: program.code,
            name: program.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgramSummaryResponse {
    #[serde(flatten)]
    pub program: ProgramResponse,
    pub student_count: u64,
    pub specialization_count: u64,
}

impl From<ProgramSummary> for ProgramSummaryResponse {
    fn from(summary: ProgramSummary) -> Self {
        Self {
            program: summary.program.into(),
            student_count: summary.student_count,
            specialization_count: summary.specialization_count,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSpecializationRequest {
    pub code: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub program_id: i32,
}

impl From<CreateSpecializationRequest> for NewSpecialization {
    fn from(request: CreateSpecializationRequest) -> Self {
        Self {
            code: request.code,
            name: request.name,
            start_date: request.start_date,
            program_id: request.program_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SpecializationResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub program_id: i32,
}

impl From<specializations::Model> for SpecializationResponse {
    fn from(specialization: specializations::Model) -> Self {
        Self {
            id: specialization.id,
            code: specialization.code,
            name: specialization.name,
            start_date: specialization.start_date,
            program_id: specialization.program_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SpecializationDetailResponse {
    #[serde(flatten)]
    pub specialization: SpecializationResponse,
    pub program_code: String,
    pub program_name: String,
}

impl From<SpecializationDetail> for SpecializationDetailResponse {
    fn from(detail: SpecializationDetail) -> Self {
        Self {
            specialization: detail.specialization.into(),
            program_code: detail.program_code,
            program_name: detail.program_name,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SpecializationQueryParams {
    /// Only specializations of this program
    pub program_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignProgramRequest {
    pub program_id: i32,
    /// Defaults to today
    pub enrollment_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentProgramResponse {
    #[serde(flatten)]
    pub program: ProgramResponse,
    pub enrollment_date: NaiveDate,
}

impl From<StudentProgram> for StudentProgramResponse {
    fn from(link: StudentProgram) -> Self {
        Self {
            program: link.program.into(),
            enrollment_date: link.enrollment_date,
        }
    }
}
