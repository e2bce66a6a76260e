use database::{
    entities::{departments, education_centers},
    services::organization::{CenterSummary, DepartmentSummary, NewCenter, NewDepartment},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCenterRequest {
    pub name: String,
    pub phone_number: Option<String>,
}

impl From<CreateCenterRequest> for NewCenter {
    fn from(request: CreateCenterRequest) -> Self {
        Self {
            name: request.name,
            phone_number: request.phone_number,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CenterResponse {
    pub id: i32,
    pub name: String,
    pub phone_number: Option<String>,
}

impl From<education_centers::Model> for CenterResponse {
    fn from(center: education_centers::Model) -> Self {
        Self {
            id: center.id,
            name: center.name,
            phone_number: center.phone_number,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CenterSummaryResponse {
    #[serde(flatten)]
    pub center: CenterResponse,
    pub department_count: u64,
}

impl From<CenterSummary> for CenterSummaryResponse {
    fn from(summary: CenterSummary) -> Self {
        Self {
            center: summary.center.into(),
            department_count: summary.department_count,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub office_location: Option<String>,
    pub phone_number: Option<String>,
    pub center_id: i32,
}

impl From<CreateDepartmentRequest> for NewDepartment {
    fn from(request: CreateDepartmentRequest) -> Self {
        Self {
            name: request.name,
            office_location: request.office_location,
            phone_number: request.phone_number,
            center_id: request.center_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentResponse {
    pub id: i32,
    pub name: String,
    pub office_location: Option<String>,
    pub phone_number: Option<String>,
    pub center_id: Option<i32>,
}

impl From<departments::Model> for DepartmentResponse {
    fn from(department: departments::Model) -> Self {
        Self {
            id: department.id,
            name: department.name,
            office_location: department.office_location,
            phone_number: department.phone_number,
            center_id: department.center_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentSummaryResponse {
    #[serde(flatten)]
    pub department: DepartmentResponse,
    /// Name of the education center
    pub center: Option<String>,
    pub professor_count: u64,
    pub course_count: u64,
}

impl From<DepartmentSummary> for DepartmentSummaryResponse {
    fn from(summary: DepartmentSummary) -> Self {
        Self {
            department: summary.department.into(),
            center: summary.center,
            professor_count: summary.professor_count,
            course_count: summary.course_count,
        }
    }
}
