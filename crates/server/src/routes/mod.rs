use crate::state::AppState;
use utoipa_axum::{router::OpenApiRouter, routes};

pub mod activities;
pub mod auth;
pub mod courses;
pub mod health;
pub mod organizations;
pub mod programs;
pub mod semesters;
pub mod students;
pub mod teaching;
pub mod users;

/// Every API route, collected with its OpenAPI description
pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health::health))
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
        .routes(routes!(students::get_stats))
        .routes(routes!(students::get_history))
        .routes(routes!(activities::list_for_review))
        .routes(routes!(activities::pending_counts))
        .routes(routes!(activities::recent))
        .routes(routes!(activities::submit_enrollment))
        .routes(routes!(activities::submit_withdrawal))
        .routes(routes!(activities::submit_exam_delay))
        .routes(routes!(activities::decide))
        .routes(routes!(semesters::list_semesters, semesters::create_semester))
        .routes(routes!(semesters::current_semester))
        .routes(routes!(semesters::get_window))
        .routes(routes!(semesters::delete_semester))
        .routes(routes!(courses::list_courses, courses::create_course))
        .routes(routes!(courses::update_course, courses::delete_course))
        .routes(routes!(
            courses::list_prerequisites,
            courses::add_prerequisite
        ))
        .routes(routes!(courses::remove_prerequisite))
        .routes(routes!(teaching::course_roster))
        .routes(routes!(users::list_students, users::create_student))
        .routes(routes!(users::update_student, users::delete_student))
        .routes(routes!(users::list_professors, users::create_professor))
        .routes(routes!(users::update_professor, users::delete_professor))
        .routes(routes!(users::list_staff, users::create_staff))
        .routes(routes!(users::update_staff, users::delete_staff))
        .routes(routes!(users::update_user))
        .routes(routes!(
            organizations::list_centers,
            organizations::create_center
        ))
        .routes(routes!(organizations::delete_center))
        .routes(routes!(
            organizations::list_departments,
            organizations::create_department
        ))
        .routes(routes!(organizations::delete_department))
        .routes(routes!(programs::list_programs, programs::create_program))
        .routes(routes!(programs::delete_program))
        .routes(routes!(
            programs::list_specializations,
            programs::create_specialization
        ))
        .routes(routes!(programs::delete_specialization))
        .routes(routes!(programs::student_programs, programs::assign_program))
        .routes(routes!(
            teaching::list_assignments,
            teaching::assign_course
        ))
        .routes(routes!(teaching::unassign_course))
        .routes(routes!(teaching::teaching_semesters))
        .routes(routes!(teaching::overview))
        .routes(routes!(teaching::taught_courses))
        .routes(routes!(teaching::student_report))
        .routes(routes!(teaching::credit_report))
}
