pub mod activities;
pub mod course_prerequisites;
pub mod courses;
pub mod degree_programs;
pub mod departments;
pub mod education_centers;
pub mod exam_delays;
pub mod professor_courses;
pub mod professors;
pub mod semesters;
pub mod specializations;
pub mod staff;
pub mod student_programs;
pub mod students;
pub mod users;
