pub mod activity;
pub mod auth;
pub mod course;
pub mod organization;
pub mod program;
pub mod semester;
pub mod student;
pub mod teaching;
pub mod user;
