pub mod activity;
pub mod backend;
pub mod context;
pub mod credits;
pub mod error;
pub mod exam_delay;
pub mod semester;
