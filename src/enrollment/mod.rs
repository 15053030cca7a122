// Public API - what other modules can use
pub use handlers::{courses_for_student, enroll, students_for_course, unenroll};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
