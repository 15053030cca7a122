// Public API - what other modules can use
pub use handlers::{
    find_student_by_email, get_student, list_students, register_student, update_student,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
