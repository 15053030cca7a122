// Public API - what other modules can use
pub use handlers::{create_course, get_course, list_courses, search_courses, update_course};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
