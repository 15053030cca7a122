// Library crate for the campus registry service
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod course;
pub mod enrollment;
pub mod routes;
pub mod server;
pub mod session;
pub mod shared;
pub mod store;
pub mod student;

// Re-export commonly used types for easier access in tests
pub use config::{AdminCredentials, AppConfig, ConfigError};
pub use session::{Role, SessionClaims, SessionSubject, SessionTokenCodec};
pub use shared::{AppError, AppState};
pub use store::{InMemoryStore, SqliteStore};
