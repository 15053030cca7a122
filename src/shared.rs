use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AdminCredentials, ConfigError};
use crate::course::repository::CourseRepository;
use crate::enrollment::repository::EnrollmentRepository;
use crate::session::SessionTokenCodec;
use crate::student::repository::StudentRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub tokens: SessionTokenCodec,
    pub admin: Arc<AdminCredentials>,
    pub student_repository: Arc<dyn StudentRepository + Send + Sync>,
    pub course_repository: Arc<dyn CourseRepository + Send + Sync>,
    pub enrollment_repository: Arc<dyn EnrollmentRepository + Send + Sync>,
}

impl AppState {
    pub fn new(
        tokens: SessionTokenCodec,
        admin: AdminCredentials,
        student_repository: Arc<dyn StudentRepository + Send + Sync>,
        course_repository: Arc<dyn CourseRepository + Send + Sync>,
        enrollment_repository: Arc<dyn EnrollmentRepository + Send + Sync>,
    ) -> Self {
        Self {
            tokens,
            admin: Arc::new(admin),
            student_repository,
            course_repository,
            enrollment_repository,
        }
    }

    /// Wires every repository to a single backing store
    pub fn with_store<S>(tokens: SessionTokenCodec, admin: AdminCredentials, store: Arc<S>) -> Self
    where
        S: StudentRepository + CourseRepository + EnrollmentRepository + Send + Sync + 'static,
    {
        Self::new(tokens, admin, store.clone(), store.clone(), store)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error")]
    Internal,
}

/// Extractors whose rejections surface as `AppError::BadRequest`
pub type JsonBody<T> = WithRejection<Json<T>, AppError>;
pub type QueryParams<T> = WithRejection<Query<T>, AppError>;
pub type PathParam<T> = WithRejection<Path<T>, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        AppError::Configuration(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Configuration(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "status": "Error",
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Plain acknowledgement body used by login, logout and update endpoints
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for endpoints that create a row
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct CreatedResponse {
    pub id: i64,
}
