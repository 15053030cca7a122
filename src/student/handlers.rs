use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::StudentService,
    types::{EmailQuery, RegisterStudentRequest, StudentResponse, UpdateStudentRequest},
};
use crate::session::StudentId;
use crate::shared::{
    AppError, AppState, CreatedResponse, JsonBody, MessageResponse, PathParam, QueryParams,
};

fn student_service(state: &AppState) -> StudentService {
    StudentService::new(Arc::clone(&state.student_repository))
}

/// HTTP handler for student self-registration
///
/// POST /api/students
/// Returns 201 with the new student id
#[instrument(name = "register_student", skip(state, request))]
pub async fn register_student(
    State(state): State<AppState>,
    WithRejection(Json(request), _): JsonBody<RegisterStudentRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = student_service(&state).register(request).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/students/:id
#[instrument(name = "get_student", skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = student_service(&state).get(id).await?;
    Ok(Json(student))
}

/// GET /api/students/all
#[instrument(name = "list_students", skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let students = student_service(&state).list().await?;

    info!(student_count = students.len(), "Students listed");
    Ok(Json(students))
}

/// GET /api/students?email=
#[instrument(name = "find_student_by_email", skip(state))]
pub async fn find_student_by_email(
    State(state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<EmailQuery>,
) -> Result<Json<StudentResponse>, AppError> {
    let email = query.email.unwrap_or_default();
    let student = student_service(&state).get_by_email(&email).await?;
    Ok(Json(student))
}

/// HTTP handler for a student updating their own record
///
/// PUT /api/students/update
/// The record is taken from the session, never from the body
#[instrument(name = "update_student", skip(state, request))]
pub async fn update_student(
    State(state): State<AppState>,
    Extension(StudentId(id)): Extension<StudentId>,
    WithRejection(Json(request), _): JsonBody<UpdateStudentRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    student_service(&state).update(id, request).await?;

    Ok(Json(MessageResponse::new("Student updated successfully")))
}
