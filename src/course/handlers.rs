use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{CourseModel, CoursePatch},
    service::CourseService,
    types::{CreateCourseRequest, SearchQuery},
};
use crate::shared::{
    AppError, AppState, CreatedResponse, JsonBody, MessageResponse, PathParam, QueryParams,
};

fn course_service(state: &AppState) -> CourseService {
    CourseService::new(Arc::clone(&state.course_repository))
}

/// HTTP handler for adding a course to the catalogue
///
/// POST /api/courses
/// Returns 201 with the new course id
#[instrument(name = "create_course", skip(state, request))]
pub async fn create_course(
    State(state): State<AppState>,
    WithRejection(Json(request), _): JsonBody<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = course_service(&state).create(request).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/courses/:id
#[instrument(name = "get_course", skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> Result<Json<CourseModel>, AppError> {
    let course = course_service(&state).get(id).await?;
    Ok(Json(course))
}

/// GET /api/courses/all
#[instrument(name = "list_courses", skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseModel>>, AppError> {
    let courses = course_service(&state).list().await?;

    info!(course_count = courses.len(), "Courses listed");
    Ok(Json(courses))
}

/// PUT /api/courses/update/:id
#[instrument(name = "update_course", skip(state, patch))]
pub async fn update_course(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    WithRejection(Json(patch), _): JsonBody<CoursePatch>,
) -> Result<Json<MessageResponse>, AppError> {
    course_service(&state).update(id, patch).await?;

    Ok(Json(MessageResponse::new("Course updated successfully")))
}

/// GET /api/courses/search?name=
#[instrument(name = "search_courses", skip(state))]
pub async fn search_courses(
    State(state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<SearchQuery>,
) -> Result<Json<Vec<CourseModel>>, AppError> {
    let name = query.name.unwrap_or_default();
    let courses = course_service(&state).search(&name).await?;

    info!(course_count = courses.len(), "Course search matched");
    Ok(Json(courses))
}
