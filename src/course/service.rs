use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{CourseModel, CoursePatch, NewCourse},
    repository::CourseRepository,
    types::CreateCourseRequest,
};
use crate::shared::AppError;

/// Service for course catalogue operations
pub struct CourseService {
    repository: Arc<dyn CourseRepository + Send + Sync>,
}

fn validate_amounts(credits: Option<i64>, price: Option<i64>) -> Result<(), AppError> {
    if credits.is_some_and(|c| c < 0) {
        return Err(AppError::BadRequest("Field 'credits' cannot be negative".to_string()));
    }
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("Field 'price' cannot be negative".to_string()));
    }
    Ok(())
}

impl CourseService {
    pub fn new(repository: Arc<dyn CourseRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateCourseRequest) -> Result<i64, AppError> {
        if request.name.trim().is_empty() {
            return Err(AppError::BadRequest("Field 'name' is required".to_string()));
        }
        validate_amounts(Some(request.credits), Some(request.price))?;

        let id = self
            .repository
            .create_course(NewCourse {
                name: request.name,
                description: request.description,
                duration: request.duration,
                credits: request.credits,
                price: request.price,
            })
            .await?;

        info!(course_id = id, "Course created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<CourseModel, AppError> {
        self.repository
            .get_course_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No course found with id {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CourseModel>, AppError> {
        self.repository.list_courses().await
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: CoursePatch) -> Result<CourseModel, AppError> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::BadRequest("Field 'name' cannot be blank".to_string()));
        }
        validate_amounts(patch.credits, patch.price)?;

        let course = self.repository.update_course(id, &patch).await?;

        info!(course_id = id, "Course updated");
        Ok(course)
    }

    /// A blank query is a client error and an empty result is `NotFound`
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> Result<Vec<CourseModel>, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Missing course name query parameter".to_string(),
            ));
        }

        let courses = self.repository.search_courses_by_name(name).await?;
        if courses.is_empty() {
            warn!("No course matched the search");
            return Err(AppError::NotFound(format!(
                "No courses found matching '{}'",
                name
            )));
        }

        Ok(courses)
    }
}
