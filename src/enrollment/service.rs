use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{repository::EnrollmentRepository, types::EnrollmentRequest};
use crate::course::models::CourseModel;
use crate::shared::AppError;
use crate::student::types::StudentResponse;

/// Service for enrollment operations on behalf of an authenticated caller
pub struct EnrollmentService {
    repository: Arc<dyn EnrollmentRepository + Send + Sync>,
}

/// A student may only act on their own record
fn ensure_own_record(caller: i64, student_id: i64) -> Result<(), AppError> {
    if caller != student_id {
        warn!(caller, student_id, "Student acted on another student's record");
        return Err(AppError::Forbidden(
            "Students may only manage their own enrollments".to_string(),
        ));
    }
    Ok(())
}

fn validate(request: &EnrollmentRequest) -> Result<(), AppError> {
    if request.student_id <= 0 || request.course_id <= 0 {
        return Err(AppError::BadRequest(
            "Missing student_id or course_id".to_string(),
        ));
    }
    Ok(())
}

impl EnrollmentService {
    pub fn new(repository: Arc<dyn EnrollmentRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn enroll(&self, caller: i64, request: EnrollmentRequest) -> Result<i64, AppError> {
        validate(&request)?;
        ensure_own_record(caller, request.student_id)?;

        let id = self
            .repository
            .enroll(request.student_id, request.course_id)
            .await?;

        info!(enrollment_id = id, "Student enrolled");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn unenroll(&self, caller: i64, request: EnrollmentRequest) -> Result<(), AppError> {
        validate(&request)?;
        ensure_own_record(caller, request.student_id)?;

        self.repository
            .unenroll(request.student_id, request.course_id)
            .await?;

        info!("Student unenrolled");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn courses_for_student(
        &self,
        caller: i64,
        student_id: i64,
    ) -> Result<Vec<CourseModel>, AppError> {
        ensure_own_record(caller, student_id)?;
        self.repository.courses_for_student(student_id).await
    }

    #[instrument(skip(self))]
    pub async fn students_for_course(
        &self,
        course_id: i64,
    ) -> Result<Vec<StudentResponse>, AppError> {
        let students = self.repository.students_for_course(course_id).await?;
        Ok(students.into_iter().map(StudentResponse::from).collect())
    }
}
