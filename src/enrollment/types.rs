use serde::Deserialize;

/// Request payload for `POST /api/enrollment` and `POST /api/unenrollment`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnrollmentRequest {
    pub student_id: i64,
    pub course_id: i64,
}
