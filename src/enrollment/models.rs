use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for enrollments table
///
/// `(student_id, course_id)` is unique; both ids reference existing rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct EnrollmentModel {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub enrolled_at: DateTime<Utc>,
}

impl EnrollmentModel {
    pub fn new(id: i64, student_id: i64, course_id: i64) -> Self {
        Self {
            id,
            student_id,
            course_id,
            enrolled_at: Utc::now(),
        }
    }
}
