use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::course::models::CourseModel;
use crate::enrollment::models::EnrollmentModel;
use crate::student::models::StudentModel;

/// Rows of every table, guarded together so multi-table checks are atomic
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub students: BTreeMap<i64, StudentModel>,
    pub courses: BTreeMap<i64, CourseModel>,
    pub enrollments: BTreeMap<i64, EnrollmentModel>,
    last_student_id: i64,
    last_course_id: i64,
    last_enrollment_id: i64,
}

impl Tables {
    pub fn next_student_id(&mut self) -> i64 {
        self.last_student_id += 1;
        self.last_student_id
    }

    pub fn next_course_id(&mut self) -> i64 {
        self.last_course_id += 1;
        self.last_course_id
    }

    pub fn next_enrollment_id(&mut self) -> i64 {
        self.last_enrollment_id += 1;
        self.last_enrollment_id
    }

    pub fn email_taken(&self, email: &str, except_id: Option<i64>) -> bool {
        self.students
            .values()
            .any(|s| s.email == email && Some(s.id) != except_id)
    }

    pub fn find_enrollment(&self, student_id: i64, course_id: i64) -> Option<i64> {
        self.enrollments
            .values()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
            .map(|e| e.id)
    }
}

/// In-memory implementation of every repository for development and testing
///
/// Ids are assigned sequentially from 1, like SQLite's AUTOINCREMENT.
/// Data is lost when the application restarts.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub(crate) tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current number of enrollment rows
    pub async fn enrollment_count(&self) -> usize {
        self.tables.read().await.enrollments.len()
    }
}
