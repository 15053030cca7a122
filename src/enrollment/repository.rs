use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, instrument, warn};

use super::models::EnrollmentModel;
use crate::course::models::CourseModel;
use crate::shared::AppError;
use crate::store::{database_error, InMemoryStore, SqliteStore};
use crate::student::models::StudentModel;

/// Trait for enrollment operations. Each call is atomic with respect to the others.
#[async_trait]
pub trait EnrollmentRepository {
    /// Links a student to a course and returns the enrollment id.
    ///
    /// Fails with `NotFound` when either id is missing (nothing is written)
    /// and with `Conflict` when the pair is already enrolled.
    async fn enroll(&self, student_id: i64, course_id: i64) -> Result<i64, AppError>;

    /// Removes the pair; `NotFound` when it was not enrolled
    async fn unenroll(&self, student_id: i64, course_id: i64) -> Result<(), AppError>;

    async fn courses_for_student(&self, student_id: i64) -> Result<Vec<CourseModel>, AppError>;
    async fn students_for_course(&self, course_id: i64) -> Result<Vec<StudentModel>, AppError>;
}

fn missing_student(id: i64) -> AppError {
    AppError::NotFound(format!("No student found with id {}", id))
}

fn missing_course(id: i64) -> AppError {
    AppError::NotFound(format!("No course found with id {}", id))
}

fn already_enrolled(student_id: i64, course_id: i64) -> AppError {
    AppError::Conflict(format!(
        "Student {} is already enrolled in course {}",
        student_id, course_id
    ))
}

fn not_enrolled(student_id: i64, course_id: i64) -> AppError {
    AppError::NotFound(format!(
        "No enrollment found for student {} in course {}",
        student_id, course_id
    ))
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    #[instrument(skip(self))]
    async fn enroll(&self, student_id: i64, course_id: i64) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.students.contains_key(&student_id) {
            warn!("Enrollment rejected: unknown student");
            return Err(missing_student(student_id));
        }
        if !tables.courses.contains_key(&course_id) {
            warn!("Enrollment rejected: unknown course");
            return Err(missing_course(course_id));
        }
        if tables.find_enrollment(student_id, course_id).is_some() {
            warn!("Enrollment rejected: already enrolled");
            return Err(already_enrolled(student_id, course_id));
        }

        let id = tables.next_enrollment_id();
        tables
            .enrollments
            .insert(id, EnrollmentModel::new(id, student_id, course_id));

        debug!(enrollment_id = id, "Enrollment stored in memory");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn unenroll(&self, student_id: i64, course_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;

        let id = tables
            .find_enrollment(student_id, course_id)
            .ok_or_else(|| not_enrolled(student_id, course_id))?;
        tables.enrollments.remove(&id);

        debug!(enrollment_id = id, "Enrollment removed from memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn courses_for_student(&self, student_id: i64) -> Result<Vec<CourseModel>, AppError> {
        let tables = self.tables.read().await;
        let mut courses: Vec<CourseModel> = tables
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .filter_map(|e| tables.courses.get(&e.course_id).cloned())
            .collect();
        courses.sort_by_key(|c| c.id);
        Ok(courses)
    }

    #[instrument(skip(self))]
    async fn students_for_course(&self, course_id: i64) -> Result<Vec<StudentModel>, AppError> {
        let tables = self.tables.read().await;
        let mut students: Vec<StudentModel> = tables
            .enrollments
            .values()
            .filter(|e| e.course_id == course_id)
            .filter_map(|e| tables.students.get(&e.student_id).cloned())
            .collect();
        students.sort_by_key(|s| s.id);
        Ok(students)
    }
}

/// Existence checks and insert, run inside one write transaction
async fn insert_enrollment(
    conn: &mut SqliteConnection,
    student_id: i64,
    course_id: i64,
) -> Result<i64, AppError> {
    let student: Option<i64> = sqlx::query_scalar("SELECT id FROM students WHERE id = ?")
        .bind(student_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(database_error("enroll"))?;
    if student.is_none() {
        warn!("Enrollment rejected: unknown student");
        return Err(missing_student(student_id));
    }

    let course: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?")
        .bind(course_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(database_error("enroll"))?;
    if course.is_none() {
        warn!("Enrollment rejected: unknown course");
        return Err(missing_course(course_id));
    }

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM enrollments WHERE student_id = ? AND course_id = ?",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(database_error("enroll"))?;
    if existing.is_some() {
        warn!("Enrollment rejected: already enrolled");
        return Err(already_enrolled(student_id, course_id));
    }

    let result = sqlx::query(
        "INSERT INTO enrollments (student_id, course_id, enrolled_at) VALUES (?, ?, ?)",
    )
    .bind(student_id)
    .bind(course_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| match database_error("enroll")(e) {
        AppError::Conflict(_) => already_enrolled(student_id, course_id),
        other => other,
    })?;

    Ok(result.last_insert_rowid())
}

async fn delete_enrollment(
    conn: &mut SqliteConnection,
    student_id: i64,
    course_id: i64,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM enrollments WHERE student_id = ? AND course_id = ?")
        .bind(student_id)
        .bind(course_id)
        .execute(&mut *conn)
        .await
        .map_err(database_error("unenroll"))?;

    if result.rows_affected() == 0 {
        return Err(not_enrolled(student_id, course_id));
    }
    Ok(())
}

#[async_trait]
impl EnrollmentRepository for SqliteStore {
    #[instrument(skip(self))]
    async fn enroll(&self, student_id: i64, course_id: i64) -> Result<i64, AppError> {
        let mut tx = self.write_transaction("enroll").await?;
        let outcome = insert_enrollment(tx.connection()?, student_id, course_id).await;
        let id = tx.finish(outcome).await?;

        debug!(enrollment_id = id, "Enrollment stored in database");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn unenroll(&self, student_id: i64, course_id: i64) -> Result<(), AppError> {
        let mut tx = self.write_transaction("unenroll").await?;
        let outcome = delete_enrollment(tx.connection()?, student_id, course_id).await;
        tx.finish(outcome).await?;

        debug!("Enrollment removed from database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn courses_for_student(&self, student_id: i64) -> Result<Vec<CourseModel>, AppError> {
        sqlx::query_as::<_, CourseModel>(
            "SELECT c.id, c.name, c.description, c.duration, c.credits, c.price
             FROM courses c
             INNER JOIN enrollments e ON e.course_id = c.id
             WHERE e.student_id = ?
             ORDER BY c.id",
        )
        .bind(student_id)
        .fetch_all(self.pool())
        .await
        .map_err(database_error("courses for student"))
    }

    #[instrument(skip(self))]
    async fn students_for_course(&self, course_id: i64) -> Result<Vec<StudentModel>, AppError> {
        sqlx::query_as::<_, StudentModel>(
            "SELECT s.id, s.full_name, s.email, s.password_hash, s.age, s.gender, s.phone_number, s.dob, s.address
             FROM students s
             INNER JOIN enrollments e ON e.student_id = s.id
             WHERE e.course_id = ?
             ORDER BY s.id",
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await
        .map_err(database_error("students for course"))
    }
}
