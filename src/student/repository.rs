use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::{debug, instrument, warn};

use super::models::{NewStudent, StudentModel, StudentPatch};
use crate::shared::AppError;
use crate::store::{database_error, InMemoryStore, SqliteStore};

const STUDENT_COLUMNS: &str =
    "id, full_name, email, password_hash, age, gender, phone_number, dob, address";

/// Trait for student repository operations
#[async_trait]
pub trait StudentRepository {
    /// Inserts a student and returns its id; a taken email is a `Conflict`
    async fn create_student(&self, student: NewStudent) -> Result<i64, AppError>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<StudentModel>, AppError>;
    async fn get_student_by_email(&self, email: &str) -> Result<Option<StudentModel>, AppError>;
    async fn list_students(&self) -> Result<Vec<StudentModel>, AppError>;

    /// Applies the patch to an existing student and returns the stored result
    async fn update_student(
        &self,
        id: i64,
        patch: &StudentPatch,
    ) -> Result<StudentModel, AppError>;
}

fn email_conflict(email: &str) -> AppError {
    AppError::Conflict(format!("Email {} is already registered", email))
}

fn student_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("No student found with id {}", id))
}

#[async_trait]
impl StudentRepository for InMemoryStore {
    #[instrument(skip(self, student), fields(email = %student.email))]
    async fn create_student(&self, student: NewStudent) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&student.email, None) {
            warn!("Student email already exists in memory");
            return Err(email_conflict(&student.email));
        }

        let id = tables.next_student_id();
        tables.students.insert(id, student.into_model(id));

        debug!(student_id = id, "Student created in memory");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_student_by_id(&self, id: i64) -> Result<Option<StudentModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.students.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_student_by_email(&self, email: &str) -> Result<Option<StudentModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.students.values().find(|s| s.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn list_students(&self) -> Result<Vec<StudentModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.students.values().cloned().collect())
    }

    #[instrument(skip(self, patch))]
    async fn update_student(
        &self,
        id: i64,
        patch: &StudentPatch,
    ) -> Result<StudentModel, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &patch.email {
            if tables.email_taken(email, Some(id)) {
                warn!(student_id = id, "Updated email belongs to another student");
                return Err(email_conflict(email));
            }
        }

        let student = tables
            .students
            .get_mut(&id)
            .ok_or_else(|| student_not_found(id))?;
        patch.apply(student);

        debug!(student_id = id, "Student updated in memory");
        Ok(student.clone())
    }
}

#[async_trait]
impl StudentRepository for SqliteStore {
    #[instrument(skip(self, student), fields(email = %student.email))]
    async fn create_student(&self, student: NewStudent) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO students (full_name, email, password_hash, age, gender, phone_number, dob, address) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&student.full_name)
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(student.age)
        .bind(&student.gender)
        .bind(&student.phone_number)
        .bind(&student.dob)
        .bind(&student.address)
        .execute(self.pool())
        .await
        .map_err(|e| match database_error("create student")(e) {
            AppError::Conflict(_) => email_conflict(&student.email),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        debug!(student_id = id, "Student created in database");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_student_by_id(&self, id: i64) -> Result<Option<StudentModel>, AppError> {
        sqlx::query_as::<_, StudentModel>(&format!(
            "SELECT {} FROM students WHERE id = ? LIMIT 1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(database_error("get student"))
    }

    #[instrument(skip(self))]
    async fn get_student_by_email(&self, email: &str) -> Result<Option<StudentModel>, AppError> {
        sqlx::query_as::<_, StudentModel>(&format!(
            "SELECT {} FROM students WHERE email = ? LIMIT 1",
            STUDENT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(database_error("get student by email"))
    }

    #[instrument(skip(self))]
    async fn list_students(&self) -> Result<Vec<StudentModel>, AppError> {
        sqlx::query_as::<_, StudentModel>(&format!(
            "SELECT {} FROM students ORDER BY id",
            STUDENT_COLUMNS
        ))
        .fetch_all(self.pool())
        .await
        .map_err(database_error("list students"))
    }

    #[instrument(skip(self, patch))]
    async fn update_student(
        &self,
        id: i64,
        patch: &StudentPatch,
    ) -> Result<StudentModel, AppError> {
        let mut tx = self.write_transaction("update student").await?;
        let outcome = patch_student(tx.connection()?, id, patch).await;
        let student = tx.finish(outcome).await?;

        debug!(student_id = id, "Student updated in database");
        Ok(student)
    }
}

/// Read-modify-write of one student row inside a write transaction
async fn patch_student(
    conn: &mut SqliteConnection,
    id: i64,
    patch: &StudentPatch,
) -> Result<StudentModel, AppError> {
    let mut student = sqlx::query_as::<_, StudentModel>(&format!(
        "SELECT {} FROM students WHERE id = ? LIMIT 1",
        STUDENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(database_error("update student"))?
    .ok_or_else(|| student_not_found(id))?;

    patch.apply(&mut student);

    sqlx::query(
        "UPDATE students SET full_name = ?, email = ?, password_hash = ?, age = ?, gender = ?, phone_number = ?, dob = ?, address = ? WHERE id = ?",
    )
    .bind(&student.full_name)
    .bind(&student.email)
    .bind(&student.password_hash)
    .bind(student.age)
    .bind(&student.gender)
    .bind(&student.phone_number)
    .bind(&student.dob)
    .bind(&student.address)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| match database_error("update student")(e) {
        AppError::Conflict(_) => email_conflict(&student.email),
        other => other,
    })?;

    Ok(student)
}
