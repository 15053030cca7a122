use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::{debug, instrument};

use super::models::{CourseModel, CoursePatch, NewCourse};
use crate::shared::AppError;
use crate::store::{database_error, InMemoryStore, SqliteStore};

const COURSE_COLUMNS: &str = "id, name, description, duration, credits, price";

/// Trait for course repository operations
#[async_trait]
pub trait CourseRepository {
    async fn create_course(&self, course: NewCourse) -> Result<i64, AppError>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<CourseModel>, AppError>;
    async fn list_courses(&self) -> Result<Vec<CourseModel>, AppError>;
    async fn update_course(&self, id: i64, patch: &CoursePatch) -> Result<CourseModel, AppError>;

    /// Courses whose name contains `name`, ignoring ASCII case, ordered by id
    async fn search_courses_by_name(&self, name: &str) -> Result<Vec<CourseModel>, AppError>;
}

fn course_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("No course found with id {}", id))
}

/// Escapes LIKE wildcards so the search term matches literally
fn like_pattern(name: &str) -> String {
    let mut pattern = String::with_capacity(name.len() + 2);
    pattern.push('%');
    for c in name.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    #[instrument(skip(self, course), fields(name = %course.name))]
    async fn create_course(&self, course: NewCourse) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_course_id();
        tables.courses.insert(id, course.into_model(id));

        debug!(course_id = id, "Course created in memory");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_course_by_id(&self, id: i64) -> Result<Option<CourseModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.courses.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_courses(&self) -> Result<Vec<CourseModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.courses.values().cloned().collect())
    }

    #[instrument(skip(self, patch))]
    async fn update_course(&self, id: i64, patch: &CoursePatch) -> Result<CourseModel, AppError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&id)
            .ok_or_else(|| course_not_found(id))?;
        patch.apply(course);

        debug!(course_id = id, "Course updated in memory");
        Ok(course.clone())
    }

    #[instrument(skip(self))]
    async fn search_courses_by_name(&self, name: &str) -> Result<Vec<CourseModel>, AppError> {
        let needle = name.to_ascii_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .values()
            .filter(|c| c.name.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseRepository for SqliteStore {
    #[instrument(skip(self, course), fields(name = %course.name))]
    async fn create_course(&self, course: NewCourse) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO courses (name, description, duration, credits, price) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&course.name)
        .bind(&course.description)
        .bind(&course.duration)
        .bind(course.credits)
        .bind(course.price)
        .execute(self.pool())
        .await
        .map_err(database_error("create course"))?;

        let id = result.last_insert_rowid();
        debug!(course_id = id, "Course created in database");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_course_by_id(&self, id: i64) -> Result<Option<CourseModel>, AppError> {
        sqlx::query_as::<_, CourseModel>(&format!(
            "SELECT {} FROM courses WHERE id = ? LIMIT 1",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(database_error("get course"))
    }

    #[instrument(skip(self))]
    async fn list_courses(&self) -> Result<Vec<CourseModel>, AppError> {
        sqlx::query_as::<_, CourseModel>(&format!(
            "SELECT {} FROM courses ORDER BY id",
            COURSE_COLUMNS
        ))
        .fetch_all(self.pool())
        .await
        .map_err(database_error("list courses"))
    }

    #[instrument(skip(self, patch))]
    async fn update_course(&self, id: i64, patch: &CoursePatch) -> Result<CourseModel, AppError> {
        let mut tx = self.write_transaction("update course").await?;
        let outcome = patch_course(tx.connection()?, id, patch).await;
        let course = tx.finish(outcome).await?;

        debug!(course_id = id, "Course updated in database");
        Ok(course)
    }

    #[instrument(skip(self))]
    async fn search_courses_by_name(&self, name: &str) -> Result<Vec<CourseModel>, AppError> {
        sqlx::query_as::<_, CourseModel>(&format!(
            "SELECT {} FROM courses WHERE name LIKE ? ESCAPE '\\' ORDER BY id",
            COURSE_COLUMNS
        ))
        .bind(like_pattern(name))
        .fetch_all(self.pool())
        .await
        .map_err(database_error("search courses"))
    }
}

async fn patch_course(
    conn: &mut SqliteConnection,
    id: i64,
    patch: &CoursePatch,
) -> Result<CourseModel, AppError> {
    let mut course = sqlx::query_as::<_, CourseModel>(&format!(
        "SELECT {} FROM courses WHERE id = ? LIMIT 1",
        COURSE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(database_error("update course"))?
    .ok_or_else(|| course_not_found(id))?;

    patch.apply(&mut course);

    sqlx::query(
        "UPDATE courses SET name = ?, description = ?, duration = ?, credits = ?, price = ? WHERE id = ?",
    )
    .bind(&course.name)
    .bind(&course.description)
    .bind(&course.duration)
    .bind(course.credits)
    .bind(course.price)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(database_error("update course"))?;

    Ok(course)
}
