use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool,
    SqlitePoolOptions,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::shared::AppError;

const MEMORY_PATH: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        age INTEGER NOT NULL,
        gender TEXT NOT NULL,
        phone_number TEXT NOT NULL,
        dob TEXT NOT NULL,
        address TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS courses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        duration TEXT NOT NULL,
        credits INTEGER NOT NULL,
        price INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS enrollments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(id),
        course_id INTEGER NOT NULL REFERENCES courses(id),
        enrolled_at TEXT NOT NULL,
        UNIQUE (student_id, course_id)
    )",
];

/// Maps a sqlx failure to `AppError`, keeping constraint violations distinguishable
pub(crate) fn database_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if let Some(db_error) = e.as_database_error() {
            if db_error.is_unique_violation() {
                warn!(error = %e, context, "Unique constraint violated");
                return AppError::Conflict(format!("{}: duplicate record", context));
            }
            if db_error.is_foreign_key_violation() {
                warn!(error = %e, context, "Foreign key constraint violated");
                return AppError::NotFound(format!("{}: referenced record missing", context));
            }
        }
        warn!(error = %e, context, "Database operation failed");
        AppError::DatabaseError(e.to_string())
    }
}

/// SQLite-backed implementation of every repository
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and ensures the tables exist.
    /// `:memory:` gives a private in-memory database.
    #[instrument]
    pub async fn open(path: &str) -> Result<Self, AppError> {
        if path == MEMORY_PATH {
            return Self::in_memory().await;
        }

        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                warn!(error = %e, "Failed to create storage directory");
                AppError::Configuration(format!("cannot create storage directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(database_error("open database"))?;

        info!(path = %path, "SQLite storage opened");
        Self::from_pool(pool).await
    }

    /// Private in-memory database, kept on a single long-lived connection
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(database_error("open database"))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(database_error("open database"))?;

        debug!("In-memory SQLite storage opened");
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and ensures the tables exist
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, AppError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(database_error("create tables"))?;
        }

        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a transaction with `BEGIN IMMEDIATE`, so the write lock is taken
    /// (waiting up to the busy timeout) before anything is read
    pub(crate) async fn write_transaction(
        &self,
        context: &'static str,
    ) -> Result<WriteTransaction, AppError> {
        let mut conn = self.pool.acquire().await.map_err(database_error(context))?;
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(database_error(context))?;

        Ok(WriteTransaction {
            conn: Some(conn),
            context,
        })
    }
}

/// Connection holding an open `BEGIN IMMEDIATE` transaction.
///
/// Finish it with [`WriteTransaction::finish`]. If it is dropped unfinished
/// (a cancelled request), the connection is closed instead of going back to
/// the pool, and SQLite rolls the transaction back.
pub(crate) struct WriteTransaction {
    conn: Option<PoolConnection<Sqlite>>,
    context: &'static str,
}

impl WriteTransaction {
    pub(crate) fn connection(&mut self) -> Result<&mut SqliteConnection, AppError> {
        let context = self.context;
        self.conn.as_deref_mut().ok_or_else(|| {
            AppError::DatabaseError(format!("{}: transaction already finished", context))
        })
    }

    /// Commits on `Ok`, rolls back on `Err`, and hands `outcome` back
    pub(crate) async fn finish<T>(mut self, outcome: Result<T, AppError>) -> Result<T, AppError> {
        let Some(mut conn) = self.conn.take() else {
            return outcome;
        };

        let statement = if outcome.is_ok() { "COMMIT" } else { "ROLLBACK" };
        if let Err(e) = sqlx::query(statement).execute(&mut *conn).await {
            // The transaction may still be open on this connection
            drop(conn.detach());
            let error = database_error(self.context)(e);
            return match outcome {
                Ok(_) => Err(error),
                Err(original) => Err(original),
            };
        }

        outcome
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            warn!(
                context = self.context,
                "Write transaction dropped unfinished, closing its connection"
            );
            drop(conn.detach());
        }
    }
}
