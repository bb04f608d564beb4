//! SQLite backend

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::{NewStudent, Student, StorageError, StudentStore};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    age INTEGER NOT NULL
)";

/// Student store backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database file at `path`, creating it and the table if needed
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        info!("Opening SQLite database at {}", path.display());

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        Self::with_pool(pool).await
    }

    /// Open a private in-memory database
    ///
    /// Every pooled connection would get its own empty database, so the
    /// pool is pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self, StorageError> {
        debug!("Opening in-memory SQLite database");

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, ensuring the table exists
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl StudentStore for SqliteStore {
    async fn create_student(&self, payload: &NewStudent) -> Result<i64, StorageError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM students WHERE email = ?")
            .bind(&payload.email)
            .fetch_one(&self.pool)
            .await?;

        if existing > 0 {
            return Err(StorageError::DuplicateEmail(payload.email.clone()));
        }

        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(payload.age)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted student with ID {}", id);
        Ok(id)
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Student, StorageError> {
        sqlx::query_as::<_, Student>(
            "SELECT id, name, email, age FROM students WHERE id = ? LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::QueryError)?
        .ok_or(StorageError::NotFound(id))
    }

    async fn get_student_list(&self) -> Result<Vec<Student>, StorageError> {
        let students = sqlx::query_as::<_, Student>("SELECT id, name, email, age FROM students")
            .fetch_all(&self.pool)
            .await?;

        Ok(students)
    }

    async fn update_student(&self, payload: &NewStudent, id: i64) -> Result<u64, StorageError> {
        self.get_student_by_id(id).await?;

        let taken: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM students WHERE email = ? AND id != ?")
                .bind(&payload.email)
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if taken > 0 {
            return Err(StorageError::DuplicateEmail(payload.email.clone()));
        }

        let result = sqlx::query("UPDATE students SET name = ?, email = ?, age = ? WHERE id = ?")
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(payload.age)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Updated student {} ({} rows)", id, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn delete_student(&self, id: i64) -> Result<u64, StorageError> {
        self.get_student_by_id(id).await?;

        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::DeleteFailed(id));
        }

        debug!("Deleted student {}", id);
        Ok(result.rows_affected())
    }
}
