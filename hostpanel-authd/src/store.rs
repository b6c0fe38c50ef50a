//! Persistent credential storage with SQLite.
//!
//! Username uniqueness is enforced by the UNIQUE constraint on the table,
//! not an application-level existence probe: the constraint-violation error
//! from the insert is the authoritative `AlreadyExists` signal, so two
//! concurrent registrations for the same name cannot both succeed.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// A stored credential record. The password hash never leaves this type's
/// consumers; it is compared, never returned to clients or logged.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

/// Errors that can occur during credential store operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("empty fields not allowed")]
    EmptyField,
    #[error("username already taken")]
    AlreadyExists,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Credential store backed by a SQLite pool.
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    /// Create a new store, creating the table if it does not exist.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Create a credential record.
    ///
    /// # Errors
    /// - [`StoreError::EmptyField`] if any field is empty
    /// - [`StoreError::AlreadyExists`] if the username is taken; this comes
    ///   from the UNIQUE constraint, so it holds under concurrent inserts
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError> {
        if username.is_empty() || email.is_empty() || password_hash.is_empty() {
            return Err(StoreError::EmptyField);
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: current_timestamp(),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a record by username (the login path).
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(record_from_row))
    }

    /// Look up a record by id (the authenticated-profile path).
    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(record_from_row))
    }

    /// Number of records holding `username`. At most 1 by construction.
    pub async fn count_by_username(&self, username: &str) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

fn record_from_row(row: sqlx::sqlite::SqliteRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
