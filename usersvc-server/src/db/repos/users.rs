//! User repository
//!
//! - create: INSERT ... RETURNING id, then re-read
//! - update: diff against the stored row, SET only changed columns
//! - seed_if_empty: INSERT ... WHERE NOT EXISTS inside a transaction holding
//!   an advisory lock, so concurrent starters insert at most one row

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{FieldChange, NewUser, User, UserId, UserPatch};

const SELECT_USER: &str = "SELECT id, username, email, fullname, message FROM users";

/// `pg_advisory_xact_lock` key serializing seed attempts across instances
const SEED_LOCK_KEY: i64 = 0x7573_6572_7365_6564;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[source] sqlx::Error),

    #[error("{resource} with ID {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("constraint violated: {0}")]
    Constraint(String),
}

impl DbError {
    fn user_not_found(id: UserId) -> Self {
        Self::NotFound {
            resource: "user",
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return Self::Constraint(db_err.message().to_owned());
                }
                _ => {}
            }
        }
        Self::Sqlx(err)
    }
}

/// Storage boundary for user records
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a row and return it as stored.
    async fn create(&self, new: NewUser) -> Result<User, DbError>;

    /// Fetch one row; `DbError::NotFound` if absent.
    async fn get(&self, id: UserId) -> Result<User, DbError>;

    /// All rows in insertion order.
    async fn list(&self) -> Result<Vec<User>, DbError>;

    /// Overwrite the columns that differ from non-empty `patch` values.
    ///
    /// With nothing to change the stored row is returned untouched.
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, DbError>;

    /// Remove one row. Returns rows affected; zero is not an error.
    async fn delete(&self, id: UserId) -> Result<u64, DbError>;

    /// Insert `seed` only if there are no rows yet.
    async fn seed_if_empty(&self, seed: NewUser) -> Result<Option<User>, DbError>;

    /// Delete every row, one identifier at a time.
    async fn delete_all(&self) -> Result<u64, DbError> {
        let mut deleted = 0;
        for user in self.list().await? {
            deleted += self.delete(user.id).await?;
            tracing::debug!(user_id = %user.id, "deleted user");
        }
        tracing::info!(deleted, "deleted all users");
        Ok(deleted)
    }
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build `UPDATE users SET col = $n, ... WHERE id = $m` for the given changes.
fn update_statement<'a>(id: UserId, changes: &[FieldChange<'a>]) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new("UPDATE users SET ");
    let mut set = query.separated(", ");
    for change in changes {
        set.push(change.field.column());
        set.push_unseparated(" = ");
        set.push_bind_unseparated(change.value);
    }
    query.push(" WHERE id = ");
    query.push_bind(id);
    query
}

#[async_trait]
impl UserRepository for PgUserRepo {
    async fn create(&self, new: NewUser) -> Result<User, DbError> {
        let id: UserId = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, fullname, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.fullname)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %id, "new user created");
        self.get(id).await
    }

    async fn get(&self, id: UserId) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::user_not_found(id))
    }

    async fn list(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, DbError> {
        let current = self.get(id).await?;
        let changes = patch.changes(&current);
        if changes.is_empty() {
            tracing::debug!(user_id = %id, "update has no changes");
            return Ok(current);
        }

        update_statement(id, &changes)
            .build()
            .execute(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(user_id = %id, "Error executing update: {}", e))?;

        tracing::debug!(user_id = %id, changed = changes.len(), "user updated");
        self.get(id).await
    }

    async fn delete(&self, id: UserId) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(user_id = %id, rows_affected = result.rows_affected(), "delete user");
        Ok(result.rows_affected())
    }

    async fn seed_if_empty(&self, seed: NewUser) -> Result<Option<User>, DbError> {
        let mut tx = self.pool.begin().await?;

        // Released on commit/rollback. The INSERT below runs after the lock is
        // granted, so its snapshot sees rows committed by an earlier holder.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, fullname, message)
            SELECT $1::text, $2::text, $3::text, $4::text
            WHERE NOT EXISTS (SELECT 1 FROM users)
            RETURNING id, username, email, fullname, message
            "#,
        )
        .bind(&seed.username)
        .bind(&seed.email)
        .bind(&seed.fullname)
        .bind(&seed.message)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }
}
