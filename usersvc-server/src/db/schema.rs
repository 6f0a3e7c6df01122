//! Table bootstrap for the users table

use sqlx::PgPool;

use super::repos::{DbError, PgUserRepo, UserRepository};
use crate::models::NewUser;

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT NOT NULL,
        fullname TEXT NOT NULL,
        message TEXT NOT NULL
    )
"#;

/// Create the users table if it doesn't exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;
    tracing::info!("users table created/verified");
    Ok(())
}

/// The row inserted into an empty table on first start.
pub fn initial_user() -> NewUser {
    NewUser {
        username: "Admin User".to_owned(),
        email: "admin@email.com".to_owned(),
        fullname: "John Harris".to_owned(),
        message: "This is the initial user on the system.".to_owned(),
    }
}

/// Ensure the table exists and, when `seed` is set, insert [`initial_user`]
/// into an empty table.
///
/// Table creation failures are fatal. A failed seed is only logged.
pub async fn bootstrap(pool: &PgPool, seed: bool) -> Result<(), DbError> {
    ensure_schema(pool).await?;

    if !seed {
        return Ok(());
    }

    match PgUserRepo::new(pool.clone()).seed_if_empty(initial_user()).await {
        Ok(Some(user)) => tracing::info!(user_id = %user.id, "seeded initial user"),
        Ok(None) => tracing::debug!("users table not empty, skipping seed"),
        Err(e) => tracing::warn!("Error setting up initial user: {}", e),
    }

    Ok(())
}
