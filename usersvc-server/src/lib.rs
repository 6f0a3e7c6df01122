//! usersvc-server: CRUD HTTP service over a single users table
//!
//! - [`db`]: PostgreSQL pool, table bootstrap, [`UserRepository`] implementations
//! - [`http`]: axum router, handlers, JSON error mapping
//! - [`models`]: the user record and the partial-update diff

pub mod db;
pub mod http;
pub mod models;

pub use db::{DbError, MemoryUserRepo, PgUserRepo, UserRepository};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
pub use models::{NewUser, User, UserId, UserPatch};
