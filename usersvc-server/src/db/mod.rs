//! Database layer - connection pool, schema bootstrap and repositories
//!
//! - Connection pool (max 5 connections by default)
//! - Table is created on startup if missing, seeded once when empty
//! - All statements are parameterized

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use schema::{bootstrap, ensure_schema, initial_user};
