//! Repository implementations for user records
//!
//! `UserRepository` is the storage boundary the HTTP layer talks to:
//! - `PgUserRepo` issues parameterized SQL against PostgreSQL
//! - `MemoryUserRepo` keeps rows in process (tests, `serve --in-memory`)

pub mod memory;
pub mod users;

pub use memory::MemoryUserRepo;
pub use users::{DbError, PgUserRepo, UserRepository};
