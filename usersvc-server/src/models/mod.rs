//! Domain models
//!
//! Identifiers are validated when parsed from request input.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod user;

pub use validation::ValidationError;
pub use user::{FieldChange, NewUser, User, UserField, UserId, UserPatch};
