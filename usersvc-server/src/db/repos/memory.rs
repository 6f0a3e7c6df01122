//! In-process user repository
//!
//! Same contract as `PgUserRepo`, backed by a `BTreeMap` so `list()` keeps
//! insertion (identifier) order. Identifiers are never reused.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{DbError, UserRepository};
use crate::models::{NewUser, User, UserId, UserPatch};

#[derive(Default)]
struct Rows {
    last_id: i64,
    users: BTreeMap<UserId, User>,
}

impl Rows {
    fn insert(&mut self, new: NewUser) -> User {
        self.last_id += 1;
        let user = User {
            id: UserId::assigned(self.last_id),
            username: new.username,
            email: new.email,
            fullname: new.fullname,
            message: new.message,
        };
        self.users.insert(user.id, user.clone());
        user
    }
}

/// Memory-backed user repository
#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<Rows>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepo {
    async fn create(&self, new: NewUser) -> Result<User, DbError> {
        let user = self.rows.lock().await.insert(new);
        tracing::debug!(user_id = %user.id, "new user created");
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<User, DbError> {
        self.rows
            .lock()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::NotFound {
                resource: "user",
                id: id.to_string(),
            })
    }

    async fn list(&self) -> Result<Vec<User>, DbError> {
        Ok(self.rows.lock().await.users.values().cloned().collect())
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, DbError> {
        let mut rows = self.rows.lock().await;
        let user = rows.users.get_mut(&id).ok_or_else(|| DbError::NotFound {
            resource: "user",
            id: id.to_string(),
        })?;

        let changes = patch.changes(user);
        user.apply(&changes);
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<u64, DbError> {
        let removed = self.rows.lock().await.users.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn seed_if_empty(&self, seed: NewUser) -> Result<Option<User>, DbError> {
        let mut rows = self.rows.lock().await;
        if !rows.users.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.insert(seed)))
    }
}
