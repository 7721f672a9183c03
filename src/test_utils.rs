//! In-memory stand-ins used by unit and integration tests.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{
    password::hash_password,
    repo::{StoreError, UserStore},
    repo_types::{Role, User},
};

/// A `UserStore` backed by a map, keyed by id.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
    failing: AtomicBool,
}

impl MemoryUserStore {
    /// Insert a user with a freshly hashed password.
    pub fn insert(&self, email: &str, password: &str, role: Role, is_active: bool) -> User {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: hash_password(password).expect("hash test password"),
            role,
            is_active,
            created_at: now,
            updated_at: now,
            last_login: None,
        };
        self.users
            .lock()
            .unwrap()
            .insert(user.id, user.clone());
        user
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    /// Make every subsequent call fail like an unreachable database.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Query(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.check()?;
        Ok(self.get(id))
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), StoreError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&id) {
            let now = OffsetDateTime::now_utc();
            user.last_login = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }
}
