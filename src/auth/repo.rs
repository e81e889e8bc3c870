use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use time::OffsetDateTime;

use crate::auth::repo_types::User;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
}

#[derive(Default)]
struct Inner {
    by_email: HashMap<String, Arc<User>>,
    by_id: HashMap<u64, Arc<User>>,
    last_id: u64,
}

/// In-memory user store keyed by email and by id.
///
/// Both maps and the id counter sit behind one `RwLock`: lookups share the
/// read side, registration takes the write side, so a reader never sees a
/// user in one map but not the other.
#[derive(Default)]
pub struct UserDirectory {
    inner: RwLock<Inner>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a user with the next sequential id.
    pub fn create(&self, email: &str, password_hash: &str) -> Result<Arc<User>, DirectoryError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if inner.by_email.contains_key(email) {
            return Err(DirectoryError::UserExists);
        }

        let user = Arc::new(User {
            id: inner.last_id + 1,
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        });
        inner.last_id = user.id;
        inner.by_email.insert(user.email.clone(), Arc::clone(&user));
        inner.by_id.insert(user.id, Arc::clone(&user));

        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Arc<User>, DirectoryError> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_email
            .get(email)
            .cloned()
            .ok_or(DirectoryError::UserNotFound)
    }

    pub fn find_by_id(&self, id: u64) -> Result<Arc<User>, DirectoryError> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::UserNotFound)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).by_id.len()
    }
}
