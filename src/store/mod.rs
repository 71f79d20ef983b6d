//! Storage traits and in-memory backends.
//!
//! Nothing is persisted: the service keeps lectures and users in process
//! memory behind small store traits so managers stay backend-agnostic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, StorageError};
use crate::schedule::Lecture;
use crate::users::User;

// ============================================================================
// Lecture Store
// ============================================================================

/// Backing store for lectures.
#[async_trait]
pub trait LectureStore: Send + Sync {
    /// Insert a new lecture. Fails on id collision.
    async fn insert(&self, lecture: Lecture) -> Result<()>;

    /// Get a lecture by id.
    async fn get(&self, id: &str) -> Result<Option<Lecture>>;

    /// Replace an existing lecture. Fails if the id is unknown.
    async fn replace(&self, lecture: Lecture) -> Result<()>;

    /// Remove a lecture by id. Returns whether it existed.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// List all lectures.
    async fn list(&self) -> Result<Vec<Lecture>>;
}

/// In-memory lecture store.
#[derive(Default)]
pub struct MemoryLectureStore {
    lectures: RwLock<HashMap<String, Lecture>>,
}

impl MemoryLectureStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LectureStore for MemoryLectureStore {
    async fn insert(&self, lecture: Lecture) -> Result<()> {
        let mut lectures = self.lectures.write().await;
        if lectures.contains_key(&lecture.id) {
            return Err(StorageError::DuplicateId(lecture.id).into());
        }
        lectures.insert(lecture.id.clone(), lecture);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Lecture>> {
        Ok(self.lectures.read().await.get(id).cloned())
    }

    async fn replace(&self, lecture: Lecture) -> Result<()> {
        let mut lectures = self.lectures.write().await;
        if !lectures.contains_key(&lecture.id) {
            return Err(StorageError::LectureNotFound(lecture.id).into());
        }
        lectures.insert(lecture.id.clone(), lecture);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.lectures.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<Lecture>> {
        Ok(self.lectures.read().await.values().cloned().collect())
    }
}

// ============================================================================
// User Store
// ============================================================================

/// Backing store for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails on id or username collision.
    async fn insert(&self, user: User) -> Result<()>;

    /// Get a user by id.
    async fn get(&self, id: &str) -> Result<Option<User>>;

    /// Look a user up by login name.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Replace an existing user. Fails if the id is unknown.
    async fn replace(&self, user: User) -> Result<()>;

    /// Remove a user by id. Returns whether it existed.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// List all users.
    async fn list(&self) -> Result<Vec<User>>;
}

/// In-memory user store.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StorageError::DuplicateId(user.id).into());
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StorageError::DuplicateUsername(user.username).into());
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn replace(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StorageError::UserNotFound(user.id).into());
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.users.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
