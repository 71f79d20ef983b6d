//! User accounts and role management.
//!
//! Three roles exist: students enroll in lectures, teachers own and manage
//! lectures, admins additionally manage user accounts. Passwords are kept
//! as SHA-256 digests; plaintext never leaves the create/verify call.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthError, Result, StorageError};
use crate::store::UserStore;

// ============================================================================
// Role
// ============================================================================

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can browse the schedule and enroll in lectures.
    #[default]
    Student,
    /// Can create and manage lectures.
    Teacher,
    /// Can manage lectures and user accounts.
    Admin,
}

impl Role {
    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Admin => "Admin",
        }
    }

    /// Whether this role may create, update, or delete lectures.
    pub fn can_manage_lectures(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }

    /// Whether this role may manage user accounts.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::Forbidden(format!("unknown role: {}", other))),
        }
    }
}

// ============================================================================
// User
// ============================================================================

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Login name, unique across the service.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Assigned role.
    pub role: Role,
    /// SHA-256 digest of the password. Never serialized to responses.
    #[serde(skip_serializing, default)]
    pub password_digest: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new account with a generated id and digested password.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        password: &str,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            email: email.into(),
            name: name.into(),
            role,
            password_digest: digest_password(password),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check a plaintext password against the stored digest.
    pub fn verify_password(&self, password: &str) -> bool {
        digest_password(password) == self.password_digest
    }
}

/// Digest a password with SHA-256, hex encoded.
pub fn digest_password(password: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Simple hex encoding (to avoid adding another dependency).
mod hex {
    pub fn encode(data: impl AsRef<[u8]>) -> String {
        data.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

// ============================================================================
// Create / Update
// ============================================================================

/// Fields for creating a user account.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateUser {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name; defaults to the username.
    #[serde(default)]
    pub name: Option<String>,
    /// Plaintext password, digested on creation.
    pub password: String,
    /// Assigned role.
    #[serde(default)]
    pub role: Role,
}

/// Partial update for a user account. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UserUpdate {
    /// New email address.
    #[serde(default)]
    pub email: Option<String>,
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New role.
    #[serde(default)]
    pub role: Option<Role>,
    /// New plaintext password, digested on apply.
    #[serde(default)]
    pub password: Option<String>,
}

impl UserUpdate {
    /// Apply this update to a user, refreshing its update timestamp.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(ref email) = self.email {
            user.email = email.clone();
        }
        if let Some(ref name) = self.name {
            user.name = name.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(ref password) = self.password {
            user.password_digest = digest_password(password);
        }
        user.updated_at = Utc::now();
    }
}

// ============================================================================
// User Manager
// ============================================================================

/// Manager for user accounts over a backing store.
pub struct UserManager<S: UserStore> {
    store: Arc<S>,
}

impl<S: UserStore> UserManager<S> {
    /// Create a new manager with the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a user account. Usernames must be unique.
    pub async fn create(&self, request: CreateUser) -> Result<User> {
        if self.store.find_by_username(&request.username).await?.is_some() {
            return Err(StorageError::DuplicateUsername(request.username).into());
        }

        let name = request.name.unwrap_or_else(|| request.username.clone());
        let user = User::new(
            request.username,
            request.email,
            name,
            &request.password,
            request.role,
        );
        self.store.insert(user.clone()).await?;
        debug!("Created user: {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Get a user by id.
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        self.store.get(id).await
    }

    /// Update an existing user.
    pub async fn update(&self, id: &str, update: UserUpdate) -> Result<Option<User>> {
        let Some(mut user) = self.store.get(id).await? else {
            return Ok(None);
        };
        update.apply_to(&mut user);
        self.store.replace(user.clone()).await?;
        debug!("Updated user: {} ({})", user.username, user.id);
        Ok(Some(user))
    }

    /// Delete a user by id.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.store.remove(id).await?;
        if removed {
            debug!("Deleted user: {}", id);
        }
        Ok(removed)
    }

    /// List all users, ordered by username.
    pub async fn list(&self) -> Result<Vec<User>> {
        let mut users = self.store.list().await?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    /// Whether any account exists.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.store.list().await?.is_empty())
    }

    /// Verify login credentials, returning the account on success.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !user.verify_password(password) {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(user)
    }
}

// ============================================================================
// Tests
// ============================================================================
