//! Authentication for the rota service.
//!
//! Login issues an opaque bearer token backed by a server-side session
//! registry with a fixed time-to-live; logout revokes it. The registry is
//! explicit dependency-injected state: created at startup, mutated only by
//! login/logout, dropped with the process. Clients send the token as
//! `Authorization: Token <t>` (or `Bearer <t>`).

mod middleware;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};
use crate::users::{Role, User};

pub use middleware::{AuthLayer, AuthMiddleware};

/// Authentication context from a validated request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthContext {
    /// User ID (if authenticated).
    pub user_id: Option<String>,
    /// Login name (if authenticated).
    pub username: Option<String>,
    /// Role of the authenticated user.
    pub role: Option<Role>,
    /// Whether this is an anonymous/unauthenticated request.
    pub anonymous: bool,
}

impl AuthContext {
    /// Create an anonymous auth context.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            username: None,
            role: None,
            anonymous: true,
        }
    }

    /// Create an authenticated context for a user.
    pub fn authenticated(user_id: String, username: String, role: Role) -> Self {
        Self {
            user_id: Some(user_id),
            username: Some(username),
            role: Some(role),
            anonymous: false,
        }
    }

    /// Whether the user may manage lectures.
    pub fn can_manage_lectures(&self) -> bool {
        self.role.is_some_and(|r| r.can_manage_lectures())
    }

    /// Whether the user may manage accounts.
    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(|r| r.is_admin())
    }
}

/// A live session behind an issued token.
#[derive(Debug, Clone)]
pub struct Session {
    /// The bearer token.
    pub token: String,
    /// ID of the authenticated user.
    pub user_id: String,
    /// Login name of the authenticated user.
    pub username: String,
    /// Role captured at login time.
    pub role: Role,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

/// Server-side registry of issued session tokens.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    enabled: bool,
}

impl SessionRegistry {
    /// Create a registry whose sessions live for `ttl_secs` seconds.
    pub fn new(ttl_secs: u64, enabled: bool) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs as i64),
            enabled,
        }
    }

    /// Whether authentication is enforced.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Issue a fresh session token for a user.
    pub fn issue(&self, user: &User) -> Session {
        let now = Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions
            .write()
            .insert(session.token.clone(), session.clone());
        session
    }

    /// Authenticate a request from its `Authorization` header.
    ///
    /// Accepts `Token <t>` and `Bearer <t>` schemes. With authentication
    /// disabled, every request resolves to an anonymous context.
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<AuthContext> {
        if !self.enabled {
            return Ok(AuthContext::anonymous());
        }

        let header = auth_header.ok_or(AuthError::MissingCredentials)?;
        let token = parse_bearer(header)
            .ok_or_else(|| AuthError::InvalidToken("unsupported scheme".to_string()))?;
        self.validate(token)
    }

    /// Validate a raw token, dropping it if expired.
    pub fn validate(&self, token: &str) -> Result<AuthContext> {
        let expired = {
            let sessions = self.sessions.read();
            let Some(session) = sessions.get(token) else {
                return Err(AuthError::InvalidCredentials.into());
            };
            session.expires_at <= Utc::now()
        };

        if expired {
            self.sessions.write().remove(token);
            return Err(AuthError::SessionExpired.into());
        }

        let sessions = self.sessions.read();
        let session = sessions
            .get(token)
            .ok_or(AuthError::SessionExpired)?;
        Ok(AuthContext::authenticated(
            session.user_id.clone(),
            session.username.clone(),
            session.role,
        ))
    }

    /// Revoke a token. Returns whether it was live.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    /// Drop every expired session.
    pub fn purge_expired(&self) {
        let now = Utc::now();
        self.sessions.write().retain(|_, s| s.expires_at > now);
    }

    /// Number of live sessions (expired ones included until purged).
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no sessions are held.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

/// Extract the token from an `Authorization` header value.
pub fn parse_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Token ")
        .or_else(|| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
