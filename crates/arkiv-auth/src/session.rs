//! Session authentication
//!
//! Sessions identify the logged-in admin across requests via an opaque
//! cookie. The store is a trait so the backend can be swapped (the
//! in-memory store ships here; a database-backed store would implement
//! the same trait).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use arkiv_core::traits::Id;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,
    #[error("Session expired")]
    Expired,
    #[error("Session store unavailable")]
    Unavailable,
}

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session ID, the cookie value
    pub id: String,
    /// Authenticated user, if any
    pub user_id: Option<Id>,
    /// Arbitrary session data
    pub data: HashMap<String, String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    /// Create an authenticated session
    pub fn authenticated(user_id: Id, lifetime_seconds: i64) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: generate_session_id(),
            user_id: Some(user_id),
            data: HashMap::new(),
            created_at: now,
            expires_at: now + chrono::Duration::seconds(lifetime_seconds),
        }
    }

    pub fn is_valid(&self) -> bool {
        chrono::Utc::now() < self.expires_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Generate a secure random session ID
fn generate_session_id() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const SESSION_ID_LENGTH: usize = 64;

    let mut rng = rand::thread_rng();
    (0..SESSION_ID_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Session store trait for different backends
pub trait SessionStore: Send + Sync {
    /// Get a session by ID; expired sessions are not returned
    fn get(&self, session_id: &str) -> Option<Session>;

    /// Store a session
    fn set(&self, session: Session) -> Result<(), SessionError>;

    /// Delete a session
    fn delete(&self, session_id: &str) -> Result<(), SessionError>;

    /// Delete all sessions for a user
    fn delete_user_sessions(&self, user_id: Id) -> Result<usize, SessionError>;

    /// Clean up expired sessions, returning how many were removed
    fn cleanup_expired(&self) -> Result<usize, SessionError>;
}

/// In-memory session store
pub struct MemorySessionStore {
    sessions: std::sync::RwLock<HashMap<String, Session>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::RwLock::new(HashMap::new()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session_id: &str) -> Option<Session> {
        let sessions = self.sessions.read().ok()?;
        sessions.get(session_id).cloned().filter(|s| s.is_valid())
    }

    fn set(&self, session: Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        // Expired entries are filtered on read but would otherwise stay
        // in the map forever; purge them whenever a session is stored.
        let now = chrono::Utc::now();
        sessions.retain(|_, s| s.expires_at >= now);
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        sessions.remove(session_id);
        Ok(())
    }

    fn delete_user_sessions(&self, user_id: Id) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        let to_remove: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.user_id == Some(user_id))
            .map(|(k, _)| k.clone())
            .collect();

        let count = to_remove.len();
        for key in to_remove {
            sessions.remove(&key);
        }

        Ok(count)
    }

    fn cleanup_expired(&self) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        let now = chrono::Utc::now();
        let to_remove: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.expires_at < now)
            .map(|(k, _)| k.clone())
            .collect();

        let count = to_remove.len();
        for key in to_remove {
            sessions.remove(&key);
        }

        Ok(count)
    }
}

/// Cookie configuration for sessions
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub max_age: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "arkiv_session".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            max_age: None,
        }
    }
}

impl CookieConfig {
    /// Create a development configuration (non-secure)
    pub fn development() -> Self {
        Self {
            secure: false,
            ..Default::default()
        }
    }

    /// Build a Set-Cookie header value for the session
    pub fn build_cookie(&self, session_id: &str) -> String {
        let mut parts = vec![format!("{}={}", self.name, session_id)];

        parts.push(format!("Path={}", self.path));

        if self.secure {
            parts.push("Secure".to_string());
        }

        if self.http_only {
            parts.push("HttpOnly".to_string());
        }

        match self.same_site {
            SameSite::Strict => parts.push("SameSite=Strict".to_string()),
            SameSite::Lax => parts.push("SameSite=Lax".to_string()),
            SameSite::None => parts.push("SameSite=None".to_string()),
        }

        if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={}", max_age));
        }

        parts.join("; ")
    }

    /// Build a Set-Cookie header value that clears the session
    pub fn build_clear_cookie(&self) -> String {
        format!("{}=; Path={}; Max-Age=0; HttpOnly", self.name, self.path)
    }
}

/// Extract the session ID from a Cookie header
pub fn extract_session_id(cookie_header: &str, cookie_name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((name, value)) = part.split_once('=') {
            if name.trim() == cookie_name {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}
