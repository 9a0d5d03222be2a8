//! # arkiv-auth
//!
//! Authentication and authorization for the Arkiv admin panel:
//!
//! - Session-cookie authentication with a pluggable session store
//! - Argon2 password hashing
//! - The access guard: a single composable middleware taking a
//!   capability predicate, applied per route group

pub mod guard;
pub mod password;
pub mod session;

pub use guard::{access_guard, AccessRequirement, Capability, CurrentUser, GuardState};
pub use password::{hash_password, verify_password, PasswordError};
pub use session::{
    extract_session_id, CookieConfig, MemorySessionStore, SameSite, Session, SessionError,
    SessionStore,
};
