//! Access guard
//!
//! One composable interceptor gates every protected admin route. Each
//! route group names the capability it requires at router-assembly
//! time; there is no per-view flag and no implicit default.
//!
//! Failure semantics: an unauthenticated caller is redirected to the
//! login screen before any entity access occurs; an authenticated
//! caller that fails the capability predicate gets a fatal 403.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use arkiv_core::traits::{Id, Principal};
use arkiv_db::{StoreResult, UserRow, UserStore};

use crate::session::{extract_session_id, CookieConfig, SessionStore};

/// The authenticated account attached to a request that passed the guard
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Id,
    pub username: String,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl From<&UserRow> for CurrentUser {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username.clone(),
            is_superuser: row.is_superuser,
            is_active: row.is_active,
        }
    }
}

impl Principal for CurrentUser {
    fn id(&self) -> Id {
        self.id
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Capability predicate checked by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any authenticated, active account
    Authenticated,
    /// Superuser privilege required
    Superuser,
}

impl Capability {
    pub fn allows(&self, user: &dyn Principal) -> bool {
        match self {
            Capability::Authenticated => true,
            Capability::Superuser => user.is_superuser(),
        }
    }
}

/// Shared guard dependencies: how a request is mapped to an account
#[derive(Clone)]
pub struct GuardState {
    pub sessions: Arc<dyn SessionStore>,
    pub users: Arc<dyn UserStore>,
    pub cookie: CookieConfig,
    /// Where unauthenticated callers are sent
    pub login_path: String,
}

impl GuardState {
    /// Resolve the requesting account from the session cookie.
    ///
    /// Returns `None` for missing/expired sessions, unknown users, and
    /// deactivated accounts; all of those follow the login-redirect path.
    pub async fn resolve_user(&self, headers: &HeaderMap) -> StoreResult<Option<CurrentUser>> {
        let cookie_header = match headers.get("cookie").and_then(|v| v.to_str().ok()) {
            Some(h) => h,
            None => return Ok(None),
        };

        let session_id = match extract_session_id(cookie_header, &self.cookie.name) {
            Some(id) => id,
            None => return Ok(None),
        };

        let user_id = match self.sessions.get(&session_id).and_then(|s| s.user_id) {
            Some(id) => id,
            None => return Ok(None),
        };

        let user = self.users.find_by_id(user_id).await?;
        Ok(user.as_ref().filter(|u| u.is_active).map(CurrentUser::from))
    }
}

/// A guard bound to the capability one route group requires
#[derive(Clone)]
pub struct AccessRequirement {
    pub capability: Capability,
    pub guard: GuardState,
}

impl AccessRequirement {
    pub fn new(capability: Capability, guard: GuardState) -> Self {
        Self { capability, guard }
    }
}

/// Middleware entry point, wired with `middleware::from_fn_with_state`
pub async fn access_guard(
    State(requirement): State<AccessRequirement>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match requirement.guard.resolve_user(request.headers()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve requesting user");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let user = match user {
        Some(user) => user,
        None => {
            let target = format!(
                "{}?next={}",
                requirement.guard.login_path,
                request.uri().path()
            );
            return Redirect::to(&target).into_response();
        }
    };

    if !requirement.capability.allows(&user) {
        tracing::warn!(
            user = %user.username,
            path = %request.uri().path(),
            "Denied access to protected view"
        );
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, Session};
    use async_trait::async_trait;
    use mockall::mock;

    use arkiv_core::pagination::{PageParams, Paginated};
    use arkiv_db::{CreateUserDto, UpdateUserDto};

    mock! {
        Users {}

        #[async_trait]
        impl UserStore for Users {
            async fn list(&self, page: PageParams) -> StoreResult<Paginated<UserRow>>;
            async fn find_by_id(&self, id: Id) -> StoreResult<Option<UserRow>>;
            async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRow>>;
            async fn create(&self, dto: CreateUserDto) -> StoreResult<UserRow>;
            async fn update(&self, id: Id, dto: UpdateUserDto) -> StoreResult<UserRow>;
            async fn delete_many(&self, ids: &[Id]) -> StoreResult<u64>;
        }
    }

    fn user_row(id: Id, username: &str, is_superuser: bool, is_active: bool) -> UserRow {
        let now = chrono::Utc::now();
        UserRow {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: String::new(),
            is_superuser,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn guard_state(users: MockUsers, sessions: Arc<MemorySessionStore>) -> GuardState {
        GuardState {
            sessions,
            users: Arc::new(users),
            cookie: CookieConfig::development(),
            login_path: "/admin/login".to_string(),
        }
    }

    fn headers_with_session(session_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            format!("arkiv_session={}", session_id).parse().unwrap(),
        );
        headers
    }

    #[test]
    fn test_superuser_capability() {
        let admin = CurrentUser {
            id: 1,
            username: "root".into(),
            is_superuser: true,
            is_active: true,
        };
        let plain = CurrentUser {
            id: 2,
            username: "bob".into(),
            is_superuser: false,
            is_active: true,
        };

        assert!(Capability::Superuser.allows(&admin));
        assert!(!Capability::Superuser.allows(&plain));
        assert!(Capability::Authenticated.allows(&plain));
    }

    #[tokio::test]
    async fn test_resolve_user_from_session() {
        let sessions = Arc::new(MemorySessionStore::new());
        let session = Session::authenticated(5, 3600);
        let session_id = session.id.clone();
        sessions.set(session).unwrap();

        let mut users = MockUsers::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_row(id, "root", true, true))));

        let state = guard_state(users, sessions);
        let resolved = state
            .resolve_user(&headers_with_session(&session_id))
            .await
            .unwrap()
            .expect("user should resolve");

        assert_eq!(resolved.id, 5);
        assert!(resolved.is_superuser);
    }

    #[tokio::test]
    async fn test_resolve_user_no_cookie() {
        let mut users = MockUsers::new();
        users.expect_find_by_id().never();

        let state = guard_state(users, Arc::new(MemorySessionStore::new()));
        let resolved = state.resolve_user(&HeaderMap::new()).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_resolve_user_unknown_session() {
        let mut users = MockUsers::new();
        users.expect_find_by_id().never();

        let state = guard_state(users, Arc::new(MemorySessionStore::new()));
        let resolved = state
            .resolve_user(&headers_with_session("bogus"))
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_deactivated_account_does_not_resolve() {
        let sessions = Arc::new(MemorySessionStore::new());
        let session = Session::authenticated(9, 3600);
        let session_id = session.id.clone();
        sessions.set(session).unwrap();

        let mut users = MockUsers::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_row(id, "ghost", false, false))));

        let state = guard_state(users, sessions);
        let resolved = state
            .resolve_user(&headers_with_session(&session_id))
            .await
            .unwrap();
        assert!(resolved.is_none());
    }
}
