//! Shared test fixtures: in-memory stores and app assembly

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::Router;

use arkiv_admin::{routes, AdminState, ContextRenderer};
use arkiv_auth::{hash_password, CookieConfig, GuardState, MemorySessionStore, Session, SessionStore};
use arkiv_core::config::AppConfig;
use arkiv_core::pagination::{PageParams, Paginated};
use arkiv_core::traits::Id;
use arkiv_db::{
    CreateGroupDto, CreateUserDto, GroupRow, GroupStore, StoreError, StoreResult, UpdateGroupDto,
    UpdateUserDto, UserRow, UserStore,
};

fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

fn paginate<T: Clone>(mut items: Vec<T>, page: PageParams) -> Paginated<T> {
    let total = items.len() as i64;
    let offset = page.offset().min(total) as usize;
    let items: Vec<T> = items
        .drain(..)
        .skip(offset)
        .take(page.limit() as usize)
        .collect();
    Paginated::new(items, total, page)
}

/// In-memory user store; `list_calls` lets tests assert the guard
/// short-circuits before any entity access
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<UserRow>>,
    next_id: AtomicI64,
    pub list_calls: AtomicUsize,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, username: &str, password: &str, is_superuser: bool) -> UserRow {
        let row = UserRow {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: hash_password(password).unwrap(),
            is_superuser,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        };
        self.users.write().unwrap().push(row.clone());
        row
    }

    pub fn get(&self, id: Id) -> Option<UserRow> {
        self.users.read().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn by_username(&self, username: &str) -> Option<UserRow> {
        self.users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .users
            .read()
            .unwrap()
            .iter()
            .map(|u| u.username.clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self, page: PageParams) -> StoreResult<Paginated<UserRow>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.read().unwrap().clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paginate(users, page))
    }

    async fn find_by_id(&self, id: Id) -> StoreResult<Option<UserRow>> {
        Ok(self.get(id))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, dto: CreateUserDto) -> StoreResult<UserRow> {
        let mut users = self.users.write().unwrap();
        if users.iter().any(|u| u.username == dto.username) {
            return Err(StoreError::Conflict { field: "username" });
        }
        let row = UserRow {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: dto.username,
            email: dto.email,
            password_hash: dto.password_hash,
            is_superuser: dto.is_superuser,
            is_active: dto.is_active,
            created_at: now(),
            updated_at: now(),
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateUserDto) -> StoreResult<UserRow> {
        let mut users = self.users.write().unwrap();
        if let Some(new_name) = &dto.username {
            if users.iter().any(|u| u.id != id && &u.username == new_name) {
                return Err(StoreError::Conflict { field: "username" });
            }
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("User with id {} not found", id)))?;

        if let Some(v) = dto.username {
            user.username = v;
        }
        if let Some(v) = dto.email {
            user.email = v;
        }
        if let Some(v) = dto.password_hash {
            user.password_hash = v;
        }
        if let Some(v) = dto.is_superuser {
            user.is_superuser = v;
        }
        if let Some(v) = dto.is_active {
            user.is_active = v;
        }
        user.updated_at = now();
        Ok(user.clone())
    }

    async fn delete_many(&self, ids: &[Id]) -> StoreResult<u64> {
        let mut users = self.users.write().unwrap();
        let before = users.len();
        users.retain(|u| !ids.contains(&u.id));
        Ok((before - users.len()) as u64)
    }
}

/// In-memory group store
#[derive(Default)]
pub struct MemoryGroupStore {
    groups: RwLock<Vec<GroupRow>>,
    members: RwLock<HashMap<Id, HashSet<Id>>>,
    next_id: AtomicI64,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(Vec::new()),
            members: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn insert(&self, name: &str) -> GroupRow {
        let row = GroupRow {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            created_at: now(),
            updated_at: now(),
        };
        self.groups.write().unwrap().push(row.clone());
        row
    }

    pub fn set_members(&self, group_id: Id, user_ids: &[Id]) {
        self.members
            .write()
            .unwrap()
            .insert(group_id, user_ids.iter().copied().collect());
    }

    pub fn members_of(&self, group_id: Id) -> Vec<Id> {
        let mut ids: Vec<Id> = self
            .members
            .read()
            .unwrap()
            .get(&group_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .read()
            .unwrap()
            .iter()
            .map(|g| g.name.clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn list(&self, page: PageParams) -> StoreResult<Paginated<GroupRow>> {
        let mut groups = self.groups.read().unwrap().clone();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(groups, page))
    }

    async fn find_by_id(&self, id: Id) -> StoreResult<Option<GroupRow>> {
        Ok(self.groups.read().unwrap().iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<GroupRow>> {
        Ok(self
            .groups
            .read()
            .unwrap()
            .iter()
            .find(|g| g.name == name)
            .cloned())
    }

    async fn create(&self, dto: CreateGroupDto) -> StoreResult<GroupRow> {
        let mut groups = self.groups.write().unwrap();
        if groups.iter().any(|g| g.name == dto.name) {
            return Err(StoreError::Conflict { field: "name" });
        }
        let row = GroupRow {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: dto.name,
            created_at: now(),
            updated_at: now(),
        };
        groups.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateGroupDto) -> StoreResult<GroupRow> {
        let mut groups = self.groups.write().unwrap();
        if let Some(new_name) = &dto.name {
            if groups.iter().any(|g| g.id != id && &g.name == new_name) {
                return Err(StoreError::Conflict { field: "name" });
            }
        }
        let group = groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Group with id {} not found", id)))?;

        if let Some(v) = dto.name {
            group.name = v;
        }
        group.updated_at = now();
        Ok(group.clone())
    }

    async fn delete_many(&self, ids: &[Id]) -> StoreResult<u64> {
        let mut groups = self.groups.write().unwrap();
        let before = groups.len();
        groups.retain(|g| !ids.contains(&g.id));
        Ok((before - groups.len()) as u64)
    }

    async fn member_ids(&self, group_id: Id) -> StoreResult<Vec<Id>> {
        let mut ids: Vec<Id> = self
            .members
            .read()
            .unwrap()
            .get(&group_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    async fn add_member(&self, group_id: Id, user_id: Id) -> StoreResult<()> {
        self.members
            .write()
            .unwrap()
            .entry(group_id)
            .or_default()
            .insert(user_id);
        Ok(())
    }

    async fn remove_member(&self, group_id: Id, user_id: Id) -> StoreResult<()> {
        if let Some(set) = self.members.write().unwrap().get_mut(&group_id) {
            set.remove(&user_id);
        }
        Ok(())
    }
}

/// The assembled test application and its backing fixtures
pub struct TestApp {
    pub app: Router,
    pub users: Arc<MemoryUserStore>,
    pub groups: Arc<MemoryGroupStore>,
    pub sessions: Arc<MemorySessionStore>,
}

pub fn test_app() -> TestApp {
    let users = Arc::new(MemoryUserStore::new());
    let groups = Arc::new(MemoryGroupStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let cookie = CookieConfig::development();
    let config = AppConfig::default();

    let state = AdminState {
        users: users.clone(),
        groups: groups.clone(),
        sessions: sessions.clone(),
        renderer: Arc::new(ContextRenderer),
        cookie: cookie.clone(),
        auth: config.auth,
    };

    let guard = GuardState {
        sessions: sessions.clone(),
        users: users.clone(),
        cookie,
        login_path: routes::reverse::login(),
    };

    TestApp {
        app: routes::router(state, guard),
        users,
        groups,
        sessions,
    }
}

impl TestApp {
    /// Open a session for the user and return the Cookie header value
    pub fn login(&self, user_id: Id) -> String {
        let session = Session::authenticated(user_id, 3600);
        let cookie = format!("arkiv_session={}", session.id);
        self.sessions.set(session).unwrap();
        cookie
    }
}
