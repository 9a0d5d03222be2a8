//! Admin routes
//!
//! Named-route reversal lives in [`reverse`]; handlers and templates
//! never hardcode paths. Router assembly names the capability each
//! route group requires — the guard has no implicit default.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use arkiv_auth::{access_guard, AccessRequirement, Capability, GuardState};

use crate::handlers::{groups, login, users};
use crate::state::AdminState;

/// Reverse URL lookup by route name
pub mod reverse {
    use arkiv_core::traits::Id;

    pub fn groups() -> String {
        "/admin/groups".to_string()
    }

    pub fn group_add() -> String {
        "/admin/groups/add".to_string()
    }

    pub fn group_update(id: Id) -> String {
        format!("/admin/groups/{}", id)
    }

    pub fn group_delete() -> String {
        "/admin/groups/delete".to_string()
    }

    pub fn users() -> String {
        "/admin/users".to_string()
    }

    pub fn user_add() -> String {
        "/admin/users/add".to_string()
    }

    pub fn user_update(id: Id) -> String {
        format!("/admin/users/{}", id)
    }

    pub fn user_delete() -> String {
        "/admin/users/delete".to_string()
    }

    pub fn login() -> String {
        "/admin/login".to_string()
    }

    pub fn logout() -> String {
        "/admin/logout".to_string()
    }
}

/// Build the admin router. The six CRUD screens sit behind the
/// superuser capability; login/logout are reachable unauthenticated.
pub fn router(state: AdminState, guard: GuardState) -> Router {
    let protected = Router::new()
        .route("/groups", get(groups::list))
        .route("/groups/add", get(groups::new_form).post(groups::create))
        .route("/groups/delete", post(groups::bulk_delete))
        .route("/groups/:id", get(groups::edit_form).post(groups::update))
        .route("/users", get(users::list))
        .route("/users/add", get(users::new_form).post(users::create))
        .route("/users/delete", post(users::bulk_delete))
        .route("/users/:id", get(users::edit_form).post(users::update))
        .route_layer(middleware::from_fn_with_state(
            AccessRequirement::new(Capability::Superuser, guard),
            access_guard,
        ))
        .with_state(state.clone());

    let public = Router::new()
        .route("/login", get(login::form).post(login::submit))
        .route("/logout", post(login::logout))
        .with_state(state);

    Router::new().nest("/admin", protected.merge(public))
}
