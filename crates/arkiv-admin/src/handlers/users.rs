//! User admin screens: list, create, update, bulk delete

use axum::{
    extract::{Path, Query, RawForm, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Serialize;

use arkiv_auth::{hash_password, CurrentUser};
use arkiv_core::error::ValidationErrors;
use arkiv_core::pagination::PageParams;
use arkiv_core::traits::Id;
use arkiv_db::{CreateUserDto, StoreError, UpdateUserDto, UserRow};

use crate::context::ViewContext;
use crate::error::{ViewError, ViewResult};
use crate::forms::{UserCreateForm, UserUpdateForm};
use crate::routes::reverse;
use crate::state::AdminState;

const LIST_TEMPLATE: &str = "admin/user_list.html";
const FORM_TEMPLATE: &str = "admin/user_form.html";

/// User as the templates see it; the password hash stays out of context
#[derive(Debug, Serialize)]
struct UserContext {
    id: Id,
    username: String,
    email: String,
    is_superuser: bool,
    is_active: bool,
}

impl From<&UserRow> for UserContext {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username.clone(),
            email: row.email.clone(),
            is_superuser: row.is_superuser,
            is_active: row.is_active,
        }
    }
}

/// `GET /admin/users` — all users ordered by username ascending
pub async fn list(
    State(state): State<AdminState>,
    Query(params): Query<PageParams>,
) -> ViewResult<Response> {
    let page = state.users.list(params).await?;

    let context = ViewContext::new()
        .title("Users")
        .action_url(reverse::users())
        .with("new_object_url", reverse::user_add())
        .with("delete_url", reverse::user_delete())
        .page(&page.map(|row| UserContext::from(&row)));

    state.render(LIST_TEMPLATE, &context)
}

/// `GET /admin/users/add` — empty create form with a password field
pub async fn new_form(State(state): State<AdminState>) -> ViewResult<Response> {
    let context = ViewContext::new()
        .title("New")
        .action_url(reverse::user_add());

    state.render(FORM_TEMPLATE, &context)
}

/// `POST /admin/users/add`
pub async fn create(
    State(state): State<AdminState>,
    Form(form): Form<UserCreateForm>,
) -> ViewResult<Response> {
    if let Err(errors) = form.validated(state.auth.password_min_length) {
        return redisplay_create(&state, &form, &errors);
    }

    let password_hash = hash_password(&form.password)
        .map_err(|e| ViewError::internal(format!("Password hashing failed: {}", e)))?;

    let dto = CreateUserDto {
        username: form.username.clone(),
        email: form.email.clone(),
        password_hash,
        is_superuser: form.is_superuser,
        is_active: true,
    };

    match state.users.create(dto).await {
        Ok(user) => {
            tracing::info!(user = %user.username, id = user.id, "Created user");
            Ok(Redirect::to(&reverse::users()).into_response())
        }
        Err(StoreError::Conflict { field }) => {
            let mut errors = ValidationErrors::new();
            errors.add(field, "is already taken");
            redisplay_create(&state, &form, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /admin/users/:id` — form pre-filled from an existing user
pub async fn edit_form(
    State(state): State<AdminState>,
    Path(id): Path<Id>,
) -> ViewResult<Response> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ViewError::not_found("User", id))?;

    let context = ViewContext::new()
        .title("Edit")
        .action_url(reverse::user_update(user.id))
        .object(UserContext::from(&user));

    state.render(FORM_TEMPLATE, &context)
}

/// `POST /admin/users/:id`
pub async fn update(
    State(state): State<AdminState>,
    Path(id): Path<Id>,
    Form(form): Form<UserUpdateForm>,
) -> ViewResult<Response> {
    if state.users.find_by_id(id).await?.is_none() {
        return Err(ViewError::not_found("User", id));
    }

    if let Err(errors) = form.validated(state.auth.password_min_length) {
        return redisplay_update(&state, id, &form, &errors);
    }

    let password_hash = match form.new_password() {
        Some(password) => Some(
            hash_password(password)
                .map_err(|e| ViewError::internal(format!("Password hashing failed: {}", e)))?,
        ),
        None => None,
    };

    let dto = UpdateUserDto {
        username: Some(form.username.clone()),
        email: Some(form.email.clone()),
        password_hash,
        is_superuser: Some(form.is_superuser),
        is_active: Some(form.is_active),
    };

    match state.users.update(id, dto).await {
        Ok(user) => {
            tracing::info!(user = %user.username, id = user.id, "Updated user");
            Ok(Redirect::to(&reverse::users()).into_response())
        }
        Err(StoreError::Conflict { field }) => {
            let mut errors = ValidationErrors::new();
            errors.add(field, "is already taken");
            redisplay_update(&state, id, &form, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /admin/users/delete` — delete the selected entries.
///
/// The requesting account's own id is dropped from the selection; the
/// rest is still deleted.
pub async fn bulk_delete(
    State(state): State<AdminState>,
    Extension(current_user): Extension<CurrentUser>,
    RawForm(body): RawForm,
) -> ViewResult<Response> {
    let body = String::from_utf8_lossy(&body);
    let mut ids = super::parse_ids(&body, "selected");

    if ids.contains(&current_user.id) {
        tracing::warn!(
            user = %current_user.username,
            "Refusing to delete the requesting account"
        );
        ids.retain(|id| *id != current_user.id);
    }

    let deleted = state.users.delete_many(&ids).await?;
    if deleted > 0 {
        tracing::info!(count = deleted, "Deleted users");
    }

    Ok(Redirect::to(&reverse::users()).into_response())
}

fn redisplay_create(
    state: &AdminState,
    form: &UserCreateForm,
    errors: &ValidationErrors,
) -> ViewResult<Response> {
    let context = ViewContext::new()
        .title("New")
        .action_url(reverse::user_add())
        .with(
            "form",
            serde_json::json!({
                "username": form.username,
                "email": form.email,
                "is_superuser": form.is_superuser,
            }),
        )
        .errors(errors);

    state.render_status(StatusCode::UNPROCESSABLE_ENTITY, FORM_TEMPLATE, &context)
}

fn redisplay_update(
    state: &AdminState,
    id: Id,
    form: &UserUpdateForm,
    errors: &ValidationErrors,
) -> ViewResult<Response> {
    let context = ViewContext::new()
        .title("Edit")
        .action_url(reverse::user_update(id))
        .with(
            "form",
            serde_json::json!({
                "username": form.username,
                "email": form.email,
                "is_superuser": form.is_superuser,
                "is_active": form.is_active,
            }),
        )
        .errors(errors);

    state.render_status(StatusCode::UNPROCESSABLE_ENTITY, FORM_TEMPLATE, &context)
}
