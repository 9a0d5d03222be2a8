//! Group admin screens: list, create, update, bulk delete

use axum::{
    extract::{Path, Query, RawForm, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Serialize;

use arkiv_core::error::ValidationErrors;
use arkiv_core::pagination::PageParams;
use arkiv_core::traits::Id;
use arkiv_db::{CreateGroupDto, GroupRow, StoreError, UpdateGroupDto};

use crate::context::ViewContext;
use crate::error::{ViewError, ViewResult};
use crate::forms::GroupForm;
use crate::routes::reverse;
use crate::state::AdminState;

const LIST_TEMPLATE: &str = "admin/group_list.html";
const FORM_TEMPLATE: &str = "admin/object_form.html";

/// Group as the templates see it
#[derive(Debug, Serialize)]
struct GroupContext {
    id: Id,
    name: String,
}

impl From<&GroupRow> for GroupContext {
    fn from(row: &GroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
        }
    }
}

/// `GET /admin/groups` — all groups ordered by name ascending
pub async fn list(
    State(state): State<AdminState>,
    Query(params): Query<PageParams>,
) -> ViewResult<Response> {
    let page = state.groups.list(params).await?;

    let context = ViewContext::new()
        .title("Groups")
        .table_header_row(&["Name"])
        .action_url(reverse::groups())
        .with("new_object_url", reverse::group_add())
        .with("delete_url", reverse::group_delete())
        .page(&page.map(|row| GroupContext::from(&row)));

    state.render(LIST_TEMPLATE, &context)
}

/// `GET /admin/groups/add` — empty create form
pub async fn new_form(State(state): State<AdminState>) -> ViewResult<Response> {
    let context = ViewContext::new()
        .title("New")
        .action_url(reverse::group_add());

    state.render(FORM_TEMPLATE, &context)
}

/// `POST /admin/groups/add`
pub async fn create(
    State(state): State<AdminState>,
    Form(form): Form<GroupForm>,
) -> ViewResult<Response> {
    if let Err(errors) = form.validated() {
        return redisplay(&state, "New", reverse::group_add(), &form, &errors);
    }

    let dto = CreateGroupDto {
        name: form.name.clone(),
    };

    match state.groups.create(dto).await {
        Ok(group) => {
            tracing::info!(group = %group.name, id = group.id, "Created group");
            Ok(Redirect::to(&reverse::groups()).into_response())
        }
        Err(StoreError::Conflict { field }) => {
            let mut errors = ValidationErrors::new();
            errors.add(field, "is already taken");
            redisplay(&state, "New", reverse::group_add(), &form, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /admin/groups/:id` — form pre-filled from an existing group,
/// with the ids of its current members
pub async fn edit_form(
    State(state): State<AdminState>,
    Path(id): Path<Id>,
) -> ViewResult<Response> {
    let group = state
        .groups
        .find_by_id(id)
        .await?
        .ok_or_else(|| ViewError::not_found("Group", id))?;
    let member_ids = state.groups.member_ids(id).await?;

    let context = ViewContext::new()
        .title("Edit")
        .action_url(reverse::group_update(group.id))
        .object(GroupContext::from(&group))
        .with("member_ids", &member_ids);

    state.render(FORM_TEMPLATE, &context)
}

/// `POST /admin/groups/:id`
///
/// The edit form posts one `members=<id>` pair per ticked user;
/// membership is reconciled against that selection, so an empty
/// selection clears the group.
pub async fn update(
    State(state): State<AdminState>,
    Path(id): Path<Id>,
    RawForm(body): RawForm,
) -> ViewResult<Response> {
    if state.groups.find_by_id(id).await?.is_none() {
        return Err(ViewError::not_found("Group", id));
    }

    let body = String::from_utf8_lossy(&body);
    let form: GroupForm = serde_urlencoded::from_str(&body)
        .map_err(|e| ViewError::bad_request(format!("Malformed form submission: {}", e)))?;
    let members = super::parse_ids(&body, "members");

    if let Err(errors) = form.validated() {
        return redisplay(&state, "Edit", reverse::group_update(id), &form, &errors);
    }

    let dto = UpdateGroupDto {
        name: Some(form.name.clone()),
    };

    match state.groups.update(id, dto).await {
        Ok(group) => {
            sync_members(&state, id, &members).await?;
            tracing::info!(group = %group.name, id = group.id, "Updated group");
            Ok(Redirect::to(&reverse::groups()).into_response())
        }
        Err(StoreError::Conflict { field }) => {
            let mut errors = ValidationErrors::new();
            errors.add(field, "is already taken");
            redisplay(&state, "Edit", reverse::group_update(id), &form, &errors)
        }
        Err(e) => Err(e.into()),
    }
}

/// Reconcile stored membership against the submitted selection
async fn sync_members(state: &AdminState, group_id: Id, selected: &[Id]) -> ViewResult<()> {
    let current = state.groups.member_ids(group_id).await?;

    for user_id in selected {
        if !current.contains(user_id) {
            state.groups.add_member(group_id, *user_id).await?;
        }
    }
    for user_id in &current {
        if !selected.contains(user_id) {
            state.groups.remove_member(group_id, *user_id).await?;
        }
    }

    Ok(())
}

/// `POST /admin/groups/delete` — delete the selected entries
pub async fn bulk_delete(
    State(state): State<AdminState>,
    RawForm(body): RawForm,
) -> ViewResult<Response> {
    let body = String::from_utf8_lossy(&body);
    let ids = super::parse_ids(&body, "selected");

    let deleted = state.groups.delete_many(&ids).await?;
    if deleted > 0 {
        tracing::info!(count = deleted, "Deleted groups");
    }

    Ok(Redirect::to(&reverse::groups()).into_response())
}

fn redisplay(
    state: &AdminState,
    title: &str,
    action_url: String,
    form: &GroupForm,
    errors: &ValidationErrors,
) -> ViewResult<Response> {
    let context = ViewContext::new()
        .title(title)
        .action_url(action_url)
        .with("form", serde_json::json!({ "name": form.name }))
        .errors(errors);

    state.render_status(StatusCode::UNPROCESSABLE_ENTITY, FORM_TEMPLATE, &context)
}
