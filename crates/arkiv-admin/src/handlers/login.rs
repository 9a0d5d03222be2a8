//! Login and logout

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Form,
};

use arkiv_auth::{extract_session_id, verify_password, Session};
use arkiv_core::error::ValidationErrors;

use crate::context::ViewContext;
use crate::error::{ViewError, ViewResult};
use crate::forms::LoginForm;
use crate::routes::reverse;
use crate::state::AdminState;

const LOGIN_TEMPLATE: &str = "admin/login.html";

/// `GET /admin/login`
pub async fn form(State(state): State<AdminState>) -> ViewResult<Response> {
    let context = ViewContext::new()
        .title("Log in")
        .action_url(reverse::login());

    state.render(LOGIN_TEMPLATE, &context)
}

/// `POST /admin/login` — verify credentials, open a session, set the cookie
pub async fn submit(
    State(state): State<AdminState>,
    Form(form): Form<LoginForm>,
) -> ViewResult<Response> {
    let user = state.users.find_by_username(&form.username).await?;

    // One rejection path for bad username, bad password, and
    // deactivated accounts; the caller learns nothing more.
    let user = match user.filter(|u| u.is_active && verify_password(&form.password, &u.password_hash))
    {
        Some(user) => user,
        None => {
            tracing::warn!(username = %form.username, "Failed login attempt");
            let mut errors = ValidationErrors::new();
            errors.add_base("Invalid username or password");

            let context = ViewContext::new()
                .title("Log in")
                .action_url(reverse::login())
                .with("form", serde_json::json!({ "username": form.username }))
                .errors(&errors);

            return state.render_status(StatusCode::UNPROCESSABLE_ENTITY, LOGIN_TEMPLATE, &context);
        }
    };

    let session = Session::authenticated(user.id, state.auth.session_lifetime_seconds);
    let cookie = state.cookie.build_cookie(&session.id);
    state
        .sessions
        .set(session)
        .map_err(|e| ViewError::internal(format!("Failed to store session: {}", e)))?;

    tracing::info!(user = %user.username, "Logged in");

    let target = form.next.filter(|n| n.starts_with('/')).unwrap_or_else(reverse::users);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Redirect::to(&target),
    )
        .into_response())
}

/// `POST /admin/logout` — drop the session and clear the cookie
pub async fn logout(State(state): State<AdminState>, headers: HeaderMap) -> ViewResult<Response> {
    if let Some(cookie_header) = headers.get("cookie").and_then(|v| v.to_str().ok()) {
        if let Some(session_id) = extract_session_id(cookie_header, &state.cookie.name) {
            state
                .sessions
                .delete(&session_id)
                .map_err(|e| ViewError::internal(format!("Failed to delete session: {}", e)))?;
        }
    }

    Ok((
        AppendHeaders([(SET_COOKIE, state.cookie.build_clear_cookie())]),
        Redirect::to(&reverse::login()),
    )
        .into_response())
}
