//! Shared handler state

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use arkiv_auth::{CookieConfig, SessionStore};
use arkiv_core::config::AuthConfig;
use arkiv_db::{GroupStore, UserStore};

use crate::context::ViewContext;
use crate::error::ViewResult;
use crate::render::TemplateRenderer;

/// Everything the admin handlers need, injected at router assembly
#[derive(Clone)]
pub struct AdminState {
    pub users: Arc<dyn UserStore>,
    pub groups: Arc<dyn GroupStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub cookie: CookieConfig,
    pub auth: AuthConfig,
}

impl AdminState {
    /// Render a screen with status 200
    pub fn render(&self, template: &str, context: &ViewContext) -> ViewResult<Response> {
        self.render_status(StatusCode::OK, template, context)
    }

    /// Render a screen with an explicit status (422 for form redisplay)
    pub fn render_status(
        &self,
        status: StatusCode,
        template: &str,
        context: &ViewContext,
    ) -> ViewResult<Response> {
        let body = self.renderer.render(template, context)?;
        Ok((status, Html(body)).into_response())
    }
}
