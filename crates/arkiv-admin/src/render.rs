//! Template rendering seam
//!
//! The HTML template engine is an external collaborator: views only
//! assemble a [`ViewContext`](crate::context::ViewContext) and name the
//! template. The shipped [`ContextRenderer`] serializes the context
//! as-is, which any front end (or test) can consume; an engine-backed
//! renderer implements the same trait.

use thiserror::Error;

use crate::context::ViewContext;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("Failed to render {template}: {message}")]
    Render { template: String, message: String },
}

/// Renders a named template with the assembled context
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, context: &ViewContext) -> Result<String, RenderError>;
}

/// Renderer that emits the context itself as JSON
#[derive(Debug, Default)]
pub struct ContextRenderer;

impl TemplateRenderer for ContextRenderer {
    fn render(&self, template: &str, context: &ViewContext) -> Result<String, RenderError> {
        let mut value = serde_json::to_value(context).map_err(|e| RenderError::Render {
            template: template.to_string(),
            message: e.to_string(),
        })?;

        if let Some(map) = value.as_object_mut() {
            map.insert("template".into(), template.into());
        }

        serde_json::to_string(&value).map_err(|e| RenderError::Render {
            template: template.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_renderer_includes_template_name() {
        let ctx = ViewContext::new().title("Users");
        let body = ContextRenderer.render("admin/user_list.html", &ctx).unwrap();

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["template"], "admin/user_list.html");
        assert_eq!(value["title"], "Users");
    }
}
