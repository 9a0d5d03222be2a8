//! Template context assembly
//!
//! Views build a [`ViewContext`] — the variables a template sees — and
//! hand it to the renderer. The well-known keys (`title`, `action_url`,
//! `table_header_row`, `object`, `object_list`, `errors`, `pagination`)
//! have dedicated builders; anything else goes through [`ViewContext::with`].

use serde::Serialize;
use serde_json::{json, Map, Value};

use arkiv_core::error::ValidationErrors;
use arkiv_core::pagination::Paginated;

/// The variables handed to the template renderer for one screen
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewContext {
    #[serde(flatten)]
    values: Map<String, Value>,
}

impl ViewContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary context variable
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.values.insert(key.into(), value);
        self
    }

    /// Screen title ("Users", "New", "Edit", ...)
    pub fn title(self, title: &str) -> Self {
        self.with("title", title)
    }

    /// Form submission target
    pub fn action_url(self, url: impl Into<String>) -> Self {
        self.with("action_url", url.into())
    }

    /// Column labels for the list table
    pub fn table_header_row(self, labels: &[&str]) -> Self {
        self.with("table_header_row", labels)
    }

    /// The entity a form edits
    pub fn object(self, object: impl Serialize) -> Self {
        self.with("object", object)
    }

    /// One page of entities plus pagination metadata
    pub fn page<T: Serialize>(self, page: &Paginated<T>) -> Self {
        self.with("object_list", &page.items).with(
            "pagination",
            json!({
                "total": page.total,
                "page": page.page,
                "per_page": page.per_page,
                "total_pages": page.total_pages(),
                "has_next": page.has_next(),
                "has_prev": page.has_prev(),
            }),
        )
    }

    /// Inline form errors for redisplay
    pub fn errors(self, errors: &ValidationErrors) -> Self {
        let mut fields = Map::new();
        for (field, messages) in &errors.errors {
            fields.insert(field.clone(), json!(messages));
        }
        self.with(
            "errors",
            json!({
                "fields": fields,
                "base": errors.base_errors,
            }),
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}
