//! # arkiv-admin
//!
//! Administrative CRUD screens for Arkiv: user accounts and permission
//! groups. Each entity gets a list view (paginated, sorted, bulk
//! delete), a create view, and an update view, all gated behind the
//! superuser capability.
//!
//! Handlers are plain functions parameterized by the entity-store
//! traits from `arkiv-db`; template context is assembled here and
//! handed to a [`render::TemplateRenderer`].

pub mod context;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod render;
pub mod routes;
pub mod state;

pub use context::ViewContext;
pub use error::{ViewError, ViewResult};
pub use render::{ContextRenderer, RenderError, TemplateRenderer};
pub use routes::router;
pub use state::AdminState;
