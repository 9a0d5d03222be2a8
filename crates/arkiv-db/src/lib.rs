//! # arkiv-db
//!
//! Database layer for Arkiv, backed by PostgreSQL via SQLx:
//!
//! - Connection pool management
//! - Entity-access traits (`UserStore`, `GroupStore`) and their
//!   Postgres implementations
//!
//! ## Example
//!
//! ```ignore
//! use arkiv_db::{Database, DatabaseConfig, PgUserStore, UserStore};
//!
//! let db = Database::connect(&DatabaseConfig::default()).await?;
//! let users = PgUserStore::new(db.pool().clone());
//! let page = users.list(Default::default()).await?;
//! ```

pub mod groups;
pub mod pool;
pub mod store;
pub mod users;

pub use groups::{CreateGroupDto, GroupRow, GroupStore, PgGroupStore, UpdateGroupDto};
pub use pool::{Database, DatabaseConfig};
pub use store::{StoreError, StoreResult};
pub use users::{CreateUserDto, PgUserStore, UpdateUserDto, UserRow, UserStore};
