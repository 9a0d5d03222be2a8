//! Core traits shared across crates

/// Primary key type for persisted entities
pub type Id = i64;

/// The guard's view of an account: who is asking, and with what privilege.
///
/// Implemented by the authenticated-user type in `arkiv-auth`; capability
/// predicates only ever see this trait.
pub trait Principal: Send + Sync {
    fn id(&self) -> Id;
    fn username(&self) -> &str;
    fn is_superuser(&self) -> bool;
    fn is_active(&self) -> bool;
}
