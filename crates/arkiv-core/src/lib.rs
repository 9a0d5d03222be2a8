//! # arkiv-core
//!
//! Core types, traits, and utilities shared across the Arkiv admin crates:
//! - The `ValidationErrors` collection consumed by form redisplay
//! - Core traits (`Principal`)
//! - Pagination types
//! - Configuration loading

pub mod config;
pub mod error;
pub mod pagination;
pub mod traits;

pub use error::*;
pub use pagination::*;
pub use traits::*;
