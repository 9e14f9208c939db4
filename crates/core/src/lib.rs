//! `kfs-core`: foundation building blocks for the client data layer.
//!
//! This crate contains **pure** primitives (no network, no threads): the
//! domain error type, JSON field validation helpers, entity/value-object
//! markers, and date/time utilities.

pub mod entity;
pub mod error;
pub mod json;
pub mod time;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use value_object::ValueObject;
