//! `devhub-core`: shared portal building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no provider concerns).

pub mod email;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use email::EmailAddress;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{RecordId, UserId};
pub use value_object::ValueObject;
