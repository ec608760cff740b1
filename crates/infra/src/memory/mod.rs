//! In-memory adapters for local runs and tests.

pub mod auth;
pub mod roles;

pub use auth::InMemoryAuthProvider;
pub use roles::InMemoryRoleStore;
