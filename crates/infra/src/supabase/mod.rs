//! Supabase adapters: auth API (GoTrue) and the `user_roles` REST table.

pub mod auth;
pub mod client;
pub mod roles;

pub use auth::SupabaseAuthProvider;
pub use client::{SupabaseClient, SupabaseConfigError};
pub use roles::{DEFAULT_ROLE_TABLE, SupabaseRoleStore};
