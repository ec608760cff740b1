//! `devhub-infra`: concrete auth providers and role stores.
//!
//! - `memory`: in-process implementations for local runs and tests
//! - `supabase`: HTTP implementations against a Supabase project

pub mod memory;
pub mod supabase;

pub use memory::{InMemoryAuthProvider, InMemoryRoleStore};
pub use supabase::{SupabaseAuthProvider, SupabaseClient, SupabaseConfigError, SupabaseRoleStore};
