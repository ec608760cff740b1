//! `devhub-content`: events, resources and the editor allow-list.
//!
//! Collections are plain in-memory values; every mutation takes the caller's
//! [`devhub_auth::Role`] and is gated by the access policy.

pub mod editors;
pub mod record;
pub mod seed;
pub mod store;

pub use editors::{EditorAllowList, EditorEntry};
pub use record::{Event, Record, Resource};
pub use store::ContentStore;
