//! `devhub-auth`: session, role and access-policy boundary.
//!
//! This crate is decoupled from HTTP and from any concrete auth backend: the
//! provider and the role store are traits, implemented in `devhub-infra`.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod provider;
pub mod resolver;
pub mod role_store;
pub mod roles;
pub mod session;

pub use authorize::{AuthzError, authorize, can_edit, can_manage_access, capabilities, grants};
pub use permissions::Capability;
pub use principal::Identity;
pub use provider::{
    AuthError, AuthProvider, AuthStateChange, OAuthProvider, OAuthRedirect, SignUpOutcome,
};
pub use resolver::{
    DEFAULT_SESSION_TIMEOUT, EditorDirectory, RoleResolver, SessionResolver, SessionState,
};
pub use role_store::{RoleAssignment, RoleStore, RoleStoreError};
pub use roles::{Role, UnknownRole};
pub use session::{CLOCK_SKEW_LEEWAY, Session, SessionError, validate_session};
