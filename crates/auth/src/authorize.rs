//! Access policy: the single place that maps a role to what it may do.
//!
//! - No IO
//! - No panics
//! - Total over [`Role`]

use thiserror::Error;

use devhub_core::DomainError;

use crate::{Capability, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks capability '{capability}'")]
    Forbidden { role: Role, capability: Capability },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::forbidden(value.to_string())
    }
}

/// `true` iff the role may create, update or delete content.
pub fn can_edit(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Editor)
}

/// `true` iff the role may manage the editor allow-list.
pub fn can_manage_access(role: Role) -> bool {
    role == Role::Admin
}

pub fn grants(role: Role, capability: Capability) -> bool {
    match capability {
        Capability::Edit => can_edit(role),
        Capability::ManageAccess => can_manage_access(role),
    }
}

/// Capabilities held by a role, in declaration order.
pub fn capabilities(role: Role) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|c| grants(role, *c))
        .collect()
}

/// Check a role against a required capability.
pub fn authorize(role: Role, required: Capability) -> Result<(), AuthzError> {
    if grants(role, required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role,
            capability: required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Admin), Just(Role::Editor), Just(Role::Viewer)]
    }

    #[test]
    fn edit_matrix() {
        assert!(can_edit(Role::Admin));
        assert!(can_edit(Role::Editor));
        assert!(!can_edit(Role::Viewer));
    }

    #[test]
    fn only_admin_manages_access() {
        assert!(can_manage_access(Role::Admin));
        assert!(!can_manage_access(Role::Editor));
        assert!(!can_manage_access(Role::Viewer));
    }

    #[test]
    fn authorize_reports_role_and_capability() {
        let err = authorize(Role::Viewer, Capability::Edit).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                role: Role::Viewer,
                capability: Capability::Edit
            }
        );
        assert!(err.to_string().contains("content.edit"));

        let domain: DomainError = err.into();
        assert!(domain.is_forbidden());
    }

    #[test]
    fn capabilities_per_role() {
        assert_eq!(
            capabilities(Role::Admin),
            vec![Capability::Edit, Capability::ManageAccess]
        );
        assert_eq!(capabilities(Role::Editor), vec![Capability::Edit]);
        assert!(capabilities(Role::Viewer).is_empty());
    }

    proptest! {
        #[test]
        fn can_edit_iff_admin_or_editor(role in any_role()) {
            prop_assert_eq!(can_edit(role), role == Role::Admin || role == Role::Editor);
        }

        #[test]
        fn authorize_agrees_with_predicates(role in any_role()) {
            prop_assert_eq!(authorize(role, Capability::Edit).is_ok(), can_edit(role));
            prop_assert_eq!(
                authorize(role, Capability::ManageAccess).is_ok(),
                can_manage_access(role)
            );
        }

        #[test]
        fn managing_access_implies_editing(role in any_role()) {
            prop_assert!(!can_manage_access(role) || can_edit(role));
        }
    }
}
