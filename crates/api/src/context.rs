use devhub_auth::{Identity, Role, SessionState, can_edit, can_manage_access};

/// Who is calling, resolved once per request by the viewer middleware.
///
/// Anonymous callers get a context too: `Unauthenticated` with role `viewer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerContext {
    session: SessionState,
    role: Role,
}

impl ViewerContext {
    pub fn new(session: SessionState, role: Role) -> Self {
        Self { session, role }
    }

    pub fn anonymous() -> Self {
        Self::new(SessionState::Unauthenticated, Role::Viewer)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    pub fn access_token(&self) -> Option<&str> {
        match &self.session {
            SessionState::Authenticated(s) => Some(s.access_token.as_str()),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn can_edit(&self) -> bool {
        can_edit(self.role)
    }

    pub fn can_manage_access(&self) -> bool {
        can_manage_access(self.role)
    }
}
