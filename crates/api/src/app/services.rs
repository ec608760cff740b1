use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast::error::RecvError;

use devhub_auth::{
    AuthProvider, AuthStateChange, EditorDirectory, RoleResolver, RoleStore, SessionResolver,
};
use devhub_content::{ContentStore, EditorAllowList, Event, Resource, seed};
use devhub_infra::{
    InMemoryAuthProvider, InMemoryRoleStore, SupabaseAuthProvider, SupabaseClient,
    SupabaseConfigError, SupabaseRoleStore,
};

use crate::config::{AppConfig, AuthBackend};

/// Shared read guard; a panicked writer never leaves a collection half-updated,
/// so poisoning is ignored.
pub fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Allow-list shared between the admin routes and the role resolver.
#[derive(Debug, Clone, Default)]
pub struct SharedAllowList(Arc<RwLock<EditorAllowList>>);

impl SharedAllowList {
    pub fn new(list: EditorAllowList) -> Self {
        Self(Arc::new(RwLock::new(list)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, EditorAllowList> {
        read(&self.0)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, EditorAllowList> {
        write(&self.0)
    }
}

impl EditorDirectory for SharedAllowList {
    fn is_editor(&self, email: &str) -> bool {
        self.read().contains(email)
    }
}

/// Everything the handlers need, built once at startup.
pub struct AppServices {
    pub provider: Arc<dyn AuthProvider>,
    pub sessions: SessionResolver,
    pub roles: RoleResolver,
    pub events: RwLock<ContentStore<Event>>,
    pub resources: RwLock<ContentStore<Resource>>,
    pub editors: SharedAllowList,
    pub oauth_redirect: String,
}

impl AppServices {
    /// Wire services around an already-constructed provider and role store.
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        role_store: Arc<dyn RoleStore>,
        config: &AppConfig,
    ) -> Self {
        let mut allow_list = EditorAllowList::new(&config.editor_domain);
        let (events, resources) = if config.seed_demo {
            allow_list.seed(seed::demo_editors());
            (
                ContentStore::seeded(seed::demo_events()),
                ContentStore::seeded(seed::demo_resources()),
            )
        } else {
            (ContentStore::new(), ContentStore::new())
        };
        let editors = SharedAllowList::new(allow_list);

        let sessions =
            SessionResolver::new(provider.clone()).with_timeout(config.session_timeout);
        let roles = RoleResolver::new(role_store, &config.admin_email)
            .with_editor_directory(Arc::new(editors.clone()));

        tracing::info!(
            seeded = config.seed_demo,
            events = events.len(),
            resources = resources.len(),
            editors = editors.read().list().len(),
            "services ready"
        );

        Self {
            provider,
            sessions,
            roles,
            events: RwLock::new(events),
            resources: RwLock::new(resources),
            editors,
            oauth_redirect: config.oauth_redirect.clone(),
        }
    }

    /// Construct the configured backend and wire services around it.
    pub fn from_config(config: &AppConfig) -> Result<Self, SupabaseConfigError> {
        let (provider, role_store): (Arc<dyn AuthProvider>, Arc<dyn RoleStore>) =
            match &config.auth_backend {
                AuthBackend::Memory => (
                    Arc::new(InMemoryAuthProvider::new()),
                    Arc::new(InMemoryRoleStore::new()),
                ),
                AuthBackend::Supabase { url, anon_key } => {
                    let client =
                        SupabaseClient::new(url, anon_key.as_str(), config.session_timeout)?;
                    tracing::info!(base_url = %client.base_url(), "using supabase auth backend");
                    (
                        Arc::new(SupabaseAuthProvider::new(client.clone())),
                        Arc::new(SupabaseRoleStore::new(client)),
                    )
                }
            };
        Ok(Self::new(provider, role_store, config))
    }
}

/// Log every sign-in/sign-out the provider reports until it goes away.
pub fn spawn_auth_audit(provider: &dyn AuthProvider) -> tokio::task::JoinHandle<()> {
    let mut changes = provider.on_auth_state_change();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(AuthStateChange::SignedIn(identity)) => {
                    tracing::info!(user_id = %identity.id, email = %identity.email, "auth: signed in");
                }
                Ok(AuthStateChange::SignedOut(user_id)) => {
                    tracing::info!(%user_id, "auth: signed out");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth audit fell behind; events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
