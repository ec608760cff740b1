//! Process configuration, read from `DEVHUB_*` / `SUPABASE_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use devhub_auth::DEFAULT_SESSION_TIMEOUT;
use devhub_content::EditorAllowList;
use devhub_core::EmailAddress;
use devhub_observability::{LogConfig, LogFormat};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@devhub.com";
pub const DEFAULT_OAUTH_REDIRECT: &str = "http://localhost:3000/auth/callback";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required when DEVHUB_AUTH_BACKEND=supabase")]
    Missing { var: &'static str },

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

/// Where sessions and role assignments live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthBackend {
    /// In-process provider and role store; state is lost on restart.
    Memory,
    Supabase { url: String, anon_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub admin_email: String,
    pub editor_domain: String,
    pub auth_backend: AuthBackend,
    pub session_timeout: Duration,
    pub seed_demo: bool,
    pub oauth_redirect: String,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            editor_domain: EditorAllowList::DEFAULT_DOMAIN.to_string(),
            auth_backend: AuthBackend::Memory,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            seed_demo: true,
            oauth_redirect: DEFAULT_OAUTH_REDIRECT.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank values take the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = get("DEVHUB_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("DEVHUB_BIND_ADDR", e))?;

        let admin_email = match get("DEVHUB_ADMIN_EMAIL") {
            Some(raw) => EmailAddress::parse(&raw)
                .map_err(|e| invalid("DEVHUB_ADMIN_EMAIL", e))?
                .to_string(),
            None => DEFAULT_ADMIN_EMAIL.to_string(),
        };

        let editor_domain = get("DEVHUB_EDITOR_DOMAIN")
            .map(|d| d.trim_start_matches('@').to_lowercase())
            .unwrap_or_else(|| EditorAllowList::DEFAULT_DOMAIN.to_string());
        if !editor_domain.contains('.') {
            return Err(invalid("DEVHUB_EDITOR_DOMAIN", "expected a domain like gmail.com"));
        }

        let auth_backend = match get("DEVHUB_AUTH_BACKEND").as_deref().map(str::to_lowercase) {
            None => AuthBackend::Memory,
            Some(b) if b == "memory" => AuthBackend::Memory,
            Some(b) if b == "supabase" => AuthBackend::Supabase {
                url: get("SUPABASE_URL").ok_or(ConfigError::Missing { var: "SUPABASE_URL" })?,
                anon_key: get("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing {
                    var: "SUPABASE_ANON_KEY",
                })?,
            },
            Some(other) => {
                return Err(invalid(
                    "DEVHUB_AUTH_BACKEND",
                    format!("`{other}` (expected memory or supabase)"),
                ));
            }
        };

        let session_timeout = match get("DEVHUB_SESSION_TIMEOUT_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => return Err(invalid("DEVHUB_SESSION_TIMEOUT_MS", "must be positive")),
                Ok(ms) => Duration::from_millis(ms),
                Err(e) => return Err(invalid("DEVHUB_SESSION_TIMEOUT_MS", e)),
            },
            None => DEFAULT_SESSION_TIMEOUT,
        };

        let seed_demo = match get("DEVHUB_SEED_DEMO").as_deref().map(str::to_lowercase) {
            None => true,
            Some(v) => match v.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(invalid("DEVHUB_SEED_DEMO", format!("`{v}` is not a boolean"))),
            },
        };

        let oauth_redirect =
            get("DEVHUB_OAUTH_REDIRECT").unwrap_or_else(|| DEFAULT_OAUTH_REDIRECT.to_string());

        let log = LogConfig {
            format: match get("DEVHUB_LOG_FORMAT") {
                Some(raw) => raw
                    .parse::<LogFormat>()
                    .map_err(|e| invalid("DEVHUB_LOG_FORMAT", e))?,
                None => LogFormat::Json,
            },
            level: get("DEVHUB_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            bind_addr,
            admin_email,
            editor_domain,
            auth_backend,
            session_timeout,
            seed_demo,
            oauth_redirect,
            log,
        })
    }

    /// Warn about settings that are fine for a laptop and wrong for a deployment.
    /// Call after logging is initialized.
    pub fn warn_on_dev_defaults(&self) {
        if self.admin_email == DEFAULT_ADMIN_EMAIL {
            tracing::warn!(
                admin_email = DEFAULT_ADMIN_EMAIL,
                "DEVHUB_ADMIN_EMAIL not set; using the built-in admin address"
            );
        }
        if self.auth_backend == AuthBackend::Memory {
            tracing::warn!("using in-memory auth backend; accounts and roles are not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = from_pairs(&[
            ("DEVHUB_BIND_ADDR", "127.0.0.1:9000"),
            ("DEVHUB_ADMIN_EMAIL", " Boss@Example.org "),
            ("DEVHUB_EDITOR_DOMAIN", "@Example.org"),
            ("DEVHUB_SESSION_TIMEOUT_MS", "250"),
            ("DEVHUB_SEED_DEMO", "false"),
            ("DEVHUB_LOG_FORMAT", "pretty"),
            ("DEVHUB_LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.admin_email, "boss@example.org");
        assert_eq!(cfg.editor_domain, "example.org");
        assert_eq!(cfg.session_timeout, Duration::from_millis(250));
        assert!(!cfg.seed_demo);
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        assert_eq!(cfg.log.level, "debug");
    }

    #[test]
    fn supabase_backend_needs_url_and_key() {
        assert_eq!(
            from_pairs(&[("DEVHUB_AUTH_BACKEND", "supabase")]),
            Err(ConfigError::Missing { var: "SUPABASE_URL" })
        );
        assert_eq!(
            from_pairs(&[
                ("DEVHUB_AUTH_BACKEND", "supabase"),
                ("SUPABASE_URL", "https://demo.supabase.co"),
            ]),
            Err(ConfigError::Missing {
                var: "SUPABASE_ANON_KEY"
            })
        );

        let cfg = from_pairs(&[
            ("DEVHUB_AUTH_BACKEND", "Supabase"),
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap();
        assert_eq!(
            cfg.auth_backend,
            AuthBackend::Supabase {
                url: "https://demo.supabase.co".into(),
                anon_key: "anon".into()
            }
        );
    }

    #[test]
    fn rejects_malformed_values() {
        for (key, value) in [
            ("DEVHUB_BIND_ADDR", "localhost"),
            ("DEVHUB_ADMIN_EMAIL", "not-an-email"),
            ("DEVHUB_EDITOR_DOMAIN", "localhost"),
            ("DEVHUB_AUTH_BACKEND", "ldap"),
            ("DEVHUB_SESSION_TIMEOUT_MS", "0"),
            ("DEVHUB_SESSION_TIMEOUT_MS", "soon"),
            ("DEVHUB_SEED_DEMO", "maybe"),
            ("DEVHUB_LOG_FORMAT", "xml"),
        ] {
            assert!(
                matches!(from_pairs(&[(key, value)]), Err(ConfigError::Invalid { var, .. }) if var == key),
                "{key}={value} should be rejected"
            );
        }
    }
}
