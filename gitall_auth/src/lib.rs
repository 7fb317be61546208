mod agent;
mod key_file;

pub use agent::{AgentProvider, AnonymousProvider};
pub use key_file::{expand_home, KeyFileProvider, DEFAULT_KEY_PATH, PASSPHRASE_ENV};

use gitall_auth_api::{ProviderRegistry, DEFAULT_USERNAME};

/// Settings shared by the builtin providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Private key path; a leading `~` is expanded.
    pub key_path: String,
    /// Username offered when the remote URL carries none.
    pub username: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            key_path: DEFAULT_KEY_PATH.to_string(),
            username: DEFAULT_USERNAME.to_string(),
        }
    }
}

/// Build a registry populated with the builtin providers.
#[must_use]
pub fn default_registry(settings: &AuthSettings) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(
        KeyFileProvider::from_env(settings.key_path.clone()).with_username(settings.username.clone()),
    );
    registry.register(AgentProvider::new(settings.username.clone()));
    registry.register(AnonymousProvider);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_exposes_builtins() {
        let registry = default_registry(&AuthSettings::default());
        assert_eq!(registry.ids(), vec!["agent", "key-file", "none"]);
    }
}
