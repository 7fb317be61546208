//! Registry of credential providers keyed by identifier.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{AuthError, AuthResult, Credentials, CredentialProvider, ProviderSummary};

/// In-memory registry for credential providers.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn CredentialProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider keyed by its [`CredentialProvider::id`].
    pub fn register<P>(&mut self, provider: P)
    where
        P: CredentialProvider + 'static,
    {
        self.register_arc(Arc::new(provider));
    }

    /// Register an already shared provider.
    pub fn register_arc(&mut self, provider: Arc<dyn CredentialProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    /// Retrieve a provider by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn CredentialProvider>> {
        self.providers.get(id).map(Arc::clone)
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.providers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Summaries for every registered provider, sorted by id.
    #[must_use]
    pub fn summaries(&self) -> Vec<ProviderSummary> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.providers.get(id))
            .map(|provider| ProviderSummary {
                id: provider.id().to_string(),
                label: provider.label().to_string(),
            })
            .collect()
    }

    /// Look up `id` and resolve its credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownProvider`] for unregistered ids and
    /// propagates provider failures.
    pub fn resolve(&self, id: &str) -> AuthResult<Credentials> {
        let provider = self.get(id).ok_or_else(|| AuthError::UnknownProvider {
            id: id.to_string(),
            known: self.ids().join(", "),
        })?;
        provider.resolve()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
