mod registry;
mod types;

pub use registry::ProviderRegistry;
pub use types::{AuthError, AuthResult, Credentials, Passphrase, ProviderSummary, DEFAULT_USERNAME};

/// Source of fetch credentials (key file, ssh-agent, ...).
///
/// Providers are resolved once per invocation and must never prompt; any
/// interactive step belongs to the caller.
pub trait CredentialProvider: Send + Sync {
    /// Stable identifier used for lookup and logging.
    fn id(&self) -> &'static str;

    /// Human-friendly label for help output.
    fn label(&self) -> &'static str;

    /// Produce credentials usable for fetching.
    ///
    /// # Errors
    ///
    /// Implementors should report missing or unreadable key material.
    fn resolve(&self) -> AuthResult<Credentials>;
}
