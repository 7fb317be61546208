use std::fmt;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Username offered to ssh remotes that do not embed one in their URL.
pub const DEFAULT_USERNAME: &str = "git";

/// Key passphrase; never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(String);

impl Passphrase {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(***)")
    }
}

/// Resolved credentials, opaque to the reconciliation core beyond being
/// usable as fetch authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Private key on disk, optionally encrypted.
    SshKey {
        /// Username offered when the URL carries none.
        username: String,
        /// Path of the private key file.
        private_key: Utf8PathBuf,
        /// Matching public key, when it sits next to the private key.
        public_key: Option<Utf8PathBuf>,
        /// Passphrase decrypting the private key.
        passphrase: Option<Passphrase>,
    },
    /// Keys held by a running ssh-agent.
    SshAgent {
        /// Username offered when the URL carries none.
        username: String,
    },
    /// libgit2 default credentials; enough for local and anonymous remotes.
    Default,
}

impl Credentials {
    /// Username to offer, if these credentials carry one.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::SshKey { username, .. } | Self::SshAgent { username } => Some(username),
            Self::Default => None,
        }
    }
}

/// Summary information about a registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSummary {
    /// Stable identifier for the provider.
    pub id: String,
    /// Human-friendly label for display.
    pub label: String,
}

/// Errors surfaced while resolving credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No provider registered under the requested id.
    #[error("unknown credential provider '{id}' (known: {known})")]
    UnknownProvider {
        /// Requested identifier.
        id: String,
        /// Comma-separated registered identifiers.
        known: String,
    },
    /// The home directory could not be determined for `~` expansion.
    #[error("could not determine home directory to expand {path}")]
    NoHomeDirectory {
        /// Path that needed expansion.
        path: String,
    },
    /// Key file missing or unreadable.
    #[error("read file {path} failed: {source}")]
    KeyFile {
        /// Key file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Key path is not valid UTF-8.
    #[error("key path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },
}

/// Convenience result alias for credential resolution.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
