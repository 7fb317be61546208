use gitall_auth_api::{AuthResult, CredentialProvider, Credentials};

/// Delegates authentication to a running ssh-agent.
#[derive(Debug, Clone)]
pub struct AgentProvider {
    username: String,
}

impl AgentProvider {
    /// Create a provider offering `username` to the remote.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl CredentialProvider for AgentProvider {
    fn id(&self) -> &'static str {
        "agent"
    }

    fn label(&self) -> &'static str {
        "ssh-agent"
    }

    fn resolve(&self) -> AuthResult<Credentials> {
        Ok(Credentials::SshAgent {
            username: self.username.clone(),
        })
    }
}

/// No key material; libgit2 falls back to its default credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousProvider;

impl CredentialProvider for AnonymousProvider {
    fn id(&self) -> &'static str {
        "none"
    }

    fn label(&self) -> &'static str {
        "No credentials (local or public remotes)"
    }

    fn resolve(&self) -> AuthResult<Credentials> {
        Ok(Credentials::Default)
    }
}
