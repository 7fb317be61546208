use std::env;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use gitall_auth_api::{
    AuthError, AuthResult, CredentialProvider, Credentials, Passphrase, DEFAULT_USERNAME,
};

/// Key used when no path is configured.
pub const DEFAULT_KEY_PATH: &str = "~/.ssh/id_rsa";
/// Environment variable holding the key passphrase.
pub const PASSPHRASE_ENV: &str = "GITALL_SSH_PASSPHRASE";

/// Authenticates with a private key file.
#[derive(Debug, Clone)]
pub struct KeyFileProvider {
    key_path: String,
    username: String,
    passphrase: Option<Passphrase>,
}

impl KeyFileProvider {
    /// Provider for the key at `key_path`, without a passphrase.
    #[must_use]
    pub fn new(key_path: impl Into<String>) -> Self {
        Self {
            key_path: key_path.into(),
            username: DEFAULT_USERNAME.to_string(),
            passphrase: None,
        }
    }

    /// Provider for the key at `key_path`, taking the passphrase from
    /// [`PASSPHRASE_ENV`] when it is set and non-empty.
    #[must_use]
    pub fn from_env(key_path: impl Into<String>) -> Self {
        let passphrase = env::var(PASSPHRASE_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(Passphrase::new);
        Self::new(key_path).with_passphrase(passphrase)
    }

    /// Override the username offered to the remote.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set or clear the key passphrase.
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: Option<Passphrase>) -> Self {
        self.passphrase = passphrase;
        self
    }
}

impl CredentialProvider for KeyFileProvider {
    fn id(&self) -> &'static str {
        "key-file"
    }

    fn label(&self) -> &'static str {
        "SSH private key file"
    }

    fn resolve(&self) -> AuthResult<Credentials> {
        let private_key = expand_home(&self.key_path)?;
        let metadata = fs::metadata(&private_key).map_err(|source| AuthError::KeyFile {
            path: private_key.clone(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(AuthError::KeyFile {
                path: private_key,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let public_key = Utf8PathBuf::from(format!("{private_key}.pub"));
        let public_key = public_key.is_file().then_some(public_key);

        Ok(Credentials::SshKey {
            username: self.username.clone(),
            private_key,
            public_key,
            passphrase: self.passphrase.clone(),
        })
    }
}

/// Expand a leading `~` to the current user's home directory.
///
/// # Errors
///
/// Fails when the home directory is unknown or not valid UTF-8.
pub fn expand_home(path: &str) -> AuthResult<Utf8PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(Utf8PathBuf::from(path)),
    };

    let home = dirs::home_dir().ok_or_else(|| AuthError::NoHomeDirectory {
        path: path.to_string(),
    })?;
    let home = Utf8PathBuf::from_path_buf(home).map_err(|home| AuthError::NonUtf8Path {
        path: home.to_string_lossy().into_owned(),
    })?;

    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(Utf8Path::new(rest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absolute_paths_are_left_alone() {
        let expanded = expand_home("/etc/ssh/id_ed25519").expect("expand");
        assert_eq!(expanded, Utf8PathBuf::from("/etc/ssh/id_ed25519"));
    }

    #[test]
    fn tilde_user_syntax_is_not_expanded() {
        let expanded = expand_home("~other/.ssh/id_rsa").expect("expand");
        assert_eq!(expanded, Utf8PathBuf::from("~other/.ssh/id_rsa"));
    }

    #[test]
    fn tilde_prefix_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let expanded = expand_home("~/.ssh/id_rsa").expect("expand");
        assert_eq!(expanded.as_std_path(), home.join(".ssh/id_rsa"));
    }

    #[test]
    fn resolves_existing_key_with_public_half() {
        let temp = TempDir::new().expect("tempdir");
        let key = temp.path().join("id_ed25519");
        fs::write(&key, "private").expect("write key");
        fs::write(temp.path().join("id_ed25519.pub"), "public").expect("write pub");

        let provider = KeyFileProvider::new(key.to_str().expect("utf8 path"))
            .with_username("deploy")
            .with_passphrase(Some(Passphrase::new("secret")));

        match provider.resolve().expect("resolve") {
            Credentials::SshKey {
                username,
                private_key,
                public_key,
                passphrase,
            } => {
                assert_eq!(username, "deploy");
                assert_eq!(private_key.as_std_path(), key);
                assert!(public_key.is_some());
                assert_eq!(passphrase.as_ref().map(Passphrase::expose), Some("secret"));
            }
            other => panic!("expected ssh key credentials, got {other:?}"),
        }
    }

    #[test]
    fn missing_key_is_reported() {
        let temp = TempDir::new().expect("tempdir");
        let key = temp.path().join("absent");

        let err = KeyFileProvider::new(key.to_str().expect("utf8 path"))
            .resolve()
            .expect_err("missing key");
        assert!(matches!(err, AuthError::KeyFile { .. }));
        assert!(err.to_string().starts_with("read file"));
    }

    #[test]
    fn directory_is_not_a_key() {
        let temp = TempDir::new().expect("tempdir");
        let err = KeyFileProvider::new(temp.path().to_str().expect("utf8 path"))
            .resolve()
            .expect_err("directory");
        assert!(matches!(err, AuthError::KeyFile { .. }));
    }
}
