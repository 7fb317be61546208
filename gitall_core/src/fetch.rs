use std::cell::Cell;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use git2::{Cred, CredentialType, ErrorClass, ErrorCode, FetchOptions, RemoteCallbacks};
use gitall_auth_api::{Credentials, Passphrase, DEFAULT_USERNAME};
use tracing::debug;

use crate::{Error, Repository, Result};

/// Host named in the remediation hint when the remote URL has none.
pub const FALLBACK_HOST: &str = "github.com";

// libgit2 keeps asking for credentials as long as the callback returns some;
// give up instead of looping on a rejected key.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// Knobs for a single fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSettings {
    /// Abort the transfer once it runs longer than this.
    ///
    /// The deadline is checked from libgit2's progress callbacks, so a remote
    /// that never answers the initial connection is not interrupted.
    pub timeout: Option<Duration>,
}

impl Repository {
    /// Fetch `remote` using its configured refspecs, updating the
    /// remote-tracking branches on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteNotFound`] for an unknown remote,
    /// [`Error::Trust`] when the host key cannot be verified,
    /// [`Error::FetchTimedOut`] when the deadline passes and [`Error::Fetch`]
    /// otherwise. A remote that is already up to date is not an error.
    pub fn fetch(
        &self,
        remote: &str,
        credentials: &Credentials,
        settings: FetchSettings,
    ) -> Result<()> {
        let url = self.remote_url(remote)?;
        let mut handle = self
            .git_repo()
            .find_remote(remote)
            .map_err(|source| Error::Fetch {
                remote: remote.to_string(),
                source,
            })?;

        let deadline = settings.timeout.map(|timeout| Instant::now() + timeout);
        let timed_out = Cell::new(false);
        let keep_going = || {
            let expired = deadline.is_some_and(|deadline| Instant::now() >= deadline);
            if expired {
                timed_out.set(true);
            }
            !expired
        };

        let mut attempts = 0;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, allowed| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("credentials were rejected by the remote"));
            }
            git_credentials(credentials, username_from_url, allowed)
        });
        callbacks.transfer_progress(|_| keep_going());
        callbacks.sideband_progress(|_| keep_going());

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);

        debug!(remote, url = %url, "starting fetch");
        let result = handle.fetch(&[] as &[&str], Some(&mut options), None);
        drop(options);

        match result {
            Ok(()) => Ok(()),
            Err(_) if timed_out.get() => Err(Error::FetchTimedOut {
                remote: remote.to_string(),
                timeout: settings.timeout.unwrap_or_default(),
            }),
            Err(source) => classify_fetch_error(remote, &url, source),
        }
    }
}

fn git_credentials(
    credentials: &Credentials,
    username_from_url: Option<&str>,
    allowed: CredentialType,
) -> std::result::Result<Cred, git2::Error> {
    let username = username_from_url
        .or_else(|| credentials.username())
        .unwrap_or(DEFAULT_USERNAME);

    if allowed.contains(CredentialType::USERNAME) {
        return Cred::username(username);
    }

    match credentials {
        Credentials::SshKey {
            private_key,
            public_key,
            passphrase,
            ..
        } if allowed.contains(CredentialType::SSH_KEY) => Cred::ssh_key(
            username,
            public_key.as_deref().map(Utf8Path::as_std_path),
            private_key.as_std_path(),
            passphrase.as_ref().map(Passphrase::expose),
        ),
        Credentials::SshAgent { .. } if allowed.contains(CredentialType::SSH_KEY) => {
            Cred::ssh_key_from_agent(username)
        }
        _ => Cred::default(),
    }
}

/// Map a libgit2 fetch failure onto the crate taxonomy.
///
/// # Errors
///
/// Returns [`Error::Trust`] for host verification failures and
/// [`Error::Fetch`] for anything else except the benign "already up to date"
/// condition, which yields `Ok(())`.
pub fn classify_fetch_error(remote: &str, url: &str, source: git2::Error) -> Result<()> {
    if is_up_to_date(&source) {
        return Ok(());
    }

    if is_host_verification_failure(&source, url) {
        let host = remote_host(url).unwrap_or_else(|| FALLBACK_HOST.to_string());
        let remediation = format!("ssh-keyscan {host} >> ~/.ssh/known_hosts");
        return Err(Error::Trust {
            host,
            remediation,
            source,
        });
    }

    Err(Error::Fetch {
        remote: remote.to_string(),
        source,
    })
}

fn is_up_to_date(err: &git2::Error) -> bool {
    let message = err.message().to_ascii_lowercase();
    message.contains("already up-to-date") || message.contains("already up to date")
}

fn is_host_verification_failure(err: &git2::Error, url: &str) -> bool {
    // TLS certificate failures share the code but known_hosts cannot fix them.
    if err.code() == ErrorCode::Certificate {
        return err.class() == ErrorClass::Ssh || is_ssh_url(url);
    }
    let message = err.message().to_ascii_lowercase();
    ["knownhosts", "known_hosts", "known hosts", "hostkey", "host key"]
        .iter()
        .any(|needle| message.contains(needle))
}

fn is_ssh_url(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, _)) => ["ssh", "git+ssh", "ssh+git"]
            .iter()
            .any(|ssh| scheme.eq_ignore_ascii_case(ssh)),
        None => remote_host(url).is_some(),
    }
}

/// Host component of a remote URL.
///
/// Understands `scheme://[user@]host[:port]/path` and scp-like
/// `[user@]host:path`. Local paths and `file://` URLs have no host.
#[must_use]
pub fn remote_host(url: &str) -> Option<String> {
    let authority = if let Some((scheme, rest)) = url.split_once("://") {
        if scheme.eq_ignore_ascii_case("file") {
            return None;
        }
        rest.split('/').next().unwrap_or_default()
    } else {
        let (authority, _) = url.split_once(':')?;
        // `C:\repo` or `./dir:name` are paths, not hosts.
        if authority.contains('/') || authority.contains('\\') || authority.len() == 1 {
            return None;
        }
        authority
    };

    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = if let Some(bracketed) = host.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or_default()
    } else {
        host.split(':').next().unwrap_or_default()
    };

    (!host.is_empty()).then(|| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_host_handles_common_url_shapes() {
        let cases = [
            ("git@github.com:owner/repo.git", Some("github.com")),
            ("ssh://git@gitlab.example.org:2222/group/repo.git", Some("gitlab.example.org")),
            ("https://bitbucket.org/team/repo", Some("bitbucket.org")),
            ("ssh://[::1]:22/repo.git", Some("::1")),
            ("example.com:repo.git", Some("example.com")),
            ("/srv/git/repo.git", None),
            ("file:///srv/git/repo.git", None),
            ("../relative/repo", None),
        ];

        for (url, expected) in cases {
            assert_eq!(remote_host(url).as_deref(), expected, "url: {url}");
        }
    }

    #[test]
    fn up_to_date_is_swallowed() {
        let err = git2::Error::from_str("already up-to-date");
        assert!(classify_fetch_error("origin", "git@github.com:o/r.git", err).is_ok());
    }

    #[test]
    fn certificate_failure_becomes_trust_error_with_remediation() {
        let err = git2::Error::new(
            ErrorCode::Certificate,
            ErrorClass::Ssh,
            "invalid or unknown remote ssh hostkey",
        );

        let result = classify_fetch_error("origin", "git@gitlab.example.org:o/r.git", err);
        match result {
            Err(Error::Trust {
                host, remediation, ..
            }) => {
                assert_eq!(host, "gitlab.example.org");
                assert_eq!(
                    remediation,
                    "ssh-keyscan gitlab.example.org >> ~/.ssh/known_hosts"
                );
            }
            other => panic!("expected trust error, got {other:?}"),
        }
    }

    #[test]
    fn tls_certificate_failure_is_a_plain_fetch_error() {
        let err = git2::Error::new(
            ErrorCode::Certificate,
            ErrorClass::Ssl,
            "the SSL certificate is invalid",
        );

        let result = classify_fetch_error("origin", "https://git.example.com/o/r.git", err);
        match result {
            Err(Error::Fetch { remote, source }) => {
                assert_eq!(remote, "origin");
                assert_eq!(source.class(), ErrorClass::Ssl);
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[test]
    fn certificate_failure_on_scp_url_is_a_trust_error() {
        let err = git2::Error::new(
            ErrorCode::Certificate,
            ErrorClass::Callback,
            "user rejected certificate",
        );

        let result = classify_fetch_error("origin", "git@github.com:o/r.git", err);
        assert!(matches!(result, Err(Error::Trust { ref host, .. }) if host == "github.com"));
    }

    #[test]
    fn knownhosts_message_without_host_falls_back() {
        let err = git2::Error::from_str("ssh: handshake failed: knownhosts: key mismatch");
        let message = classify_fetch_error("origin", "/srv/repo.git", err)
            .expect_err("trust error")
            .to_string();

        assert!(message.starts_with("problem with known_hosts entry for 'github.com'"));
        assert!(message.contains("`ssh-keyscan github.com >> ~/.ssh/known_hosts`"));
    }

    #[test]
    fn other_failures_are_fetch_errors() {
        let err = git2::Error::from_str("failed to resolve address");
        let result = classify_fetch_error("upstream", "https://example.com/r.git", err);
        assert!(matches!(result, Err(Error::Fetch { ref remote, .. }) if remote == "upstream"));
    }
}
