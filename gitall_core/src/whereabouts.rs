use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Repository, Result};

/// Checked-out branch and remote of one working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Whereabouts {
    /// The working copy was opened.
    Located {
        /// Path as requested.
        path: String,
        /// Checked-out branch; `None` when HEAD is detached.
        branch: Option<String>,
        /// First URL of the remote.
        remote_url: String,
    },
    /// The working copy could not be inspected.
    Failed {
        /// Path as requested.
        path: String,
        /// Error message.
        detail: String,
    },
}

impl Whereabouts {
    /// Path as requested.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Located { path, .. } | Self::Failed { path, .. } => path,
        }
    }
}

/// Look up the branch and remote URL of every path, sorted by path.
///
/// Does not touch the network.
pub fn locate<S: AsRef<str>>(paths: &[S], remote: &str) -> Vec<Whereabouts> {
    let mut entries: Vec<Whereabouts> = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            match locate_one(path, remote) {
                Ok((branch, remote_url)) => Whereabouts::Located {
                    path: path.to_string(),
                    branch,
                    remote_url,
                },
                Err(err) => {
                    debug!(repository = path, error = %err, "could not locate");
                    Whereabouts::Failed {
                        path: path.to_string(),
                        detail: err.to_string(),
                    }
                }
            }
        })
        .collect();

    entries.sort_by(|left, right| left.path().cmp(right.path()));
    entries
}

fn locate_one(path: &str, remote: &str) -> Result<(Option<String>, String)> {
    let repository = Repository::open(path)?;
    let remote_url = repository.remote_url(remote)?;
    let branch = repository.current_branch()?;
    Ok((branch, remote_url))
}
