use std::time::Duration;

use gitall_auth_api::Credentials;

use crate::{BranchTipSet, FetchSettings, Repository, Result, WorktreeDiffSummary};

/// Capability the batch needs from a version-control backend.
///
/// Handles never leave the thread that opened them, so backends whose
/// repository objects are not `Send` can still be driven concurrently.
pub trait RepositoryAccessor: Send + Sync {
    /// Opened working copy.
    type Handle;

    /// Open the working copy at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the path is not a usable working copy.
    fn open(&self, path: &str) -> Result<Self::Handle>;

    /// Fetch `remote`, updating its remote-tracking branches.
    ///
    /// # Errors
    ///
    /// Fails on transport, trust or authentication problems. A remote that is
    /// already up to date is not a failure.
    fn fetch(&self, handle: &Self::Handle, remote: &str, credentials: &Credentials) -> Result<()>;

    /// Local branch tips keyed by short name.
    ///
    /// # Errors
    ///
    /// Fails when references cannot be read.
    fn local_branch_tips(&self, handle: &Self::Handle) -> Result<BranchTipSet>;

    /// Remote-tracking tips of `remote`, keyed like local branches.
    ///
    /// # Errors
    ///
    /// Fails when references cannot be read.
    fn remote_tracking_tips(&self, handle: &Self::Handle, remote: &str) -> Result<BranchTipSet>;

    /// Staged and unstaged working-tree changes.
    ///
    /// # Errors
    ///
    /// Fails when the status cannot be computed.
    fn worktree_diff(&self, handle: &Self::Handle) -> Result<WorktreeDiffSummary>;
}

/// [`RepositoryAccessor`] backed by libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitAccessor {
    settings: FetchSettings,
}

impl GitAccessor {
    /// Accessor with no fetch deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort fetches that run longer than `timeout`.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Settings applied to every fetch.
    #[must_use]
    pub const fn fetch_settings(&self) -> FetchSettings {
        self.settings
    }
}

impl RepositoryAccessor for GitAccessor {
    type Handle = Repository;

    fn open(&self, path: &str) -> Result<Repository> {
        Repository::open(path)
    }

    fn fetch(&self, handle: &Repository, remote: &str, credentials: &Credentials) -> Result<()> {
        handle.fetch(remote, credentials, self.settings)
    }

    fn local_branch_tips(&self, handle: &Repository) -> Result<BranchTipSet> {
        handle.local_branch_tips()
    }

    fn remote_tracking_tips(&self, handle: &Repository, remote: &str) -> Result<BranchTipSet> {
        handle.remote_tracking_tips(remote)
    }

    fn worktree_diff(&self, handle: &Repository) -> Result<WorktreeDiffSummary> {
        handle.worktree_diff()
    }
}
