//! Reconciliation engine answering "which of these repositories need
//! attention, and why?".
//!
//! The crate is layered around three responsibilities:
//! - repository access (open, fetch, branch tips, worktree status)
//! - per-repository classification against the remote
//! - batch processing with per-repository fault isolation

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

use std::time::Duration;

/// Abstract repository capability and its libgit2 implementation.
pub mod accessor;
/// Batch driver accumulating the four-bucket report.
pub mod batch;
/// Authenticated fetch and fetch error remapping.
pub mod fetch;
/// Branch and worktree classification.
pub mod reconcile;
/// Text and JSON presentation of reports.
pub mod render;
/// Working-copy handle built on top of libgit2.
pub mod repository;
/// Current branch and remote URL lookup across repositories.
pub mod whereabouts;

pub use accessor::{GitAccessor, RepositoryAccessor};
pub use batch::BatchClassifier;
pub use fetch::FetchSettings;
pub use gitall_api::{
    BranchTipSet, OutcomeKind, PathChange, ReconciliationOutcome, ReconciliationReport,
    WorktreeDiffSummary,
};
pub use gitall_auth_api::Credentials;
pub use reconcile::{Divergence, ReconcileMode, RefReconciler};
pub use repository::Repository;
pub use whereabouts::Whereabouts;

/// Remote compared against when none is configured.
pub const DEFAULT_REMOTE: &str = "origin";

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while accessing a single repository.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error.
        #[from]
        source: git2::Error,
    },
    /// Provided path does not correspond to a git working copy.
    #[error("path does not reference a git repository: {path}")]
    NotARepository {
        /// Path that failed to open.
        path: String,
    },
    /// Bare repositories have no working tree to inspect.
    #[error("repository at {path} is bare and unsupported")]
    BareRepository {
        /// Path of the repository lacking a working tree.
        path: String,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
    /// The requested remote is not configured.
    #[error("remote '{remote}' is not configured")]
    RemoteNotFound {
        /// Remote name.
        remote: String,
    },
    /// The remote host key is unknown or does not match `known_hosts`.
    #[error(
        "problem with known_hosts entry for '{host}'. try running `{remediation}` on your cli: {source}"
    )]
    Trust {
        /// Host the remote URL points at.
        host: String,
        /// Command registering the host key.
        remediation: String,
        /// Transport error reported by libgit2.
        source: git2::Error,
    },
    /// Fetching the remote failed.
    #[error("could not fetch {remote}: {source}")]
    Fetch {
        /// Remote name.
        remote: String,
        /// Transport error reported by libgit2.
        source: git2::Error,
    },
    /// Fetching the remote exceeded the configured deadline.
    #[error("fetching {remote} timed out after {timeout:?}")]
    FetchTimedOut {
        /// Remote name.
        remote: String,
        /// Configured deadline.
        timeout: Duration,
    },
    /// Branch references could not be read.
    #[error("could not read references: {source}")]
    RefRead {
        /// Original libgit2 error.
        source: git2::Error,
    },
    /// Working-tree status could not be read.
    #[error("could not read worktree status: {source}")]
    StatusRead {
        /// Original libgit2 error.
        source: git2::Error,
    },
}
