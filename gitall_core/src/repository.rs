//! Working-copy access built on top of libgit2.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{ErrorClass, ErrorCode, ReferenceType, Repository as GitRepository, Status, StatusOptions};

use crate::{BranchTipSet, Error, PathChange, Result, WorktreeDiffSummary};

const LOCAL_BRANCH_PREFIX: &str = "refs/heads/";
const REMOTE_BRANCH_PREFIX: &str = "refs/remotes/";

/// Handle to an opened working copy.
pub struct Repository {
    inner: GitRepository,
    root: PathBuf,
}

impl Repository {
    /// Open the working copy rooted at `path`.
    ///
    /// Unlike `git` itself the path is not searched upwards: a directory nested
    /// inside a working copy is not a repository of its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized, is not a git
    /// repository, or is a bare repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let original = path.as_ref();
        let canonical = std::fs::canonicalize(original).map_err(|source| Error::Io {
            path: display_path(original),
            source,
        })?;

        let repo = match GitRepository::open(&canonical) {
            Ok(repo) => repo,
            Err(err)
                if err.class() == ErrorClass::Repository && err.code() == ErrorCode::NotFound =>
            {
                return Err(Error::NotARepository {
                    path: display_path(&canonical),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::BareRepository {
                path: display_path(&canonical),
            })?;

        Ok(Self { inner: repo, root })
    }

    /// Returns the absolute path to the working-copy root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Borrow the underlying libgit2 repository.
    #[must_use]
    pub const fn git_repo(&self) -> &GitRepository {
        &self.inner
    }

    /// Tips of every local branch, keyed by short name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RefRead`] when references cannot be enumerated.
    pub fn local_branch_tips(&self) -> Result<BranchTipSet> {
        self.tips_under(LOCAL_BRANCH_PREFIX)
    }

    /// Tips of the remote-tracking branches of `remote`, keyed by the branch
    /// name with `refs/remotes/<remote>/` stripped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RefRead`] when references cannot be enumerated.
    pub fn remote_tracking_tips(&self, remote: &str) -> Result<BranchTipSet> {
        self.tips_under(&format!("{REMOTE_BRANCH_PREFIX}{remote}/"))
    }

    /// Staged and unstaged changes of the working tree, untracked files
    /// included and ignored files excluded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StatusRead`] when libgit2 cannot compute the status.
    pub fn worktree_diff(&self) -> Result<WorktreeDiffSummary> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .include_ignored(false)
            .recurse_untracked_dirs(true)
            .renames_head_to_index(true)
            .renames_index_to_workdir(true);

        let statuses = self
            .inner
            .statuses(Some(&mut opts))
            .map_err(|source| Error::StatusRead { source })?;

        let staged = staged_flags();
        let unstaged = unstaged_flags();
        let changes = statuses
            .iter()
            .map(|entry| {
                let status = entry.status();
                PathChange::new(
                    String::from_utf8_lossy(entry.path_bytes()),
                    status.intersects(staged),
                    status.intersects(unstaged),
                )
            })
            .filter(|change| !change.is_clean())
            .collect();

        Ok(WorktreeDiffSummary::new(changes))
    }

    /// Name of the checked-out branch; `None` for a detached HEAD.
    ///
    /// An unborn branch (no commits yet) is reported by the name HEAD points at.
    ///
    /// # Errors
    ///
    /// Propagates libgit2 failures other than a missing HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.inner.head() {
            Ok(head) => head,
            Err(err)
                if matches!(
                    (err.class(), err.code()),
                    (
                        ErrorClass::Reference,
                        ErrorCode::NotFound | ErrorCode::UnbornBranch
                    )
                ) =>
            {
                return Ok(self.unborn_branch())
            }
            Err(err) => return Err(Error::from(err)),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(str::to_owned))
        } else {
            Ok(None)
        }
    }

    /// First URL configured for `remote`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteNotFound`] when the remote is missing or has no
    /// valid URL.
    pub fn remote_url(&self, remote: &str) -> Result<String> {
        let found = match self.inner.find_remote(remote) {
            Ok(found) => found,
            Err(err) if err.code() == ErrorCode::NotFound => {
                return Err(Error::RemoteNotFound {
                    remote: remote.to_string(),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        found
            .url()
            .map(str::to_owned)
            .ok_or_else(|| Error::RemoteNotFound {
                remote: remote.to_string(),
            })
    }

    fn unborn_branch(&self) -> Option<String> {
        let head = self.inner.find_reference("HEAD").ok()?;
        head.symbolic_target()?
            .strip_prefix(LOCAL_BRANCH_PREFIX)
            .map(str::to_owned)
    }

    fn tips_under(&self, prefix: &str) -> Result<BranchTipSet> {
        let references = self
            .inner
            .references()
            .map_err(|source| Error::RefRead { source })?;

        let mut tips = BranchTipSet::new();
        for reference in references {
            let reference = reference.map_err(|source| Error::RefRead { source })?;
            // Symbolic refs such as origin/HEAD are aliases, not branches.
            if reference.kind() != Some(ReferenceType::Direct) {
                continue;
            }
            let (Some(name), Some(oid)) = (reference.name(), reference.target()) else {
                continue;
            };
            if let Some(branch) = name.strip_prefix(prefix) {
                tips.insert(branch, oid.to_string());
            }
        }

        Ok(tips)
    }
}

fn staged_flags() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
}

fn unstaged_flags() -> Status {
    Status::WT_NEW
        | Status::WT_MODIFIED
        | Status::WT_DELETED
        | Status::WT_RENAMED
        | Status::WT_TYPECHANGE
        | Status::CONFLICTED
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
