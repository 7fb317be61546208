use serde::{Deserialize, Serialize};

/// Change flags for a single path in the working tree or index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChange {
    /// Path relative to the working-copy root.
    pub path: String,
    /// The index differs from `HEAD` for this path.
    pub staged: bool,
    /// The working tree differs from the index, or the path is untracked.
    pub unstaged: bool,
}

impl PathChange {
    /// Construct a change entry.
    #[must_use]
    pub fn new(path: impl Into<String>, staged: bool, unstaged: bool) -> Self {
        Self {
            path: path.into(),
            staged,
            unstaged,
        }
    }

    /// Whether neither flag is set.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !self.staged && !self.unstaged
    }
}

/// Live working-tree and staging status of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeDiffSummary {
    /// Touched paths in the order the status walk reported them.
    #[serde(default)]
    pub changes: Vec<PathChange>,
}

impl WorktreeDiffSummary {
    /// Build a summary from a list of path changes.
    #[must_use]
    pub fn new(changes: Vec<PathChange>) -> Self {
        Self { changes }
    }

    /// A summary with no touched paths.
    #[must_use]
    pub fn clean() -> Self {
        Self::default()
    }

    /// Whether any path carries a staged or unstaged change.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.changes.iter().any(|change| !change.is_clean())
    }

    /// Whether any path carries a staged change.
    #[must_use]
    pub fn has_staged(&self) -> bool {
        self.first_staged().is_some()
    }

    /// Whether any path carries an unstaged change.
    #[must_use]
    pub fn has_unstaged(&self) -> bool {
        self.first_unstaged().is_some()
    }

    /// First path with a staged change.
    #[must_use]
    pub fn first_staged(&self) -> Option<&PathChange> {
        self.changes.iter().find(|change| change.staged)
    }

    /// First path with an unstaged change.
    #[must_use]
    pub fn first_unstaged(&self) -> Option<&PathChange> {
        self.changes.iter().find(|change| change.unstaged)
    }
}
