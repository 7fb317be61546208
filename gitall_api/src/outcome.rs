use std::fmt;

use serde::{Deserialize, Serialize};

/// The four mutually exclusive classifications of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The repository could not be opened, fetched, or inspected.
    RepoError,
    /// A local branch is missing on the remote or points elsewhere.
    NeedsSync,
    /// The working tree or index has uncommitted changes.
    NeedsCommit,
    /// Every branch matches the remote and the working tree is clean.
    InSync,
}

impl OutcomeKind {
    /// Order in which buckets are presented to the user.
    pub const DISPLAY_ORDER: [Self; 4] = [
        Self::RepoError,
        Self::InSync,
        Self::NeedsCommit,
        Self::NeedsSync,
    ];

    /// Stable machine-readable key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::RepoError => "repo_error",
            Self::NeedsSync => "needs_sync",
            Self::NeedsCommit => "needs_commit",
            Self::InSync => "in_sync",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classification of a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    /// Bucket the outcome belongs to.
    pub kind: OutcomeKind,
    /// Path exactly as it was requested.
    pub path: String,
    /// Branch the outcome refers to, for branch-specific outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Human-readable explanation.
    pub detail: String,
    /// Further findings hidden by first-match classification. Only filled in
    /// exhaustive mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ReconciliationOutcome {
    /// Outcome for a repository that could not be processed.
    #[must_use]
    pub fn repo_error(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(OutcomeKind::RepoError, path, None, detail)
    }

    /// Outcome for a branch that diverges from the remote.
    #[must_use]
    pub fn needs_sync(
        path: impl Into<String>,
        branch: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(OutcomeKind::NeedsSync, path, Some(branch.into()), detail)
    }

    /// Outcome for a repository with uncommitted changes.
    #[must_use]
    pub fn needs_commit(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(OutcomeKind::NeedsCommit, path, None, detail)
    }

    /// Outcome for a fully synchronized repository.
    #[must_use]
    pub fn in_sync(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(OutcomeKind::InSync, path, None, detail)
    }

    fn new(
        kind: OutcomeKind,
        path: impl Into<String>,
        branch: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            branch,
            detail: detail.into(),
            notes: Vec::new(),
        }
    }

    /// Attach secondary findings.
    #[must_use]
    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Display identifier: the path, followed by the branch when present.
    #[must_use]
    pub fn identifier(&self) -> String {
        match &self.branch {
            Some(branch) => format!("{} {branch}", self.path),
            None => self.path.clone(),
        }
    }
}

/// Four-bucket result of one batch run.
///
/// Buckets are append-only and keep the relative order in which outcomes were
/// pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Repositories that could not be processed.
    #[serde(default)]
    pub errors: Vec<ReconciliationOutcome>,
    /// Repositories with nothing to do.
    #[serde(default)]
    pub in_sync: Vec<ReconciliationOutcome>,
    /// Repositories with uncommitted changes.
    #[serde(default)]
    pub needs_commit: Vec<ReconciliationOutcome>,
    /// Repositories with a branch out of sync.
    #[serde(default)]
    pub needs_sync: Vec<ReconciliationOutcome>,
}

impl ReconciliationReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to the bucket matching its kind.
    pub fn push(&mut self, outcome: ReconciliationOutcome) {
        self.bucket_mut(outcome.kind).push(outcome);
    }

    /// Outcomes of one bucket, in insertion order.
    #[must_use]
    pub fn bucket(&self, kind: OutcomeKind) -> &[ReconciliationOutcome] {
        match kind {
            OutcomeKind::RepoError => &self.errors,
            OutcomeKind::NeedsSync => &self.needs_sync,
            OutcomeKind::NeedsCommit => &self.needs_commit,
            OutcomeKind::InSync => &self.in_sync,
        }
    }

    fn bucket_mut(&mut self, kind: OutcomeKind) -> &mut Vec<ReconciliationOutcome> {
        match kind {
            OutcomeKind::RepoError => &mut self.errors,
            OutcomeKind::NeedsSync => &mut self.needs_sync,
            OutcomeKind::NeedsCommit => &mut self.needs_commit,
            OutcomeKind::InSync => &mut self.in_sync,
        }
    }

    /// Total number of outcomes across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len() + self.in_sync.len() + self.needs_commit.len() + self.needs_sync.len()
    }

    /// Whether the report holds no outcomes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate every outcome, bucket by bucket in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ReconciliationOutcome> + '_ {
        OutcomeKind::DISPLAY_ORDER
            .into_iter()
            .flat_map(move |kind| self.bucket(kind).iter())
    }
}

impl FromIterator<ReconciliationOutcome> for ReconciliationReport {
    fn from_iter<I: IntoIterator<Item = ReconciliationOutcome>>(iter: I) -> Self {
        let mut report = Self::new();
        for outcome in iter {
            report.push(outcome);
        }
        report
    }
}
