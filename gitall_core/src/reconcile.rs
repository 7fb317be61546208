//! Classification of one repository from its branch tips and worktree status.
//!
//! Evaluation order is fixed: error, branch divergence, uncommitted changes,
//! in sync. The first satisfied state wins, and within a state the first
//! finding wins (first divergent branch by name, staged before unstaged).

use std::fmt;

use gitall_api::{BranchTipSet, ReconciliationOutcome, WorktreeDiffSummary};

use crate::Error;

/// Detail for a clean, synchronized repository.
pub const IN_SYNC: &str = "in sync";
/// Detail for a repository with changes in the index.
pub const STAGED_CHANGES: &str = "has staged changes";
/// Detail for a repository with working-tree changes or untracked files.
pub const UNSTAGED_CHANGES: &str = "has unstaged changes";

/// How much a single classification reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Stop at the first finding.
    #[default]
    FirstMatch,
    /// Classify like [`ReconcileMode::FirstMatch`] but record every further
    /// finding as a note on the outcome.
    Exhaustive,
}

/// A local branch that does not match its remote-tracking counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence<'a> {
    /// No remote-tracking branch of the same name.
    MissingOnRemote {
        /// Local branch name.
        branch: &'a str,
    },
    /// Both exist but point at different revisions.
    TipMismatch {
        /// Branch name.
        branch: &'a str,
        /// Local tip.
        local: &'a str,
        /// Remote-tracking tip.
        remote: &'a str,
    },
}

impl<'a> Divergence<'a> {
    /// Branch the divergence refers to.
    #[must_use]
    pub const fn branch(&self) -> &'a str {
        match self {
            Self::MissingOnRemote { branch } | Self::TipMismatch { branch, .. } => branch,
        }
    }

    /// Human-readable description relative to `remote`.
    #[must_use]
    pub fn detail(&self, remote: &str) -> String {
        match self {
            Self::MissingOnRemote { .. } => format!("has no {remote} branch"),
            Self::TipMismatch { .. } => format!("out of sync with {remote}"),
        }
    }
}

/// Every local branch that diverges from `remote_tips`, ordered by name.
pub fn divergences<'a>(
    local: &'a BranchTipSet,
    remote_tips: &'a BranchTipSet,
) -> impl Iterator<Item = Divergence<'a>> + 'a {
    local
        .iter()
        .filter_map(move |(branch, local_tip)| match remote_tips.get(branch) {
            None => Some(Divergence::MissingOnRemote { branch }),
            Some(remote_tip) if remote_tip != local_tip => Some(Divergence::TipMismatch {
                branch,
                local: local_tip,
                remote: remote_tip,
            }),
            Some(_) => None,
        })
}

/// Details for every kind of uncommitted change present, staged first.
#[must_use]
pub fn worktree_findings(diff: &WorktreeDiffSummary) -> Vec<&'static str> {
    let mut findings = Vec::new();
    if diff.has_staged() {
        findings.push(STAGED_CHANGES);
    }
    if diff.has_unstaged() {
        findings.push(UNSTAGED_CHANGES);
    }
    findings
}

/// Classifies repositories against one remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefReconciler {
    remote: String,
    mode: ReconcileMode,
}

impl RefReconciler {
    /// Reconciler comparing against `remote` in first-match mode.
    #[must_use]
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            mode: ReconcileMode::default(),
        }
    }

    /// Change the reporting mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ReconcileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Remote branches are compared against.
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Reporting mode.
    #[must_use]
    pub const fn mode(&self) -> ReconcileMode {
        self.mode
    }

    /// Outcome for a repository whose processing failed.
    #[must_use]
    pub fn error(&self, path: &str, error: &Error) -> ReconciliationOutcome {
        ReconciliationOutcome::repo_error(path, error.to_string())
    }

    /// `NeedsSync` outcome for the first divergent branch, if any.
    ///
    /// In exhaustive mode the remaining divergent branches become notes.
    #[must_use]
    pub fn classify_branches(
        &self,
        path: &str,
        local: &BranchTipSet,
        remote_tips: &BranchTipSet,
    ) -> Option<ReconciliationOutcome> {
        let mut found = divergences(local, remote_tips);
        let first = found.next()?;
        let outcome =
            ReconciliationOutcome::needs_sync(path, first.branch(), first.detail(&self.remote));

        match self.mode {
            ReconcileMode::FirstMatch => Some(outcome),
            ReconcileMode::Exhaustive => {
                let notes = found
                    .map(|divergence| {
                        format!("{} {}", divergence.branch(), divergence.detail(&self.remote))
                    })
                    .collect();
                Some(outcome.with_notes(notes))
            }
        }
    }

    /// `NeedsCommit` or `InSync` for a repository whose branches all match.
    #[must_use]
    pub fn classify_worktree(&self, path: &str, diff: &WorktreeDiffSummary) -> ReconciliationOutcome {
        let findings = worktree_findings(diff);
        let Some((first, rest)) = findings.split_first() else {
            return ReconciliationOutcome::in_sync(path, IN_SYNC);
        };

        let outcome = ReconciliationOutcome::needs_commit(path, *first);
        match self.mode {
            ReconcileMode::FirstMatch => outcome,
            ReconcileMode::Exhaustive => {
                outcome.with_notes(rest.iter().map(ToString::to_string).collect())
            }
        }
    }

    /// Classify a repository from already collected inputs.
    #[must_use]
    pub fn reconcile(
        &self,
        path: &str,
        local: &BranchTipSet,
        remote_tips: &BranchTipSet,
        diff: &WorktreeDiffSummary,
    ) -> ReconciliationOutcome {
        match self.classify_branches(path, local, remote_tips) {
            Some(outcome) if self.mode == ReconcileMode::Exhaustive => {
                let mut notes = outcome.notes.clone();
                notes.extend(worktree_findings(diff).into_iter().map(str::to_owned));
                outcome.with_notes(notes)
            }
            Some(outcome) => outcome,
            None => self.classify_worktree(path, diff),
        }
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstMatch => f.write_str("first-match"),
            Self::Exhaustive => f.write_str("exhaustive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitall_api::{OutcomeKind, PathChange};

    fn tips(pairs: &[(&str, &str)]) -> BranchTipSet {
        pairs.iter().copied().collect()
    }

    fn dirty(staged: bool, unstaged: bool) -> WorktreeDiffSummary {
        WorktreeDiffSummary::new(vec![PathChange::new("file.txt", staged, unstaged)])
    }

    #[test]
    fn aligned_and_clean_is_in_sync() {
        let local = tips(&[("main", "a1"), ("dev", "b2")]);
        let outcome = RefReconciler::new("origin").reconcile(
            "repo",
            &local,
            &local.clone(),
            &WorktreeDiffSummary::clean(),
        );

        assert_eq!(outcome.kind, OutcomeKind::InSync);
        assert_eq!(outcome.detail, IN_SYNC);
        assert!(outcome.branch.is_none());
    }

    #[test]
    fn missing_remote_branch_needs_sync_even_when_dirty() {
        let local = tips(&[("main", "a1"), ("feature/x", "c3")]);
        let remote = tips(&[("main", "a1")]);

        let outcome =
            RefReconciler::new("origin").reconcile("repoB", &local, &remote, &dirty(true, true));

        assert_eq!(outcome.kind, OutcomeKind::NeedsSync);
        assert_eq!(outcome.identifier(), "repoB feature/x");
        assert_eq!(outcome.detail, "has no origin branch");
        assert!(outcome.notes.is_empty());
    }

    #[test]
    fn differing_tip_is_out_of_sync() {
        let local = tips(&[("main", "a1")]);
        let remote = tips(&[("main", "ff")]);

        let outcome = RefReconciler::new("upstream")
            .classify_branches("repo", &local, &remote)
            .expect("divergence");

        assert_eq!(outcome.detail, "out of sync with upstream");
    }

    #[test]
    fn only_first_divergent_branch_is_reported() {
        let local = tips(&[("b-second", "2"), ("a-first", "1")]);
        let remote = BranchTipSet::new();

        let outcome = RefReconciler::new("origin")
            .classify_branches("repo", &local, &remote)
            .expect("divergence");

        assert_eq!(outcome.branch.as_deref(), Some("a-first"));
        assert!(outcome.notes.is_empty());
    }

    #[test]
    fn remote_only_branches_are_ignored() {
        let local = tips(&[("main", "a1")]);
        let remote = tips(&[("main", "a1"), ("release", "r9")]);

        assert!(RefReconciler::new("origin")
            .classify_branches("repo", &local, &remote)
            .is_none());
    }

    #[test]
    fn staged_is_reported_over_unstaged() {
        let reconciler = RefReconciler::new("origin");

        let both = reconciler.classify_worktree("repo", &dirty(true, true));
        assert_eq!(both.kind, OutcomeKind::NeedsCommit);
        assert_eq!(both.detail, STAGED_CHANGES);

        let unstaged = reconciler.classify_worktree("repo", &dirty(false, true));
        assert_eq!(unstaged.detail, UNSTAGED_CHANGES);
    }

    #[test]
    fn staged_wins_even_when_listed_after_unstaged_path() {
        let diff = WorktreeDiffSummary::new(vec![
            PathChange::new("edited.txt", false, true),
            PathChange::new("added.txt", true, false),
        ]);

        let outcome = RefReconciler::new("origin").classify_worktree("repo", &diff);
        assert_eq!(outcome.detail, STAGED_CHANGES);
    }

    #[test]
    fn exhaustive_mode_collects_hidden_findings() {
        let local = tips(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let remote = tips(&[("b", "9"), ("c", "3")]);

        let outcome = RefReconciler::new("origin")
            .with_mode(ReconcileMode::Exhaustive)
            .reconcile("repo", &local, &remote, &dirty(false, true));

        assert_eq!(outcome.kind, OutcomeKind::NeedsSync);
        assert_eq!(outcome.branch.as_deref(), Some("a"));
        assert_eq!(
            outcome.notes,
            vec![
                "b out of sync with origin".to_string(),
                UNSTAGED_CHANGES.to_string()
            ]
        );
    }

    #[test]
    fn exhaustive_worktree_notes_unstaged_behind_staged() {
        let outcome = RefReconciler::new("origin")
            .with_mode(ReconcileMode::Exhaustive)
            .classify_worktree("repo", &dirty(true, true));

        assert_eq!(outcome.detail, STAGED_CHANGES);
        assert_eq!(outcome.notes, vec![UNSTAGED_CHANGES.to_string()]);
    }

    #[test]
    fn error_outcome_carries_message() {
        let err = Error::RemoteNotFound {
            remote: "origin".into(),
        };
        let outcome = RefReconciler::new("origin").error("repo", &err);

        assert_eq!(outcome.kind, OutcomeKind::RepoError);
        assert_eq!(outcome.detail, "remote 'origin' is not configured");
    }
}
