use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use gitall_api::{ReconciliationOutcome, ReconciliationReport};
use gitall_auth_api::Credentials;
use tracing::{debug, info, warn};

use crate::{ReconcileMode, RefReconciler, RepositoryAccessor, Result};

/// Drives a [`RepositoryAccessor`] over a list of paths and collects the
/// four-bucket report.
///
/// Every path yields exactly one outcome. A failure while processing one
/// path becomes a `RepoError` for that path and never affects the others.
#[derive(Debug, Clone)]
pub struct BatchClassifier<A> {
    accessor: A,
    mode: ReconcileMode,
    jobs: usize,
}

impl<A: RepositoryAccessor> BatchClassifier<A> {
    /// Sequential classifier in first-match mode.
    #[must_use]
    pub const fn new(accessor: A) -> Self {
        Self {
            accessor,
            mode: ReconcileMode::FirstMatch,
            jobs: 1,
        }
    }

    /// Change the reporting mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ReconcileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Process up to `jobs` repositories at once. Zero is treated as one.
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Borrow the accessor.
    #[must_use]
    pub const fn accessor(&self) -> &A {
        &self.accessor
    }

    /// Classify every path against `remote`.
    ///
    /// Outcomes keep the relative order of `paths` within each bucket,
    /// whatever the number of jobs.
    pub fn classify<S>(
        &self,
        paths: &[S],
        remote: &str,
        credentials: &Credentials,
    ) -> ReconciliationReport
    where
        S: AsRef<str> + Sync,
    {
        let reconciler = RefReconciler::new(remote).with_mode(self.mode);
        let workers = self.jobs.min(paths.len());
        debug!(repositories = paths.len(), workers, mode = %self.mode, "classifying");

        if workers <= 1 {
            return paths
                .iter()
                .map(|path| self.classify_one(path.as_ref(), &reconciler, credentials))
                .collect();
        }

        self.classify_parallel(paths, workers, &reconciler, credentials)
            .into_iter()
            .collect()
    }

    /// Classify a single path, turning any failure into a `RepoError`.
    pub fn classify_one(
        &self,
        path: &str,
        reconciler: &RefReconciler,
        credentials: &Credentials,
    ) -> ReconciliationOutcome {
        match self.try_classify(path, reconciler, credentials) {
            Ok(outcome) => {
                debug!(repository = path, kind = %outcome.kind, "classified");
                outcome
            }
            Err(err) => {
                warn!(repository = path, error = %err, "repository failed");
                reconciler.error(path, &err)
            }
        }
    }

    fn try_classify(
        &self,
        path: &str,
        reconciler: &RefReconciler,
        credentials: &Credentials,
    ) -> Result<ReconciliationOutcome> {
        let remote = reconciler.remote();
        let handle = self.accessor.open(path)?;

        info!(repository = path, remote, "fetching");
        self.accessor.fetch(&handle, remote, credentials)?;

        let local = self.accessor.local_branch_tips(&handle)?;
        let tracking = self.accessor.remote_tracking_tips(&handle, remote)?;

        if let Some(mut outcome) = reconciler.classify_branches(path, &local, &tracking) {
            if reconciler.mode() == ReconcileMode::Exhaustive {
                match self.accessor.worktree_diff(&handle) {
                    Ok(diff) => outcome.notes.extend(
                        crate::reconcile::worktree_findings(&diff)
                            .into_iter()
                            .map(str::to_owned),
                    ),
                    Err(err) => outcome.notes.push(err.to_string()),
                }
            }
            return Ok(outcome);
        }

        let diff = self.accessor.worktree_diff(&handle)?;
        Ok(reconciler.classify_worktree(path, &diff))
    }

    fn classify_parallel<S>(
        &self,
        paths: &[S],
        workers: usize,
        reconciler: &RefReconciler,
        credentials: &Credentials,
    ) -> Vec<ReconciliationOutcome>
    where
        S: AsRef<str> + Sync,
    {
        let next = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel();

        thread::scope(|scope| {
            for _ in 0..workers {
                let sender = sender.clone();
                let next = &next;
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(path) = paths.get(index) else {
                        break;
                    };
                    let outcome = self.classify_one(path.as_ref(), reconciler, credentials);
                    if sender.send((index, outcome)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(sender);

        let mut slots: Vec<Option<ReconciliationOutcome>> = vec![None; paths.len()];
        for (index, outcome) in receiver {
            slots[index] = Some(outcome);
        }
        slots.into_iter().flatten().collect()
    }
}
