//! Process-wide job table.
//!
//! Single source of truth for "what jobs exist and in what state",
//! scoped to the process lifetime (no persistence). One
//! [`parking_lot::Mutex`] guards the map plus an insertion-order list,
//! so every operation is atomic with respect to the others; nothing is
//! awaited while the lock is held.
//!
//! Terminal results are held in the entry until one lookup (or a cancel
//! arriving after completion) consumes them, then the entry is removed.
//! Cancellation is fire and forget: the entry is removed immediately
//! and the underlying task is only asked to stop. If its work finishes
//! anyway, [`JobRegistry::complete`] finds nothing to update and logs an
//! orphaned completion.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vox_core::JobId;

use crate::errors::JobError;
use crate::types::{CancelOutcome, JobOutcome, JobState, JobView};

/// Handle to a running background job.
#[derive(Clone, Debug)]
pub struct JobHandle {
    token: CancellationToken,
}

impl JobHandle {
    /// Wrap a cancellation token observed by the executing task.
    #[must_use]
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Ask the underlying task to stop at its next suspension point.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

#[derive(Debug)]
struct JobEntry {
    state: JobState,
    outcome: Option<JobOutcome>,
    handle: Option<JobHandle>,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, JobEntry>,
    order: Vec<JobId>,
}

/// Concurrency-safe mapping of job id → live state/handle.
#[derive(Default)]
pub struct JobRegistry {
    inner: Mutex<Inner>,
}

impl JobRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a job, allocating an id unless the caller supplied one.
    ///
    /// A caller-supplied id that collides with a live job is rejected
    /// with [`JobError::AlreadyExists`].
    pub fn admit(&self, requested: Option<JobId>) -> Result<JobId, JobError> {
        let id = requested.unwrap_or_default();
        let mut inner = self.inner.lock();
        if inner.jobs.contains_key(&id) {
            return Err(JobError::AlreadyExists(id));
        }
        let _ = inner.jobs.insert(
            id.clone(),
            JobEntry {
                state: JobState::Queued,
                outcome: None,
                handle: None,
            },
        );
        inner.order.push(id.clone());
        Ok(id)
    }

    /// Associate a cancellation handle with an admitted job (async path).
    ///
    /// A no-op for unknown or already-terminal entries, so a fast
    /// failure racing the attach cannot resurrect a finished job.
    pub fn attach_handle(&self, id: &JobId, handle: JobHandle) {
        let mut inner = self.inner.lock();
        match inner.jobs.get_mut(id) {
            Some(entry) if !entry.state.is_terminal() => entry.handle = Some(handle),
            Some(_) => warn!(task_id = %id, "ignoring handle attach on finished job"),
            None => warn!(task_id = %id, "ignoring handle attach on unknown job"),
        }
    }

    /// Move an admitted job to `Running`.
    pub fn mark_running(&self, id: &JobId) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.jobs.get_mut(id) {
            if entry.state == JobState::Queued {
                entry.state = JobState::Running;
            }
        }
    }

    /// Current view of a job.
    ///
    /// Returns [`JobView::Processing`] while the job is live. A terminal
    /// entry is removed and its outcome returned — the result is consumed
    /// by the poll.
    pub fn lookup(&self, id: &JobId) -> Result<JobView, JobError> {
        let mut inner = self.inner.lock();
        let entry = inner
            .jobs
            .get(id)
            .ok_or_else(|| JobError::NotFound(id.clone()))?;
        if entry.outcome.is_some() {
            let entry = Self::take(&mut inner, id);
            // outcome presence was just checked under the same lock
            match entry.and_then(|e| e.outcome) {
                Some(outcome) => Ok(JobView::Finished(outcome)),
                None => Err(JobError::NotFound(id.clone())),
            }
        } else {
            Ok(JobView::Processing)
        }
    }

    /// Record a terminal outcome. First writer wins.
    ///
    /// Returns `false` (after logging) when the job is no longer tracked
    /// — it was cancelled and this is orphaned work finishing late — or
    /// when a terminal outcome was already recorded.
    pub fn complete(&self, id: &JobId, outcome: JobOutcome) -> bool {
        let mut inner = self.inner.lock();
        match inner.jobs.get_mut(id) {
            None => {
                info!(task_id = %id, state = ?outcome.state(), "orphaned completion: job no longer tracked");
                false
            }
            Some(entry) if entry.state.is_terminal() => {
                warn!(task_id = %id, "duplicate completion ignored");
                false
            }
            Some(entry) => {
                entry.state = outcome.state();
                entry.outcome = Some(outcome);
                entry.handle = None;
                true
            }
        }
    }

    /// Drop a job outright (synchronous path: the caller already holds
    /// the result).
    pub fn remove(&self, id: &JobId) {
        let mut inner = self.inner.lock();
        let _ = Self::take(&mut inner, id);
    }

    /// Request cancellation of a live background job.
    ///
    /// The entry is removed from the live set immediately; the registry
    /// does not wait for the task to observe the cancellation.
    pub fn cancel(&self, id: &JobId) -> Result<CancelOutcome, JobError> {
        let mut inner = self.inner.lock();
        let entry = inner
            .jobs
            .get(id)
            .ok_or_else(|| JobError::NotFound(id.clone()))?;

        if entry.outcome.is_some() {
            let taken = Self::take(&mut inner, id).and_then(|e| e.outcome);
            return match taken {
                Some(outcome) => Ok(CancelOutcome::AlreadyFinished(outcome)),
                None => Err(JobError::NotFound(id.clone())),
            };
        }
        if entry.handle.is_none() {
            return Err(JobError::NotCancellable(id.clone()));
        }

        let entry = Self::take(&mut inner, id);
        if let Some(handle) = entry.and_then(|e| e.handle) {
            handle.cancel();
        }
        info!(task_id = %id, "cancellation requested, job removed from live set");
        Ok(CancelOutcome::Cancelled)
    }

    /// Snapshot of all tracked ids, in admission order.
    #[must_use]
    pub fn list_ids(&self) -> Vec<JobId> {
        self.inner.lock().order.clone()
    }

    /// Number of tracked jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    /// Whether no jobs are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().jobs.is_empty()
    }

    fn take(inner: &mut Inner, id: &JobId) -> Option<JobEntry> {
        inner.order.retain(|other| other != id);
        inner.jobs.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::Transcript;

    fn transcript() -> Transcript {
        Transcript {
            text: "hi".into(),
            chunks: vec![],
            speakers: None,
        }
    }

    fn handle() -> (JobHandle, CancellationToken) {
        let token = CancellationToken::new();
        (JobHandle::new(token.clone()), token)
    }

    #[test]
    fn admit_generates_id_when_absent() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        assert!(!id.as_str().is_empty());
        assert_eq!(reg.list_ids(), vec![id]);
    }

    #[test]
    fn admit_accepts_caller_id() {
        let reg = JobRegistry::new();
        let id = reg.admit(Some(JobId::from("managed-1"))).unwrap();
        assert_eq!(id.as_str(), "managed-1");
    }

    #[test]
    fn admit_rejects_live_duplicate() {
        let reg = JobRegistry::new();
        let _ = reg.admit(Some(JobId::from("dup"))).unwrap();
        let err = reg.admit(Some(JobId::from("dup"))).unwrap_err();
        assert!(matches!(err, JobError::AlreadyExists(_)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn id_is_reusable_after_removal() {
        let reg = JobRegistry::new();
        let id = reg.admit(Some(JobId::from("reuse"))).unwrap();
        reg.remove(&id);
        assert!(reg.admit(Some(JobId::from("reuse"))).is_ok());
    }

    #[test]
    fn lookup_unknown_is_not_found() {
        let reg = JobRegistry::new();
        let err = reg.lookup(&JobId::from("ghost")).unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[test]
    fn lookup_live_job_is_processing() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        assert_eq!(reg.lookup(&id).unwrap(), JobView::Processing);
        reg.mark_running(&id);
        assert_eq!(reg.lookup(&id).unwrap(), JobView::Processing);
    }

    #[test]
    fn lookup_consumes_terminal_result() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        assert!(reg.complete(&id, JobOutcome::Completed(transcript())));

        match reg.lookup(&id).unwrap() {
            JobView::Finished(JobOutcome::Completed(t)) => assert_eq!(t.text, "hi"),
            other => panic!("unexpected view: {other:?}"),
        }
        // Consumed: a second poll no longer finds the job.
        assert!(matches!(reg.lookup(&id), Err(JobError::NotFound(_))));
        assert!(reg.is_empty());
    }

    #[test]
    fn complete_first_writer_wins() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        assert!(reg.complete(&id, JobOutcome::Completed(transcript())));
        assert!(!reg.complete(&id, JobOutcome::Failed("late".into())));

        match reg.lookup(&id).unwrap() {
            JobView::Finished(outcome) => assert_eq!(outcome.state(), JobState::Completed),
            JobView::Processing => panic!("expected terminal view"),
        }
    }

    #[test]
    fn racing_completions_record_exactly_one() {
        let reg = std::sync::Arc::new(JobRegistry::new());
        let id = reg.admit(None).unwrap();

        let mut threads = Vec::new();
        for n in 0..8 {
            let reg = std::sync::Arc::clone(&reg);
            let id = id.clone();
            threads.push(std::thread::spawn(move || {
                reg.complete(&id, JobOutcome::Failed(format!("writer {n}")))
            }));
        }
        let wins: usize = threads
            .into_iter()
            .map(|t| usize::from(t.join().unwrap()))
            .sum();
        assert_eq!(wins, 1);
    }

    #[test]
    fn complete_after_cancel_is_orphaned() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        let (h, _token) = handle();
        reg.attach_handle(&id, h);

        assert_eq!(reg.cancel(&id).unwrap(), CancelOutcome::Cancelled);
        assert!(!reg.complete(&id, JobOutcome::Completed(transcript())));
        assert!(reg.is_empty());
    }

    #[test]
    fn cancel_unknown_is_not_found() {
        let reg = JobRegistry::new();
        let err = reg.cancel(&JobId::from("ghost")).unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[test]
    fn cancel_without_handle_is_rejected() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        let err = reg.cancel(&id).unwrap_err();
        assert!(matches!(err, JobError::NotCancellable(_)));
        // Still tracked — rejection must not remove the job.
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn cancel_fires_token_and_removes_entry() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        let (h, token) = handle();
        reg.attach_handle(&id, h);

        assert_eq!(reg.cancel(&id).unwrap(), CancelOutcome::Cancelled);
        assert!(token.is_cancelled());
        assert!(matches!(reg.lookup(&id), Err(JobError::NotFound(_))));
    }

    #[test]
    fn cancel_after_completion_returns_result() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        let (h, _token) = handle();
        reg.attach_handle(&id, h);
        assert!(reg.complete(&id, JobOutcome::Completed(transcript())));

        match reg.cancel(&id).unwrap() {
            CancelOutcome::AlreadyFinished(JobOutcome::Completed(t)) => assert_eq!(t.text, "hi"),
            other => panic!("unexpected cancel outcome: {other:?}"),
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn attach_handle_after_completion_is_ignored() {
        let reg = JobRegistry::new();
        let id = reg.admit(None).unwrap();
        assert!(reg.complete(&id, JobOutcome::Failed("fast failure".into())));

        let (h, _token) = handle();
        reg.attach_handle(&id, h);
        // Terminal outcome must still be observable, not resurrected.
        match reg.lookup(&id).unwrap() {
            JobView::Finished(outcome) => assert_eq!(outcome.state(), JobState::Failed),
            JobView::Processing => panic!("expected terminal view"),
        }
    }

    #[test]
    fn list_ids_preserves_insertion_order() {
        let reg = JobRegistry::new();
        let a = reg.admit(Some(JobId::from("a"))).unwrap();
        let b = reg.admit(Some(JobId::from("b"))).unwrap();
        let c = reg.admit(Some(JobId::from("c"))).unwrap();
        assert_eq!(reg.list_ids(), vec![a.clone(), b.clone(), c.clone()]);

        reg.remove(&b);
        assert_eq!(reg.list_ids(), vec![a, c]);
    }
}
