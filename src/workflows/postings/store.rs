use std::collections::HashMap;
use std::sync::Mutex;

use super::domain::{Submission, SubmissionId, SubmissionStatus};

/// Storage failure. The in-memory store only ever reports conflicts and
/// missing records; a durable adapter may surface transport problems
/// through `Unavailable`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("submission already exists")]
    Conflict,
    #[error("submission not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for the submission registry. The pending, rejected, and
/// published "stores" are one keyed map partitioned by status; all
/// mutation goes through the registry's atomic operations, never through
/// direct map access.
pub trait SubmissionStore: Send + Sync {
    fn insert(&self, submission: Submission) -> Result<(), StoreError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError>;
    fn update(&self, submission: Submission) -> Result<(), StoreError>;
}

/// Default process-lifetime store. State does not survive a restart;
/// stale buttons after a restart surface as a "not found" notice.
#[derive(Debug, Default)]
pub struct MemorySubmissionStore {
    entries: Mutex<HashMap<SubmissionId, Submission>>,
}

impl MemorySubmissionStore {
    /// Number of submissions currently in the given status. Used by
    /// telemetry and tests.
    pub fn count_by_status(&self, status: SubmissionStatus) -> usize {
        self.lock_entries()
            .values()
            .filter(|s| s.status == status)
            .count()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<SubmissionId, Submission>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SubmissionStore for MemorySubmissionStore {
    fn insert(&self, submission: Submission) -> Result<(), StoreError> {
        let mut entries = self.lock_entries();
        if entries.contains_key(&submission.id) {
            return Err(StoreError::Conflict);
        }
        entries.insert(submission.id.clone(), submission);
        Ok(())
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError> {
        Ok(self.lock_entries().get(id).cloned())
    }

    fn update(&self, submission: Submission) -> Result<(), StoreError> {
        let mut entries = self.lock_entries();
        if !entries.contains_key(&submission.id) {
            return Err(StoreError::NotFound);
        }
        entries.insert(submission.id.clone(), submission);
        Ok(())
    }
}
