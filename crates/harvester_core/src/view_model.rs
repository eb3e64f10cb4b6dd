use serde::{Deserialize, Serialize};

use crate::{EntryOutcome, JobStatus, ResultEntry};

/// Point-in-time copy of a job, as returned to status readers.
///
/// A snapshot taken mid-run holds a prefix of the results; the last entry
/// may still be pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub processed: usize,
    pub total: usize,
    pub results: Vec<ResultEntry>,
}

impl JobSnapshot {
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Every email found across successful entries, in entry order.
    pub fn all_emails(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .flat_map(|entry| match &entry.outcome {
                EntryOutcome::Success { emails } => emails.as_slice(),
                _ => &[][..],
            })
            .map(String::as_str)
    }
}
