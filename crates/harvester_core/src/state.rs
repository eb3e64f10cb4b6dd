use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::view_model::JobSnapshot;

/// Error text recorded for inputs that do not parse as absolute URLs.
pub const INVALID_URL_MESSAGE: &str = "Invalid URL format";

/// Opaque job identity. Random, so concurrent submissions never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
}

/// Outcome of one URL. Serialized under a `status` tag next to the entry's `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntryOutcome {
    Pending,
    Success { emails: Vec<String> },
    Error { error: String },
}

impl EntryOutcome {
    pub fn invalid_url() -> Self {
        EntryOutcome::Error {
            error: INVALID_URL_MESSAGE.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        EntryOutcome::Error {
            error: message.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, EntryOutcome::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub url: String,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

/// Syntactic check only: does `candidate` parse as an absolute URL?
pub fn is_absolute_url(candidate: &str) -> bool {
    url::Url::parse(candidate).is_ok()
}

/// One batch-scrape request and its accumulated results.
///
/// All mutation goes through the methods below so the counters stay in step
/// with the result list: `processed` counts resolved entries, and the job
/// completes only once every URL has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    urls: Vec<String>,
    status: JobStatus,
    processed: usize,
    results: Vec<ResultEntry>,
}

impl Job {
    pub fn new(id: JobId, urls: Vec<String>) -> Self {
        Self {
            id,
            results: Vec::with_capacity(urls.len()),
            urls,
            status: JobStatus::Processing,
            processed: 0,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.urls.len()
    }

    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Append a pending entry for the next URL and return its index.
    ///
    /// Returns `None` once every input URL already has an entry.
    pub fn begin_entry(&mut self, url: impl Into<String>) -> Option<usize> {
        if self.results.len() >= self.urls.len() {
            return None;
        }
        self.results.push(ResultEntry {
            url: url.into(),
            outcome: EntryOutcome::Pending,
        });
        Some(self.results.len() - 1)
    }

    /// Record the outcome for a pending entry and count it as processed.
    ///
    /// Resolving an entry twice, or resolving it back to pending, is ignored
    /// and returns `false`.
    pub fn resolve_entry(&mut self, index: usize, outcome: EntryOutcome) -> bool {
        if outcome.is_pending() {
            return false;
        }
        match self.results.get_mut(index) {
            Some(entry) if entry.outcome.is_pending() => {
                entry.outcome = outcome;
                self.processed += 1;
                true
            }
            _ => false,
        }
    }

    /// Flip to `Completed` once every URL has been processed.
    ///
    /// Returns `true` only on the transition itself.
    pub fn mark_completed(&mut self) -> bool {
        if self.is_completed() || self.processed < self.total() {
            return false;
        }
        self.status = JobStatus::Completed;
        true
    }

    pub fn view(&self) -> JobSnapshot {
        JobSnapshot {
            status: self.status,
            processed: self.processed,
            total: self.total(),
            results: self.results.clone(),
        }
    }
}
