use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use futures_util::FutureExt;
use harvester_core::{
    extract_emails, is_absolute_url, urls_from_request, EntryOutcome, Job, JobId, JobSnapshot,
};
use serde_json::Value;
use tokio::time::Instant;

use crate::decode::decode_body;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::{EngineError, FailureKind, FetchError};

/// When a completed job leaves the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Removed once, `eviction_grace` after it completes.
    #[default]
    FromCompletion,
    /// Every status read of a completed job pushes removal to
    /// `eviction_grace` after that read. Unread jobs are never removed.
    ExtendOnRead,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub fetch: FetchSettings,
    /// Pause between consecutive URLs of one job.
    pub pacing: Duration,
    pub eviction_grace: Duration,
    pub eviction: EvictionPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            pacing: Duration::from_secs(1),
            eviction_grace: Duration::from_secs(5 * 60),
            eviction: EvictionPolicy::default(),
        }
    }
}

struct JobSlot {
    job: Job,
    /// Removal deadline, once one has been set.
    evict_at: Option<Instant>,
    /// A watcher task already owns this slot's deadline.
    eviction_watched: bool,
}

impl JobSlot {
    /// Move the deadline to `grace` from now. Returns `true` when no watcher
    /// exists yet and the caller must start one.
    fn push_eviction(&mut self, grace: Duration) -> bool {
        self.evict_at = Some(Instant::now() + grace);
        !std::mem::replace(&mut self.eviction_watched, true)
    }
}

type SharedSlot = Arc<Mutex<JobSlot>>;

struct Shared {
    jobs: RwLock<HashMap<JobId, SharedSlot>>,
    fetcher: Arc<dyn Fetcher>,
    settings: EngineSettings,
}

/// Owns the job table and launches one background task per job.
///
/// Cloning is cheap and every clone sees the same table. `create` and
/// `status` must be called from inside a tokio runtime.
#[derive(Clone)]
pub struct JobEngine {
    shared: Arc<Shared>,
}

impl JobEngine {
    pub fn new(settings: EngineSettings) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.fetch.clone())?);
        Ok(Self::with_fetcher(fetcher, settings))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, settings: EngineSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                jobs: RwLock::new(HashMap::new()),
                fetcher,
                settings,
            }),
        }
    }

    /// Validate a decoded submission body and start a job for its `urls`.
    pub fn create(&self, body: &Value) -> Result<JobId, EngineError> {
        let urls = urls_from_request(body)?;
        Ok(self.create_job(urls))
    }

    /// Store a new job and spawn its processing loop. Returns without waiting.
    pub fn create_job(&self, urls: Vec<String>) -> JobId {
        let job_id = JobId::new_random();
        let total = urls.len();
        let slot = Arc::new(Mutex::new(JobSlot {
            job: Job::new(job_id, urls),
            evict_at: None,
            eviction_watched: false,
        }));

        self.shared
            .jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_id, Arc::clone(&slot));
        engine_info!("Job {} created with {} url(s)", job_id, total);

        tokio::spawn(run_job(Arc::clone(&self.shared), slot));
        job_id
    }

    /// Current state of a job, possibly mid-run.
    pub fn status(&self, job_id: &str) -> Result<JobSnapshot, EngineError> {
        let not_found = || EngineError::NotFound(job_id.to_string());
        let id: JobId = job_id.parse().map_err(|_| not_found())?;
        let slot = self.shared.slot(id).ok_or_else(not_found)?;

        let (snapshot, start_watcher) = {
            let mut guard = lock(&slot);
            let snapshot = guard.job.view();
            let extend = snapshot.is_completed()
                && self.shared.settings.eviction == EvictionPolicy::ExtendOnRead;
            let grace = self.shared.settings.eviction_grace;
            let start_watcher = extend && guard.push_eviction(grace);
            (snapshot, start_watcher)
        };

        if start_watcher {
            watch_eviction(&self.shared, id);
        }
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.shared
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Shared {
    fn slot(&self, id: JobId) -> Option<SharedSlot> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn eviction_deadline(&self, id: JobId) -> Option<Instant> {
        let slot = self.slot(id)?;
        let guard = lock(&slot);
        guard.evict_at
    }

    /// Remove the job if its deadline has passed. Returns `false` when the
    /// deadline was pushed back in the meantime.
    fn evict_if_due(&self, id: JobId) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let due = match jobs.get(&id) {
            Some(slot) => lock(slot).evict_at.is_some_and(|at| at <= Instant::now()),
            None => return true,
        };
        if due {
            jobs.remove(&id);
            engine_info!("Job {} evicted", id);
        }
        due
    }
}

/// No code path panics while holding a slot, so a poisoned lock still holds
/// consistent data.
fn lock(slot: &SharedSlot) -> MutexGuard<'_, JobSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_job(shared: Arc<Shared>, slot: SharedSlot) {
    let (job_id, urls) = {
        let guard = lock(&slot);
        (guard.job.id(), guard.job.urls().to_vec())
    };

    for (position, raw) in urls.iter().enumerate() {
        let url = raw.trim();
        let Some(index) = lock(&slot).job.begin_entry(url) else {
            break;
        };

        let outcome = process_url(shared.fetcher.as_ref(), url).await;
        engine_debug!("Job {} url #{} {} -> {:?}", job_id, index, url, outcome);
        lock(&slot).job.resolve_entry(index, outcome);

        if position + 1 < urls.len() {
            tokio::time::sleep(shared.settings.pacing).await;
        }
    }

    let (start_watcher, emails) = {
        let mut guard = lock(&slot);
        guard.job.mark_completed();
        let emails = guard.job.view().all_emails().count();
        let start_watcher = shared.settings.eviction == EvictionPolicy::FromCompletion
            && guard.push_eviction(shared.settings.eviction_grace);
        (start_watcher, emails)
    };
    engine_info!(
        "Job {} completed: {} url(s), {} email(s)",
        job_id,
        urls.len(),
        emails
    );

    if start_watcher {
        watch_eviction(&shared, job_id);
    }
}

/// Resolve one URL to its entry outcome. Never fails and never panics outward.
async fn process_url(fetcher: &dyn Fetcher, url: &str) -> EntryOutcome {
    if !is_absolute_url(url) {
        return EntryOutcome::invalid_url();
    }

    match AssertUnwindSafe(fetch_emails(fetcher, url))
        .catch_unwind()
        .await
    {
        Ok(Ok(emails)) => EntryOutcome::Success { emails },
        Ok(Err(err)) => EntryOutcome::error(err.to_string()),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            engine_error!("Fetch of {} panicked: {}", url, message);
            EntryOutcome::error(FetchError::new(FailureKind::Internal, message).to_string())
        }
    }
}

async fn fetch_emails(fetcher: &dyn Fetcher, url: &str) -> Result<Vec<String>, FetchError> {
    let output = fetcher.fetch(url).await?;
    let meta = &output.metadata;
    let body = decode_body(&output.bytes, meta.content_type.as_deref());
    engine_debug!(
        "Fetched {} -> {} (status {}, {} bytes, {})",
        meta.original_url,
        meta.final_url,
        meta.status,
        meta.byte_len,
        body.encoding_label
    );
    if body.had_errors {
        engine_warn!(
            "Body of {} is not valid {}; malformed bytes replaced",
            meta.final_url,
            body.encoding_label
        );
    }
    Ok(extract_emails(&body.text))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected failure".to_string())
}

/// One watcher per job: sleeps until the slot's deadline and re-sleeps if a
/// read pushed it back while waiting.
fn watch_eviction(shared: &Arc<Shared>, job_id: JobId) {
    let shared = Arc::clone(shared);
    engine_debug!(
        "Job {} eviction scheduled in {:?}",
        job_id,
        shared.settings.eviction_grace
    );
    tokio::spawn(async move {
        while let Some(deadline) = shared.eviction_deadline(job_id) {
            tokio::time::sleep_until(deadline).await;
            if shared.evict_if_due(job_id) {
                break;
            }
        }
    });
}
