use harvester_core::{EntryOutcome, Job, JobId, JobStatus, INVALID_URL_MESSAGE};
use pretty_assertions::assert_eq;
use serde_json::json;

fn job(urls: &[&str]) -> Job {
    Job::new(
        JobId::new_random(),
        urls.iter().map(|u| u.to_string()).collect(),
    )
}

#[test]
fn new_job_starts_processing_and_empty() {
    let job = job(&["a", "b"]);
    assert_eq!(job.status(), JobStatus::Processing);
    assert_eq!(job.processed(), 0);
    assert_eq!(job.total(), 2);
    assert!(job.results().is_empty());
}

#[test]
fn entries_resolve_in_order_and_complete_once() {
    let mut job = job(&["https://a.example.com", "nope"]);

    let first = job.begin_entry("https://a.example.com").unwrap();
    assert!(job.view().results[0].outcome.is_pending());
    assert!(!job.mark_completed());
    assert!(job.resolve_entry(
        first,
        EntryOutcome::Success {
            emails: vec!["x@y.com".into()]
        }
    ));

    let second = job.begin_entry("nope").unwrap();
    assert!(job.resolve_entry(second, EntryOutcome::invalid_url()));
    assert!(job.begin_entry("extra").is_none());

    assert!(job.mark_completed());
    assert!(!job.mark_completed());

    let view = job.view();
    assert_eq!(view.status, JobStatus::Completed);
    assert_eq!(view.processed, 2);
    assert_eq!(view.results.len(), 2);
    assert_eq!(view.results[0].url, "https://a.example.com");
    assert_eq!(
        view.results[1].outcome,
        EntryOutcome::Error {
            error: INVALID_URL_MESSAGE.into()
        }
    );
    assert_eq!(view.all_emails().collect::<Vec<_>>(), vec!["x@y.com"]);
}

#[test]
fn resolving_twice_does_not_double_count() {
    let mut job = job(&["a"]);
    let idx = job.begin_entry("a").unwrap();
    assert!(job.resolve_entry(idx, EntryOutcome::error("boom")));
    assert!(!job.resolve_entry(idx, EntryOutcome::error("again")));
    assert!(!job.resolve_entry(5, EntryOutcome::error("missing")));
    assert_eq!(job.processed(), 1);
}

#[test]
fn empty_job_completes_immediately() {
    let mut job = job(&[]);
    assert!(job.mark_completed());
    assert_eq!(job.view().processed, 0);
    assert!(job.view().results.is_empty());
}

#[test]
fn snapshot_serializes_with_tagged_entries() {
    let mut job = job(&["a", "b", "c"]);
    let a = job.begin_entry("a").unwrap();
    job.resolve_entry(
        a,
        EntryOutcome::Success {
            emails: vec!["m@n.io".into()],
        },
    );
    let b = job.begin_entry("b").unwrap();
    job.resolve_entry(b, EntryOutcome::error("Error: HTTP error! Status: 404"));
    job.begin_entry("c").unwrap();

    let value = serde_json::to_value(job.view()).unwrap();
    assert_eq!(
        value,
        json!({
            "status": "processing",
            "processed": 2,
            "total": 3,
            "results": [
                { "url": "a", "status": "success", "emails": ["m@n.io"] },
                { "url": "b", "status": "error", "error": "Error: HTTP error! Status: 404" },
                { "url": "c", "status": "pending" }
            ]
        })
    );
}

#[test]
fn job_id_round_trips_through_text() {
    let id = JobId::new_random();
    let parsed: JobId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
    assert!("unknown-id".parse::<JobId>().is_err());
}
