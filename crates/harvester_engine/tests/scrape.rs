use std::time::Duration;

use harvester_core::{EntryOutcome, JobStatus, INVALID_URL_MESSAGE};
use harvester_engine::{EngineSettings, JobEngine};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_engine() -> JobEngine {
    engine_logging::initialize_for_tests();
    JobEngine::new(EngineSettings {
        pacing: Duration::from_millis(10),
        ..EngineSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn scrapes_live_pages_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/team"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<ul><li>ceo@corp.example</li><li>CEO@corp.example</li><li>ceo@corp.example</li></ul>",
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;

    let engine = fast_engine();
    let id = engine
        .create(&json!({
            "urls": [
                format!("{}/team", server.uri()),
                "not a url",
                format!(" {}/gone ", server.uri()),
                "http://127.0.0.1:1/",
            ]
        }))
        .unwrap();

    let snapshot = loop {
        let snapshot = engine.status(&id.to_string()).unwrap();
        if snapshot.status == JobStatus::Completed {
            break snapshot;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    };

    assert_eq!(snapshot.total, 4);
    assert_eq!(snapshot.processed, 4);
    assert_eq!(snapshot.results.len(), 4);
    assert_eq!(
        snapshot.results[0].outcome,
        EntryOutcome::Success {
            emails: vec!["ceo@corp.example".into(), "CEO@corp.example".into()]
        }
    );
    assert_eq!(
        snapshot.results[1].outcome,
        EntryOutcome::error(INVALID_URL_MESSAGE)
    );
    assert_eq!(snapshot.results[2].url, format!("{}/gone", server.uri()));
    assert_eq!(
        snapshot.results[2].outcome,
        EntryOutcome::error("Error: HTTP error! Status: 410")
    );
    match &snapshot.results[3].outcome {
        EntryOutcome::Error { error } => assert!(error.starts_with("Error: "), "{error}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn decodes_legacy_charset_before_extracting() {
    let server = MockServer::start().await;
    // "José <jose@example.es>" in latin-1
    let mut body = b"Jos".to_vec();
    body.push(0xE9);
    body.extend_from_slice(b" <jose@example.es>");
    Mock::given(method("GET"))
        .and(path("/es"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=iso-8859-1"))
        .mount(&server)
        .await;

    let engine = fast_engine();
    let id = engine.create_job(vec![format!("{}/es", server.uri())]);

    let snapshot = loop {
        let snapshot = engine.status(&id.to_string()).unwrap();
        if snapshot.is_completed() {
            break snapshot;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    };
    assert_eq!(
        snapshot.all_emails().collect::<Vec<_>>(),
        vec!["jose@example.es"]
    );
}
