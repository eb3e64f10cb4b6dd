use harvester_core::{urls_from_request, ValidationError};
use serde_json::json;

#[test]
fn accepts_string_array() {
    let body = json!({ "urls": ["https://a.example.com", " b "] });
    assert_eq!(
        urls_from_request(&body).unwrap(),
        vec!["https://a.example.com".to_string(), " b ".to_string()]
    );
}

#[test]
fn empty_array_is_valid() {
    assert!(urls_from_request(&json!({ "urls": [] })).unwrap().is_empty());
}

#[test]
fn rejects_missing_or_malformed_urls() {
    let bad = [
        json!({}),
        json!({ "urls": null }),
        json!({ "urls": "https://a.example.com" }),
        json!({ "urls": ["ok", 3] }),
        json!(["https://a.example.com"]),
        json!("urls"),
    ];
    for body in bad {
        assert_eq!(
            urls_from_request(&body),
            Err(ValidationError::MissingUrls),
            "body {body} should be rejected"
        );
    }
}

#[test]
fn validation_message_matches_client_contract() {
    assert_eq!(
        ValidationError::MissingUrls.to_string(),
        "Invalid request: urls array is required"
    );
}
