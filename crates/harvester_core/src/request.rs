use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// `urls` was absent, not an array, or held a non-string element.
    #[error("Invalid request: urls array is required")]
    MissingUrls,
}

/// Read the `urls` array out of a decoded job-submission body.
///
/// Non-object bodies have no `urls` field and are rejected the same way as a
/// missing field. An empty array is valid.
pub fn urls_from_request(body: &Value) -> Result<Vec<String>, ValidationError> {
    let urls = body
        .get("urls")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingUrls)?;

    urls.iter()
        .map(|url| {
            url.as_str()
                .map(ToOwned::to_owned)
                .ok_or(ValidationError::MissingUrls)
        })
        .collect()
}
