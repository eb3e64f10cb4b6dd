use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}")
        .expect("static email pattern")
});

/// Pull email-like strings out of raw page content.
///
/// Matching is a syntactic heuristic, not address validation. Results keep
/// first-seen order and drop exact duplicates; case is preserved, so
/// `a@b.com` and `A@B.COM` are distinct entries.
pub fn extract_emails(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    EMAIL_PATTERN
        .find_iter(content)
        .map(|m| m.as_str())
        .filter(|email| seen.insert(*email))
        .map(ToOwned::to_owned)
        .collect()
}
