//! String-matching fallbacks for unstructured upstream errors.
//!
//! The preferred path is a typed rate-limit variant carrying a parsed
//! wait; these helpers exist for the boundary where the upstream API is
//! known to return free-text messages only.

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Markers that identify a rate-limit failure in free text.
const RATE_LIMIT_MARKERS: &[&str] = &[
    "429",
    "too many requests",
    "quota",
    "resource_exhausted",
    "rate limit",
];

fn retry_hint_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // "Please retry in 21.23s" as emitted by the Generative Language API.
        Regex::new(r"(?i)retry in\s*([0-9]+(?:\.[0-9]+)?)\s*s")
            .unwrap_or_else(|e| panic!("invalid retry hint pattern: {e}"))
    })
}

/// Check whether an error message looks like a rate-limit failure.
#[must_use]
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}

/// Extract a server-suggested wait from an error message.
///
/// Recognizes the "please retry in `<seconds>`s" phrasing; returns the
/// raw suggested duration without padding.
#[must_use]
pub fn parse_retry_hint(message: &str) -> Option<Duration> {
    let captures = retry_hint_pattern().captures(message)?;
    let seconds: f64 = captures.get(1)?.as_str().parse().ok()?;
    // try_from rejects negative, non-finite, and overflowing values; the
    // digits come straight from an upstream error body, so all three occur.
    Duration::try_from_secs_f64(seconds).ok()
}
