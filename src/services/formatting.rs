//! Input normalization and display helpers for bookmarks.
//!
//! Pure functions with no state: the engine normalizes user input with
//! [`normalize_title`] and [`normalize_url`], and presentation layers render
//! entries with [`derive_domain`], [`relative_age`] and [`count_label`].

use chrono::{DateTime, Utc};
use url::Url;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Trims surrounding whitespace from a title.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_string()
}

/// Trims `url` and prefixes `https://` unless it already starts with
/// `http://` or `https://` (case-insensitive).
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Host of `url` without a leading `www.`; the input unchanged if it does not
/// parse or has no host.
pub fn derive_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Human-readable age of `created_at` as seen at `now`.
///
/// Buckets are inclusive of their lower bound: exactly 60 seconds reads
/// `1m ago`. Anything a week or older is shown as an `M/D/YYYY` date.
pub fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds();

    if seconds < MINUTE {
        "just now".to_string()
    } else if seconds < HOUR {
        format!("{}m ago", seconds / MINUTE)
    } else if seconds < DAY {
        format!("{}h ago", seconds / HOUR)
    } else if seconds < WEEK {
        format!("{}d ago", seconds / DAY)
    } else {
        created_at.format("%-m/%-d/%Y").to_string()
    }
}

/// `1 bookmark`, `3 bookmarks`.
pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 bookmark".to_string()
    } else {
        format!("{} bookmarks", count)
    }
}
