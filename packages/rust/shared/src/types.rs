//! Domain records produced by the fetchers and consumed by the aggregator.

use chrono::NaiveDate;

use crate::error::{ReadmeError, Result};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One repository the account contributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionRecord {
    /// `owner/name` or bare `name`, depending on the query shape.
    pub repo: String,
    /// Repository URL.
    pub repo_url: String,
    /// Free-text repository description.
    pub description: Option<String>,
    /// Last-updated date.
    pub updated_at: NaiveDate,
}

/// A "today I learned" note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub title: String,
    pub url: String,
    pub date: NaiveDate,
}

/// A syndicated blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    /// Entry link with any `#fragment` removed.
    pub url: String,
    pub published: NaiveDate,
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

/// Truncate an ISO 8601 date or date-time string to its calendar day.
///
/// Everything after the first `T` (or space) is dropped before parsing, so
/// the date is the one written in the source, not the UTC-normalized one.
pub fn day_of(raw: &str) -> Result<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ReadmeError::parse(format!("invalid date {raw:?}: {e}")))
}

/// Remove a trailing `#fragment` from a URL string.
pub fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}
