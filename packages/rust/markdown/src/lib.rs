//! Markdown rendering for the README regions.
//!
//! Two halves: the [`splice`] module rewrites comment-delimited regions in a
//! file, and the functions here turn fetched records into the bullet lists
//! that go into those regions. Formatting never mutates its input.

pub mod splice;

use readmegen_shared::{ContributionRecord, FeedEntry, NoteRecord};

pub use splice::{has_region, splice};

// ---------------------------------------------------------------------------
// Marker names
// ---------------------------------------------------------------------------

/// Short contributions list (README) and full history (detail file).
pub const RECENT_CONTRIBUTIONS: &str = "recent_contributions";
/// Inline total in the detail file.
pub const RECENT_CONTRIBUTIONS_COUNT: &str = "recent_contributions_count";
/// Notes list in the README.
pub const TILS: &str = "tils";
/// Blog list in the README.
pub const BLOG: &str = "blog";

// ---------------------------------------------------------------------------
// Contributions
// ---------------------------------------------------------------------------

/// Sort newest first. Records sharing a date keep their fetch order.
pub fn sort_contributions(records: &mut [ContributionRecord]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// `* [repo](url) - date` for the first `limit` records.
pub fn recent_contributions_md(records: &[ContributionRecord], limit: usize) -> String {
    records
        .iter()
        .take(limit)
        .map(|r| format!("* [{}]({}) - {}", r.repo, r.repo_url, r.updated_at))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Two-line bullet per record with the description under a `<br>`.
pub fn contribution_history_md(records: &[ContributionRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "* **[{}]({})** - {}\n<br>{}",
                r.repo,
                r.repo_url,
                r.updated_at,
                r.description.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Total record count as an inline value.
pub fn contribution_count(records: &[ContributionRecord]) -> String {
    records.len().to_string()
}

// ---------------------------------------------------------------------------
// Notes and feed
// ---------------------------------------------------------------------------

pub fn notes_md(notes: &[NoteRecord], limit: usize) -> String {
    notes
        .iter()
        .take(limit)
        .map(|n| format!("* [{}]({}) - {}", n.title, n.url, n.date))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn feed_md(entries: &[FeedEntry], limit: usize) -> String {
    entries
        .iter()
        .take(limit)
        .map(|e| format!("* [{}]({}) - {}", e.title, e.url, e.published))
        .collect::<Vec<_>>()
        .join("\n")
}
