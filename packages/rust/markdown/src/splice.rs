//! Marker-region substitution.
//!
//! A region looks like
//! `<!-- name starts -->...<!-- name ends -->` and may span lines. Only the
//! first region for a name is rewritten; the delimiter comments are kept
//! byte-for-byte and everything between them is replaced.

use std::borrow::Cow;

use regex::{NoExpand, Regex};
use tracing::debug;

/// Opening comment for `marker`.
pub fn start_comment(marker: &str) -> String {
    format!("<!-- {marker} starts -->")
}

/// Closing comment for `marker`.
pub fn end_comment(marker: &str) -> String {
    format!("<!-- {marker} ends -->")
}

fn region_regex(marker: &str) -> Regex {
    let pattern = format!(
        r"(?s){}.*?{}",
        regex::escape(&start_comment(marker)),
        regex::escape(&end_comment(marker)),
    );
    Regex::new(&pattern).expect("escaped marker pattern always compiles")
}

/// Replace the first `marker` region in `content` with `chunk`.
///
/// Block chunks (`inline == false`) are wrapped in newlines so they render
/// as their own paragraph; inline chunks sit directly between the comments.
/// Content without the marker pair comes back unchanged.
pub fn splice<'a>(content: &'a str, marker: &str, chunk: &str, inline: bool) -> Cow<'a, str> {
    let payload = if inline {
        chunk.to_string()
    } else {
        format!("\n{chunk}\n")
    };
    let replacement = format!("{}{payload}{}", start_comment(marker), end_comment(marker));

    let result = region_regex(marker).replacen(content, 1, NoExpand(&replacement));
    if matches!(result, Cow::Borrowed(_)) {
        debug!(marker, "marker pair not found, content left as is");
    }
    result
}

/// Whether `content` holds a complete region for `marker`.
pub fn has_region(content: &str, marker: &str) -> bool {
    region_regex(marker).is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const README: &str = "# Hi\n\
        <!-- recent_contributions starts -->\nold\n<!-- recent_contributions ends -->\n\
        middle\n\
        <!-- blog starts -->\nold blog\n<!-- blog ends -->\n\
        footer\n";

    #[test]
    fn block_splice_wraps_in_newlines() {
        let out = splice(README, "blog", "* a\n* b", false);
        assert!(out.contains("<!-- blog starts -->\n* a\n* b\n<!-- blog ends -->"));
        assert!(!out.contains("old blog"));
    }

    #[test]
    fn inline_splice_adds_no_whitespace() {
        let content = "Total: <!-- count starts -->0<!-- count ends --> repos";
        let out = splice(content, "count", "42", true);
        assert_eq!(out, "Total: <!-- count starts -->42<!-- count ends --> repos");
    }

    #[test]
    fn splice_is_idempotent() {
        let once = splice(README, "recent_contributions", "* x", false).into_owned();
        let twice = splice(&once, "recent_contributions", "* x", false).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn splice_leaves_other_regions_alone() {
        let out = splice(README, "recent_contributions", "* new", false);
        let blog_start = out.find("<!-- blog starts -->").unwrap();
        let orig_blog_start = README.find("<!-- blog starts -->").unwrap();
        assert_eq!(&out[blog_start..], &README[orig_blog_start..]);
        assert!(out.starts_with("# Hi\n<!-- recent_contributions starts -->\n* new\n"));
    }

    #[test]
    fn missing_marker_is_noop() {
        let out = splice(README, "tils", "* note", false);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, README);
    }

    #[test]
    fn only_first_region_replaced() {
        let content = "<!-- m starts -->a<!-- m ends -->|<!-- m starts -->b<!-- m ends -->";
        let out = splice(content, "m", "z", true);
        assert_eq!(out, "<!-- m starts -->z<!-- m ends -->|<!-- m starts -->b<!-- m ends -->");
    }

    #[test]
    fn prefix_marker_does_not_match_longer_name() {
        let content = "<!-- recent_contributions_count starts -->3<!-- recent_contributions_count ends -->";
        assert!(!has_region(content, "recent_contributions"));
        let out = splice(content, "recent_contributions", "x", false);
        assert_eq!(out, content);
    }

    #[test]
    fn dollar_signs_are_literal() {
        let content = "<!-- m starts --><!-- m ends -->";
        let out = splice(content, "m", "costs $1 and ${name}", true);
        assert_eq!(out, "<!-- m starts -->costs $1 and ${name}<!-- m ends -->");
    }

    #[test]
    fn empty_region_gets_filled() {
        let content = "<!-- recent_contributions starts --><!-- recent_contributions ends -->";
        let out = splice(content, "recent_contributions", "* a", false);
        assert_eq!(
            out,
            "<!-- recent_contributions starts -->\n* a\n<!-- recent_contributions ends -->"
        );
    }
}
