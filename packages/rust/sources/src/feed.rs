//! Atom feed fetching and parsing.

use readmegen_shared::{FeedEntry, ReadmeError, Result, day_of, strip_fragment};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use crate::read_body;

// ---------------------------------------------------------------------------
// Atom document shape (only the parts we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: AtomText,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    /// The `alternate` link (an absent `rel` means alternate), else the first one.
    fn link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
            .or_else(|| self.links.first())
            .map(|l| l.href.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse an Atom document into entries, keeping the feed's own order.
pub fn parse_atom(xml: &str) -> Result<Vec<FeedEntry>> {
    let feed: AtomFeed = quick_xml::de::from_str(xml)
        .map_err(|e| ReadmeError::parse(format!("invalid Atom feed: {e}")))?;

    let mut entries = Vec::with_capacity(feed.entries.len());
    for entry in &feed.entries {
        let title = entry.title.value.trim();
        let Some(link) = entry.link() else {
            debug!(title, "feed entry has no link, skipping");
            continue;
        };
        let date = entry
            .published
            .as_deref()
            .or(entry.updated.as_deref())
            .ok_or_else(|| {
                ReadmeError::parse(format!("feed entry {title:?} has no published date"))
            })?;

        entries.push(FeedEntry {
            title: title.to_string(),
            url: strip_fragment(link).to_string(),
            published: day_of(date)?,
        });
    }

    Ok(entries)
}

/// Download and parse the feed at `url`.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_feed(http: &Client, url: &Url) -> Result<Vec<FeedEntry>> {
    let response = http
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ReadmeError::Network(format!("{url}: {e}")))?;

    let body = read_body(response, url.as_str()).await?;
    let entries = parse_atom(&body)?;

    info!(entries = entries.len(), "feed fetched");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Notes</title>
  <link href="https://blog.example.com/" rel="alternate"/>
  <link href="https://blog.example.com/feeds/note.atom.xml" rel="self"/>
  <id>https://blog.example.com/</id>
  <updated>2024-05-02T09:00:00+08:00</updated>
  <entry>
    <title>Tracing &amp; spans</title>
    <link href="https://blog.example.com/posts/tracing.html#intro" rel="alternate"/>
    <published>2024-05-01T23:30:00+08:00</published>
    <updated>2024-05-02T09:00:00+08:00</updated>
    <author><name>Someone</name></author>
    <id>tag:blog.example.com,2024-05-01:/posts/tracing.html</id>
    <summary type="html">&lt;p&gt;Spans&lt;/p&gt;</summary>
  </entry>
  <entry>
    <title type="html">Only updated</title>
    <link href="https://blog.example.com/posts/updated.html"/>
    <updated>2024-04-10T10:00:00Z</updated>
    <id>tag:blog.example.com,2024-04-10:/posts/updated.html</id>
  </entry>
  <entry>
    <title>No link</title>
    <published>2024-03-01T00:00:00Z</published>
    <id>tag:blog.example.com,2024-03-01:/nolink</id>
  </entry>
</feed>
"#;

    #[test]
    fn parses_entries_in_feed_order() {
        let entries = parse_atom(FEED).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].title, "Tracing & spans");
        assert_eq!(entries[0].url, "https://blog.example.com/posts/tracing.html");
        assert_eq!(entries[0].published.to_string(), "2024-05-01");

        assert_eq!(entries[1].title, "Only updated");
        assert_eq!(entries[1].published.to_string(), "2024-04-10");
    }

    #[test]
    fn empty_feed_has_no_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>x</title></feed>"#;
        assert!(parse_atom(xml).unwrap().is_empty());
    }

    #[test]
    fn entry_without_dates_is_error() {
        let xml = r#"<feed><entry><title>t</title><link href="https://e.com/"/></entry></feed>"#;
        assert!(parse_atom(xml).is_err());
    }

    #[test]
    fn garbage_is_parse_error() {
        let err = parse_atom("<feed><entry>").unwrap_err();
        assert!(matches!(err, ReadmeError::Parse { .. }));
    }

    #[tokio::test]
    async fn fetches_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feeds/note.atom.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/atom+xml")
                    .set_body_string(FEED),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/feeds/note.atom.xml", server.uri())).unwrap();
        let entries = fetch_feed(&Client::new(), &url).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn not_found_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = fetch_feed(&Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, ReadmeError::Network(_)));
    }
}
