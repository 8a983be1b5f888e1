//! GitHub GraphQL client: contributions paging and issue-backed notes.
//!
//! Queries are static documents with named variables; nothing user-supplied
//! is ever spliced into query text.

use readmegen_shared::{
    ContributionQuery, ContributionRecord, NoteRecord, ReadmeError, Result, day_of,
};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, trace};
use url::Url;

use crate::read_body;

/// Repositories per page, the GitHub maximum.
const PAGE_SIZE: u32 = 100;

const LEGACY_CONTRIBUTIONS_QUERY: &str = r#"
query($after: String, $first: Int!) {
  viewer {
    repositoriesContributedTo(includeUserRepositories: true, first: $first, after: $after) {
      pageInfo {
        hasNextPage
        endCursor
      }
      totalCount
      nodes {
        identifier: name
        url
        updatedAt
        description
      }
    }
  }
}
"#;

const OWNER_QUALIFIED_CONTRIBUTIONS_QUERY: &str = r#"
query($after: String, $first: Int!) {
  viewer {
    repositoriesContributedTo(includeUserRepositories: true, privacy: PUBLIC, first: $first, after: $after) {
      pageInfo {
        hasNextPage
        endCursor
      }
      totalCount
      nodes {
        identifier: nameWithOwner
        url
        updatedAt
        description
      }
    }
  }
}
"#;

const ISSUE_NOTES_QUERY: &str = r#"
query($owner: String!, $name: String!, $creator: String!, $first: Int!) {
  repository(owner: $owner, name: $name) {
    issues(
      first: $first
      states: OPEN
      filterBy: {createdBy: $creator}
      orderBy: {field: UPDATED_AT, direction: DESC}
    ) {
      nodes {
        url
        updatedAt
        title
      }
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Viewer {
    repositories_contributed_to: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<Option<RepositoryNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    identifier: String,
    url: String,
    updated_at: String,
    description: Option<String>,
}

impl RepositoryNode {
    fn into_record(self) -> Result<ContributionRecord> {
        Ok(ContributionRecord {
            updated_at: day_of(&self.updated_at)?,
            repo: self.identifier,
            repo_url: self.url,
            description: self.description,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<IssueRepository>,
}

#[derive(Debug, Deserialize)]
struct IssueRepository {
    issues: IssueConnection,
}

#[derive(Debug, Deserialize)]
struct IssueConnection {
    #[serde(default)]
    nodes: Vec<Option<IssueNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    url: String,
    updated_at: String,
    title: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated GraphQL client for one endpoint.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    endpoint: Url,
    token: String,
}

impl GithubClient {
    /// Wrap `http` for `endpoint`. An empty token is sent as-is and left
    /// for the server to reject.
    pub fn new(http: Client, endpoint: Url, token: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            token: token.into(),
        }
    }

    /// POST one query with its variables and decode `data`.
    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let url = self.endpoint.as_str();
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| ReadmeError::Network(format!("{url}: {e}")))?;

        let body = read_body(response, url).await?;
        trace!(%body, "GraphQL response");

        let parsed: GraphqlResponse<T> = serde_json::from_str(&body)
            .map_err(|e| ReadmeError::parse(format!("{url}: unexpected response shape: {e}")))?;

        if !parsed.errors.is_empty() {
            let messages: Vec<_> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(ReadmeError::Api(messages.join("; ")));
        }

        parsed
            .data
            .ok_or_else(|| ReadmeError::parse(format!("{url}: response has no data")))
    }

    /// Page through every repository the viewer contributed to.
    ///
    /// Records come back in page order. A node whose identifier equals
    /// `self_repository` is dropped wherever it appears.
    #[instrument(skip_all, fields(query = ?query))]
    pub async fn fetch_contributions(
        &self,
        query: ContributionQuery,
        self_repository: Option<&str>,
    ) -> Result<Vec<ContributionRecord>> {
        let document = match query {
            ContributionQuery::Legacy => LEGACY_CONTRIBUTIONS_QUERY,
            ContributionQuery::OwnerQualified => OWNER_QUALIFIED_CONTRIBUTIONS_QUERY,
        };

        let mut records = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let data: ViewerData = self
                .execute(document, json!({ "after": after, "first": PAGE_SIZE }))
                .await?;
            pages += 1;

            let connection = data.viewer.repositories_contributed_to;
            let page_len = connection.nodes.len();
            for node in connection.nodes.into_iter().flatten() {
                if self_repository == Some(node.identifier.as_str()) {
                    debug!(repo = %node.identifier, "skipping self repository");
                    continue;
                }
                records.push(node.into_record()?);
            }
            debug!(page = pages, nodes = page_len, "fetched contributions page");

            if !connection.page_info.has_next_page {
                break;
            }
            after = match connection.page_info.end_cursor {
                Some(cursor) => Some(cursor),
                None => {
                    return Err(ReadmeError::parse(
                        "hasNextPage is true but endCursor is missing",
                    ));
                }
            };
        }

        info!(pages, records = records.len(), "contributions fetched");
        Ok(records)
    }

    /// Most recently updated open issues opened by `creator` in `owner/name`.
    #[instrument(skip(self))]
    pub async fn fetch_issue_notes(
        &self,
        owner: &str,
        name: &str,
        creator: &str,
        limit: usize,
    ) -> Result<Vec<NoteRecord>> {
        let data: RepositoryData = self
            .execute(
                ISSUE_NOTES_QUERY,
                json!({ "owner": owner, "name": name, "creator": creator, "first": limit }),
            )
            .await?;

        let repository = data
            .repository
            .ok_or_else(|| ReadmeError::Api(format!("repository {owner}/{name} not found")))?;

        let notes = repository
            .issues
            .nodes
            .into_iter()
            .flatten()
            .map(|issue| {
                Ok(NoteRecord {
                    date: day_of(&issue.updated_at)?,
                    title: issue.title,
                    url: issue.url,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(notes = notes.len(), "issue notes fetched");
        Ok(notes)
    }
}
