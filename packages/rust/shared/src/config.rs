//! Application configuration for readmegen.
//!
//! Config lives in `readmegen.toml` next to the README being maintained.
//! CLI flags override config file values, which override defaults. The
//! defaults reproduce the endpoints the tool was first written against.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ReadmeError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "readmegen.toml";

// ---------------------------------------------------------------------------
// Config structs (matching readmegen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// GraphQL contribution source.
    #[serde(default)]
    pub github: GithubConfig,

    /// Where "today I learned" notes come from.
    #[serde(default)]
    pub notes: NotesConfig,

    /// Blog feed.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Target files.
    #[serde(default)]
    pub output: OutputConfig,

    /// List lengths.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Shape of the contributions query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionQuery {
    /// All contributed repositories, identified by bare `name`.
    #[default]
    Legacy,
    /// Public repositories only, identified by `nameWithOwner`.
    OwnerQualified,
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// GraphQL endpoint.
    #[serde(default = "default_graphql_endpoint")]
    pub endpoint: Url,

    /// Name of the env var holding the bearer token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Which contributions query to run.
    #[serde(default)]
    pub query: ContributionQuery,

    /// Identifier dropped from the contribution list (the profile repo itself).
    #[serde(default)]
    pub self_repository: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            endpoint: default_graphql_endpoint(),
            token_env: default_token_env(),
            query: ContributionQuery::default(),
            self_repository: None,
        }
    }
}

fn default_graphql_endpoint() -> Url {
    Url::parse("https://api.github.com/graphql").expect("static GraphQL URL")
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}

/// `[notes]` section, tagged by `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum NotesConfig {
    /// SQL-over-HTTP endpoint returning a JSON array of rows.
    Sql {
        #[serde(default = "default_til_url")]
        url: Url,
        /// Table holding `title`, `url`, `created_utc` columns.
        #[serde(default = "default_til_table")]
        table: String,
    },
    /// Open issues created by `creator` in `repository` (`owner/name`).
    Issues { repository: String, creator: String },
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self::Sql {
            url: default_til_url(),
            table: default_til_table(),
        }
    }
}

fn default_til_url() -> Url {
    Url::parse("https://til.simonwillison.net/til.json").expect("static TIL URL")
}
fn default_til_table() -> String {
    "til".into()
}

/// `[feed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Atom feed URL.
    #[serde(default = "default_feed_url")]
    pub url: Url,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
        }
    }
}

fn default_feed_url() -> Url {
    Url::parse("https://blog.m157q.tw/feeds/category.note.atom.xml").expect("static feed URL")
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Primary file with the recent-contributions, notes and blog regions.
    #[serde(default = "default_readme")]
    pub readme: PathBuf,

    /// Detail file with the full history and the count.
    #[serde(default = "default_contributions_file")]
    pub contributions: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            readme: default_readme(),
            contributions: default_contributions_file(),
        }
    }
}

fn default_readme() -> PathBuf {
    PathBuf::from("README.md")
}
fn default_contributions_file() -> PathBuf {
    PathBuf::from("recent_contributions.md")
}

/// `[limits]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_limit")]
    pub recent_contributions: usize,
    #[serde(default = "default_limit")]
    pub notes: usize,
    #[serde(default = "default_limit")]
    pub feed_entries: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            recent_contributions: default_limit(),
            notes: default_limit(),
            feed_entries: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    5
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        match &self.notes {
            NotesConfig::Sql { table, .. } => {
                let valid = table
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !valid {
                    return Err(ReadmeError::config(format!(
                        "notes.table must be a plain SQL identifier, got {table:?}"
                    )));
                }
            }
            NotesConfig::Issues {
                repository,
                creator,
            } => {
                split_repository(repository)?;
                if creator.trim().is_empty() {
                    return Err(ReadmeError::config("notes.creator must not be empty"));
                }
            }
        }

        if self.http.timeout_secs == 0 {
            return Err(ReadmeError::config("http.timeout_secs must be at least 1"));
        }

        Ok(())
    }

    /// Read the bearer token from the configured env var, empty if unset.
    pub fn github_token(&self) -> String {
        match std::env::var(&self.github.token_env) {
            Ok(token) if !token.is_empty() => token,
            _ => {
                tracing::warn!(
                    var = %self.github.token_env,
                    "token env var is unset, GraphQL requests will be unauthenticated"
                );
                String::new()
            }
        }
    }
}

/// Split `owner/name` into its two halves.
pub fn split_repository(repository: &str) -> Result<(&str, &str)> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(ReadmeError::config(format!(
            "repository must look like owner/name, got {repository:?}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load config from `path`. Returns defaults if the file does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load and validate config from a file that must exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ReadmeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| ReadmeError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

/// Write a default config file at `path`. Refuses to overwrite.
pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ReadmeError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| ReadmeError::config(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| ReadmeError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}
