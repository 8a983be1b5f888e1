//! End-to-end update: fetch sources → render lists → splice target files.
//!
//! The three fetches run concurrently and fail independently. A failed
//! source leaves its marker regions untouched while the others still update;
//! the failures come back in [`UpdateReport::failures`].

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use reqwest::Client;
use tracing::{info, instrument, warn};

use readmegen_markdown as md;
use readmegen_shared::{
    AppConfig, ContributionRecord, FeedEntry, NoteRecord, NotesConfig, ReadmeError, Result,
    split_repository,
};
use readmegen_sources::GithubClient;

use crate::update::{self, Edit, FileOutcome};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// The three independent inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Contributions,
    Notes,
    Feed,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Contributions => "contributions",
            Self::Notes => "notes",
            Self::Feed => "feed",
        })
    }
}

/// A source that could not be fetched.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: Source,
    pub error: ReadmeError,
}

/// Result of one [`Pipeline::run`].
#[derive(Debug)]
pub struct UpdateReport {
    /// Contribution records after self-filtering.
    pub contributions: usize,
    pub notes: usize,
    pub feed_entries: usize,
    /// README first, then the contributions detail file.
    pub files: Vec<FileOutcome>,
    pub failures: Vec<SourceFailure>,
    pub elapsed: std::time::Duration,
}

impl UpdateReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once per source after its fetch settles.
    fn source_done(&self, source: Source, ok: bool);
    /// Called when the pipeline completes.
    fn done(&self, report: &UpdateReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn source_done(&self, _source: Source, _ok: bool) {}
    fn done(&self, _report: &UpdateReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Options for a single run, usually from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Override `output.readme`.
    pub readme: Option<PathBuf>,
    /// Override `output.contributions`.
    pub contributions: Option<PathBuf>,
    /// Compute everything but write nothing.
    pub dry_run: bool,
}

/// Configured fetchers plus rendering settings.
///
/// Clients are passed in so tests can point them at a mock server.
pub struct Pipeline {
    config: AppConfig,
    http: Client,
    github: GithubClient,
}

impl Pipeline {
    pub fn new(config: AppConfig, http: Client, github: GithubClient) -> Self {
        Self {
            config,
            http,
            github,
        }
    }

    /// Build both clients from `config` and the given bearer token.
    pub fn from_config(config: AppConfig, token: impl Into<String>) -> Result<Self> {
        let http = readmegen_sources::build_client(&config.http)?;
        let github = GithubClient::new(http.clone(), config.github.endpoint.clone(), token);
        Ok(Self::new(config, http, github))
    }

    async fn fetch_contributions(&self) -> Result<Vec<ContributionRecord>> {
        self.github
            .fetch_contributions(
                self.config.github.query,
                self.config.github.self_repository.as_deref(),
            )
            .await
    }

    async fn fetch_notes(&self) -> Result<Vec<NoteRecord>> {
        let limit = self.config.limits.notes;
        match &self.config.notes {
            NotesConfig::Sql { url, table } => {
                readmegen_sources::fetch_sql_notes(&self.http, url, table, limit).await
            }
            NotesConfig::Issues {
                repository,
                creator,
            } => {
                let (owner, name) = split_repository(repository)?;
                self.github
                    .fetch_issue_notes(owner, name, creator, limit)
                    .await
            }
        }
    }

    async fn fetch_feed(&self) -> Result<Vec<FeedEntry>> {
        readmegen_sources::fetch_feed(&self.http, &self.config.feed.url).await
    }

    /// Fetch every source and rewrite both target files.
    ///
    /// Source failures are collected, not returned; only file errors abort.
    #[instrument(skip_all, fields(dry_run = opts.dry_run))]
    pub async fn run(
        &self,
        opts: &RunOptions,
        progress: &dyn ProgressReporter,
    ) -> Result<UpdateReport> {
        let start = Instant::now();
        let limits = &self.config.limits;

        let readme_path = opts
            .readme
            .clone()
            .unwrap_or_else(|| self.config.output.readme.clone());
        let contributions_path = opts
            .contributions
            .clone()
            .unwrap_or_else(|| self.config.output.contributions.clone());

        // --- Phase 1: Fetch ---
        progress.phase("Fetching contributions, notes and feed");
        let (contributions, notes, feed) = tokio::join!(
            self.fetch_contributions(),
            self.fetch_notes(),
            self.fetch_feed(),
        );

        let mut failures = Vec::new();
        let mut readme_edits = Vec::new();
        let mut detail_edits = Vec::new();
        let mut report_counts = (0, 0, 0);

        // --- Phase 2: Render ---
        progress.phase("Rendering Markdown");
        match contributions {
            Ok(mut records) => {
                progress.source_done(Source::Contributions, true);
                md::sort_contributions(&mut records);
                readme_edits.push(Edit::block(
                    md::RECENT_CONTRIBUTIONS,
                    md::recent_contributions_md(&records, limits.recent_contributions),
                ));
                detail_edits.push(Edit::block(
                    md::RECENT_CONTRIBUTIONS,
                    md::contribution_history_md(&records),
                ));
                detail_edits.push(Edit::inline(
                    md::RECENT_CONTRIBUTIONS_COUNT,
                    md::contribution_count(&records),
                ));
                report_counts.0 = records.len();
            }
            Err(error) => {
                progress.source_done(Source::Contributions, false);
                failures.push(source_failed(Source::Contributions, error));
            }
        }

        match notes {
            Ok(notes) => {
                progress.source_done(Source::Notes, true);
                readme_edits.push(Edit::block(md::TILS, md::notes_md(&notes, limits.notes)));
                report_counts.1 = notes.len();
            }
            Err(error) => {
                progress.source_done(Source::Notes, false);
                failures.push(source_failed(Source::Notes, error));
            }
        }

        match feed {
            Ok(entries) => {
                progress.source_done(Source::Feed, true);
                readme_edits.push(Edit::block(
                    md::BLOG,
                    md::feed_md(&entries, limits.feed_entries),
                ));
                report_counts.2 = entries.len();
            }
            Err(error) => {
                progress.source_done(Source::Feed, false);
                failures.push(source_failed(Source::Feed, error));
            }
        }

        // --- Phase 3: Rewrite files ---
        progress.phase("Updating files");
        let files = vec![
            update::rewrite_file(&readme_path, readme_edits, opts.dry_run)?,
            update::rewrite_file(&contributions_path, detail_edits, opts.dry_run)?,
        ];

        let report = UpdateReport {
            contributions: report_counts.0,
            notes: report_counts.1,
            feed_entries: report_counts.2,
            files,
            failures,
            elapsed: start.elapsed(),
        };

        info!(
            contributions = report.contributions,
            notes = report.notes,
            feed_entries = report.feed_entries,
            failed = report.failures.len(),
            "update finished"
        );

        progress.done(&report);
        Ok(report)
    }
}

fn source_failed(source: Source, error: ReadmeError) -> SourceFailure {
    warn!(%source, %error, "source failed, its regions are left untouched");
    SourceFailure { source, error }
}
