//! Shared types, error model, and configuration for readmegen.
//!
//! This crate is the foundation depended on by all other readmegen crates.
//! It provides:
//! - [`ReadmeError`], the unified error type
//! - Domain records ([`ContributionRecord`], [`NoteRecord`], [`FeedEntry`])
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, ContributionQuery, FeedConfig, GithubConfig, HttpConfig,
    LimitsConfig, NotesConfig, OutputConfig, init_config, load_config, load_config_from,
    split_repository,
};
pub use error::{ReadmeError, Result};
pub use types::{ContributionRecord, FeedEntry, NoteRecord, day_of, strip_fragment};
