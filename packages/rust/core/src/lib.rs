//! Pipeline orchestration for readmegen.
//!
//! Ties the fetchers, the list renderers, and the marker splicer together
//! into one run over the README and the contributions detail file.

pub mod pipeline;
pub mod update;

pub use pipeline::{
    Pipeline, ProgressReporter, RunOptions, SilentProgress, Source, SourceFailure, UpdateReport,
};
pub use update::{Edit, FileOutcome};
