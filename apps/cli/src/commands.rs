//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use readmegen_core::{Pipeline, ProgressReporter, RunOptions, Source, UpdateReport};
use readmegen_shared::{AppConfig, CONFIG_FILE_NAME, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// readmegen: keep a profile README's generated lists fresh.
#[derive(Parser)]
#[command(
    name = "readmegen",
    version,
    about = "Refresh recent contributions, notes and blog posts in a README.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to the config file.
    #[arg(long, global = true, env = "READMEGEN_CONFIG", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch all sources and rewrite the marker regions.
    Update {
        /// README to update (overrides `output.readme`).
        #[arg(long)]
        readme: Option<PathBuf>,

        /// Contributions detail file (overrides `output.contributions`).
        #[arg(long)]
        contributions: Option<PathBuf>,

        /// Print the generated blocks instead of writing files.
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "readmegen=info",
        1 => "readmegen=debug",
        _ => "readmegen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Update {
            readme,
            contributions,
            dry_run,
        } => {
            let opts = RunOptions {
                readme,
                contributions,
                dry_run,
            };
            cmd_update(&cli.config, &opts).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&cli.config),
            ConfigAction::Show => cmd_config_show(&cli.config),
        },
    }
}

async fn cmd_update(config_path: &Path, opts: &RunOptions) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let token = config.github_token();

    info!(
        config = %config_path.display(),
        query = ?config.github.query,
        dry_run = opts.dry_run,
        "updating README"
    );

    let pipeline = Pipeline::from_config(config, token)?;
    let reporter = CliProgress::new();
    let report = pipeline.run(opts, &reporter).await?;

    if opts.dry_run {
        print_dry_run(&report);
    }
    print_summary(&report);

    if report.is_success() {
        Ok(())
    } else {
        let failed: Vec<String> = report
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.source, f.error))
            .collect();
        Err(eyre!(
            "{} source(s) failed, their regions were left as they were:\n  {}",
            failed.len(),
            failed.join("\n  ")
        ))
    }
}

fn print_dry_run(report: &UpdateReport) {
    for file in &report.files {
        for edit in &file.edits {
            println!("--- {} [{}]", file.path.display(), edit.marker);
            println!("{}", edit.chunk);
        }
    }
}

fn print_summary(report: &UpdateReport) {
    println!();
    println!("  Contributions: {}", report.contributions);
    println!("  Notes:         {}", report.notes);
    println!("  Blog entries:  {}", report.feed_entries);
    for file in &report.files {
        let state = match (file.changed, file.written) {
            (true, true) => "updated",
            (true, false) => "would change",
            (false, _) => "unchanged",
        };
        println!("  {:<14} {}", state, file.path.display());
        for marker in &file.missing_markers {
            println!("    missing marker: {marker}");
        }
    }
    println!("  Time:          {:.1}s", report.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn source_done(&self, source: Source, ok: bool) {
        let mark = if ok { "✓" } else { "✗" };
        self.spinner.println(format!("  {mark} {source}"));
    }

    fn done(&self, _report: &UpdateReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init(path: &Path) -> Result<()> {
    init_config(path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
