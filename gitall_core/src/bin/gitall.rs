//! gitall: report which of many git working copies need attention.
//!
//! ```text
//! gitall status [--auth key-file|agent|none] [-k <key>] [-j <jobs>] [--json] <path>...
//! gitall where <path>...
//! gitall providers
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitall_auth::{default_registry, AuthSettings, DEFAULT_KEY_PATH};
use gitall_auth_api::DEFAULT_USERNAME;
use gitall_core::render::{render_json, render_report, render_whereabouts, RenderOptions};
use gitall_core::{whereabouts, BatchClassifier, GitAccessor, ReconcileMode, DEFAULT_REMOTE};

#[derive(Parser, Debug)]
#[command(
    name = "gitall",
    version,
    about = "Report which of many git working copies need a commit, a sync, or attention",
    long_about = None,
)]
struct Cli {
    /// Remote compared against.
    #[arg(long, global = true, env = "GITALL_REMOTE", default_value = DEFAULT_REMOTE)]
    remote: String,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch every repository and classify it.
    Status(StatusArgs),

    /// Show the checked-out branch and remote URL of every repository.
    Where(WhereArgs),

    /// List the available credential providers.
    Providers,
}

#[derive(Args, Debug)]
struct AuthArgs {
    /// Credential provider used for fetching.
    #[arg(long = "auth", env = "GITALL_AUTH", default_value = "key-file")]
    provider: String,

    /// SSH private key for the key-file provider.
    #[arg(short = 'k', long = "key", env = "GITALL_SSH_KEY", default_value = DEFAULT_KEY_PATH)]
    key_path: String,

    /// Username offered when the remote URL has none.
    #[arg(long, default_value = DEFAULT_USERNAME)]
    username: String,
}

impl AuthArgs {
    fn settings(&self) -> AuthSettings {
        AuthSettings {
            key_path: self.key_path.clone(),
            username: self.username.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct StatusArgs {
    /// Working copies to check.
    #[arg(required = true)]
    paths: Vec<String>,

    #[command(flatten)]
    auth: AuthArgs,

    /// Repositories processed at once.
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Abort a fetch after this many seconds of transfer.
    #[arg(long, value_name = "SECONDS")]
    fetch_timeout: Option<u64>,

    /// Report every divergent branch and change, not only the first.
    #[arg(long)]
    exhaustive: bool,

    /// Emit the report as JSON.
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors.
    #[arg(long)]
    no_color: bool,
}

#[derive(Args, Debug)]
struct WhereArgs {
    /// Working copies to inspect.
    #[arg(required = true)]
    paths: Vec<String>,

    /// Disable ANSI colors.
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Status(args) => run_status(args, &cli.remote),
        Commands::Where(args) => {
            run_where(&args, &cli.remote);
            Ok(())
        }
        Commands::Providers => {
            for summary in default_registry(&AuthSettings::default()).summaries() {
                println!("{:<10} {}", summary.id, summary.label);
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("gitall={level},gitall_core={level}"))
            .context("invalid log filter")?,
    };

    // Logs go to stderr so the report on stdout stays scrapeable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run_status(args: StatusArgs, remote: &str) -> Result<()> {
    let registry = default_registry(&args.auth.settings());
    let credentials = registry
        .resolve(&args.auth.provider)
        .with_context(|| format!("could not resolve credentials via '{}'", args.auth.provider))?;

    let accessor = GitAccessor::new().with_fetch_timeout(args.fetch_timeout.map(Duration::from_secs));
    let mode = if args.exhaustive {
        ReconcileMode::Exhaustive
    } else {
        ReconcileMode::FirstMatch
    };
    let classifier = BatchClassifier::new(accessor)
        .with_mode(mode)
        .with_jobs(args.jobs);

    let report = classifier.classify(&args.paths, remote, &credentials);
    tracing::debug!(
        errors = report.errors.len(),
        in_sync = report.in_sync.len(),
        needs_commit = report.needs_commit.len(),
        needs_sync = report.needs_sync.len(),
        "batch complete"
    );

    if args.json {
        println!("{}", render_json(&report).context("failed to serialize report")?);
    } else {
        print!("{}", render_report(&report, render_options(args.no_color)));
    }
    Ok(())
}

fn run_where(args: &WhereArgs, remote: &str) {
    let entries = whereabouts::locate(&args.paths, remote);
    print!("{}", render_whereabouts(&entries, render_options(args.no_color)));
}

fn render_options(no_color: bool) -> RenderOptions {
    if no_color {
        colored::control::set_override(false);
    }
    RenderOptions { color: !no_color }
}
