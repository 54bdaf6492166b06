use clap::{Args, Parser, Subcommand};
use github_reports::config::{parse_repo_list, AppConfig};
use github_reports::metrics::BurndownMode;
use github_reports::render::{BreakdownChart, ResolutionChart};
use github_reports::{FetchOptions, ReportService};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Generate project management charts from GitHub data.
#[derive(Debug, Parser)]
#[command(name = "github-reports", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a burndown chart from issues.
    Burndown {
        #[command(flatten)]
        source: SourceArgs,
        /// How open and closed issues are counted.
        #[arg(long, value_enum, default_value_t)]
        mode: BurndownMode,
        #[arg(long, default_value = "burndown.png")]
        output: PathBuf,
    },
    /// Generate a weekly commit count summary per user.
    CommitSummary {
        #[command(flatten)]
        source: SourceArgs,
        /// Number of months to summarize.
        #[arg(long, default_value_t = 3)]
        months: u32,
        #[arg(long, default_value = "commits.png")]
        output: PathBuf,
    },
    /// Generate an issue type breakdown chart (by label).
    IssueTypeBreakdown {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum, default_value_t)]
        chart_type: BreakdownChart,
        #[arg(long, default_value = "issue_type_breakdown.png")]
        output: PathBuf,
    },
    /// Generate a PR activity timeline chart (opened/closed/merged per week).
    PrActivityTimeline {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "pr_activity_timeline.png")]
        output: PathBuf,
    },
    /// Generate a chart of time taken to close issues (histogram or box plot).
    IssueResolutionTime {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum, default_value_t)]
        chart_type: ResolutionChart,
        #[arg(long, default_value = "issue_resolution_time.png")]
        output: PathBuf,
    },
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// GitHub repositories as owner/repo, comma-separated.
    #[arg(long)]
    repo: String,

    /// GitHub personal access token. Defaults to GITHUB_TOKEN.
    #[arg(long)]
    token: Option<String>,

    /// Directory for cached API responses. Defaults to CACHE_DIR or the platform cache.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Ignore cached responses and refetch everything.
    #[arg(long)]
    no_cache: bool,
}

impl SourceArgs {
    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            token: self.token.clone(),
            cache_dir: self.cache_dir.clone(),
            no_cache: self.no_cache,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment may already be configured.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "github_reports=debug"
    } else {
        "github_reports=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let (source, output) = match &command {
        Command::Burndown { source, output, .. }
        | Command::CommitSummary { source, output, .. }
        | Command::IssueTypeBreakdown { source, output, .. }
        | Command::PrActivityTimeline { source, output }
        | Command::IssueResolutionTime { source, output, .. } => (source, output),
    };

    let repos = parse_repo_list(&source.repo)?;
    let service = ReportService::new(&config, source.fetch_options())?;
    let names: Vec<String> = repos.iter().map(ToString::to_string).collect();
    tracing::info!("Generating report for {}", names.join(", "));

    match &command {
        Command::Burndown { mode, .. } => service.burndown(&repos, *mode, output).await?,
        Command::CommitSummary { months, .. } => {
            service.commit_summary(&repos, *months, output).await?
        }
        Command::IssueTypeBreakdown { chart_type, .. } => {
            service.label_breakdown(&repos, *chart_type, output).await?
        }
        Command::PrActivityTimeline { .. } => service.pull_request_activity(&repos, output).await?,
        Command::IssueResolutionTime { chart_type, .. } => {
            service.resolution_time(&repos, *chart_type, output).await?
        }
    }

    println!("Chart written to {}", output.display());
    Ok(())
}
