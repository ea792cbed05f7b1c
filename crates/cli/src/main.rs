//! # Rankle
//!
//! DNS reconnaissance from the command line: queries a domain through one
//! or more resolvers and prints the findings report as JSON.

mod bootstrap;
mod di;

use anyhow::Context;
use clap::Parser;
use rankle_application::DnsAnalyzer;
use rankle_domain::validators::extract_domain;
use rankle_domain::{AnalysisError, CliOverrides};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_ALL_RESOLVERS_UNREACHABLE: u8 = 2;

#[derive(Parser)]
#[command(name = "rankle")]
#[command(version)]
#[command(about = "DNS reconnaissance and misconfiguration report")]
struct Cli {
    /// Target domain (a URL is accepted, its host is used)
    domain: String,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Resolver to query, `ip` or `ip:port` (repeatable)
    #[arg(short, long = "resolver")]
    resolvers: Vec<String>,

    /// Per-query timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Total analysis budget in milliseconds
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Maximum concurrent queries
    #[arg(long)]
    concurrency: Option<usize>,

    /// Retries per failed query
    #[arg(long)]
    retries: Option<u32>,

    /// Skip the zone transfer probe
    #[arg(long)]
    no_zone_transfer: bool,

    /// Analyzer to run
    #[arg(short, long, default_value = DnsAnalyzer::NAME)]
    analyzer: String,

    /// Also write the report to a file (default name derived from the domain)
    #[arg(short, long)]
    output: Option<Option<PathBuf>>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            resolvers: (!self.resolvers.is_empty()).then(|| self.resolvers.clone()),
            timeout_per_query_ms: self.timeout_ms,
            total_budget_ms: self.budget_ms,
            max_concurrency: self.concurrency,
            max_retries: self.retries,
            disable_zone_transfer: self.no_zone_transfer,
            log_level: self.log_level.clone(),
            log_json: self.log_json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Analysis failed");
            eprintln!("Error: {:#}", e);
            if is_all_unreachable(&e) {
                ExitCode::from(EXIT_ALL_RESOLVERS_UNREACHABLE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config.logging);
    bootstrap::log_config(&config, cli.config.as_deref());

    let domain = extract_domain(&cli.domain).context("Invalid target")?;
    info!(domain = %domain, analyzer = %cli.analyzer, "Starting analysis");

    let registry = di::registry().await;
    let report = registry
        .analyze(&cli.analyzer, &domain, &config.analyzer)
        .await
        .with_context(|| format!("Analysis of {} failed", domain))?;

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);

    if let Some(output) = cli.output {
        let path = output.unwrap_or_else(|| bootstrap::default_output_path(&domain));
        bootstrap::save_json_file(&path, &report).await?;
    }

    Ok(())
}

fn is_all_unreachable(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::AllResolversUnreachable)
        )
    })
}
