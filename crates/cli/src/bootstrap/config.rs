use anyhow::Context;
use rankle_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config =
        Config::load(config_path, cli_overrides).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Called once the subscriber is installed.
pub fn log_config(config: &Config, config_path: Option<&str>) {
    info!(
        config_file = config_path.unwrap_or("default"),
        resolvers = ?config.analyzer.resolvers,
        timeout_ms = config.analyzer.timeout_per_query_ms,
        budget_ms = config.analyzer.total_budget_ms,
        concurrency = config.analyzer.max_concurrency,
        retries = config.analyzer.max_retries,
        zone_transfer = config.analyzer.zone_transfer,
        "Configuration loaded"
    );
}
