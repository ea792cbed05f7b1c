use rankle_domain::LoggingConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr, stdout carries the
/// report. `RUST_LOG` overrides the configured level when set.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true);

    if config.json {
        builder.json().init();
    } else {
        builder.with_ansi(true).init();
    }

    debug!(level = %config.level, json = config.json, "Logging initialized");
}
