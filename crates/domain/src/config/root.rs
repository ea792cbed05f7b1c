use super::analyzer::AnalyzerConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration, loaded from TOML and overridden by CLI flags.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line. `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub resolvers: Option<Vec<String>>,
    pub timeout_per_query_ms: Option<u64>,
    pub total_budget_ms: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub max_retries: Option<u32>,
    pub disable_zone_transfer: bool,
    pub log_level: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// Load configuration from `path` (if any) and apply CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(resolvers) = overrides.resolvers {
            self.analyzer.resolvers = resolvers;
        }
        if let Some(ms) = overrides.timeout_per_query_ms {
            self.analyzer.timeout_per_query_ms = ms;
        }
        if let Some(ms) = overrides.total_budget_ms {
            self.analyzer.total_budget_ms = ms;
        }
        if let Some(n) = overrides.max_concurrency {
            self.analyzer.max_concurrency = n;
        }
        if let Some(n) = overrides.max_retries {
            self.analyzer.max_retries = n;
        }
        if overrides.disable_zone_transfer {
            self.analyzer.zone_transfer = false;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if overrides.log_json {
            self.logging.json = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyzer.validate().map_err(ConfigError::Validation)?;

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level '{}', expected one of {:?}",
                self.logging.level, LOG_LEVELS
            )));
        }
        Ok(())
    }
}
