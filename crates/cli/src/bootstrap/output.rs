use anyhow::Context;
use rankle_domain::validators::sanitize_filename;
use rankle_domain::Report;
use std::path::{Path, PathBuf};
use tracing::info;

/// `<domain>_dns.json` in the working directory.
pub fn default_output_path(domain: &str) -> PathBuf {
    PathBuf::from(format!("{}_dns.json", sanitize_filename(domain)))
}

/// Write the report as pretty JSON, creating parent directories.
pub async fn save_json_file(path: &Path, report: &Report) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    info!(path = %path.display(), "Report saved");
    Ok(())
}
