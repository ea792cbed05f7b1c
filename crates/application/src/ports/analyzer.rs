use async_trait::async_trait;
use rankle_domain::{AnalysisError, AnalyzerConfig, Report};

#[async_trait]
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn analyze(&self, domain: &str, config: &AnalyzerConfig)
        -> Result<Report, AnalysisError>;
}
