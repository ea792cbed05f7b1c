use crate::ports::Analyzer;
use rankle_domain::{AnalysisError, AnalyzerConfig, Report};
use std::sync::Arc;
use tracing::warn;

/// Immutable table of analyzers, built once at startup.
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

#[derive(Default)]
pub struct AnalyzerRegistryBuilder {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerRegistryBuilder {
    /// Registering a second analyzer under the same name replaces the first.
    pub fn register(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        if let Some(pos) = self
            .analyzers
            .iter()
            .position(|a| a.name() == analyzer.name())
        {
            warn!(analyzer = analyzer.name(), "Replacing registered analyzer");
            self.analyzers[pos] = analyzer;
        } else {
            self.analyzers.push(analyzer);
        }
        self
    }

    pub fn build(self) -> AnalyzerRegistry {
        AnalyzerRegistry {
            analyzers: self.analyzers,
        }
    }
}

impl AnalyzerRegistry {
    pub fn builder() -> AnalyzerRegistryBuilder {
        AnalyzerRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Analyzer>> {
        self.analyzers
            .iter()
            .find(|a| a.name() == name)
            .map(Arc::clone)
    }

    /// Registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    pub async fn analyze(
        &self,
        name: &str,
        domain: &str,
        config: &AnalyzerConfig,
    ) -> Result<Report, AnalysisError> {
        let analyzer = self
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownAnalyzer(name.to_string()))?;
        analyzer.analyze(domain, config).await
    }
}
