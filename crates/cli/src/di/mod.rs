use rankle_application::{AnalyzerRegistry, DnsAnalyzer};
use rankle_infrastructure::dns::WireDnsResolver;
use rankle_infrastructure::system::system_nameservers;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static REGISTRY: OnceLock<AnalyzerRegistry> = OnceLock::new();

/// Build the analyzer table on first call; later calls return the same one.
pub async fn registry() -> &'static AnalyzerRegistry {
    if let Some(registry) = REGISTRY.get() {
        return registry;
    }

    let fallback = system_nameservers().await;
    let resolver = Arc::new(WireDnsResolver::new());
    let dns = DnsAnalyzer::new(resolver, fallback);

    let registry = REGISTRY.get_or_init(|| {
        AnalyzerRegistry::builder()
            .register(Arc::new(dns))
            .build()
    });
    debug!(analyzers = ?registry.names(), "Analyzer registry ready");
    registry
}
