pub mod assembler;
pub mod cache;
pub mod normalizer;
pub mod planner;
pub mod scheduler;

pub use assembler::{ReportAssembler, RunSummary};
pub use cache::QueryCache;
pub use normalizer::{canonical_address, canonical_name, Normalizer};
pub use planner::{generate_probe_label, QueryPlanner};
pub use scheduler::{QueryScheduler, RetryPolicy, RoundResult, BUDGET_EXHAUSTED};
