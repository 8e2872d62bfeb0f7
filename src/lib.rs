pub mod aggregator;
pub mod complexity;
pub mod config;
pub mod core;
pub mod dependency;
pub mod parser;
pub mod performance;
pub mod security;

pub use crate::config::{AnalysisConfig, ComplexityThresholds, PerformanceRules, SecurityRules};
pub use crate::core::{
    AnalysisReport, Bottleneck, ClassMetrics, ComplexityReport, DependencyReport, FunctionMetrics,
    Impact, PerformanceReport, Priority, Rating, Recommendation, SecurityReport, Severity,
    SourceFile, Summary, Vulnerability,
};
pub use crate::parser::{ParseError, SourceTree};

/// Run the full analysis over an in-memory file set.
///
/// The four analyzers are independent and run concurrently; each one
/// parallelizes over files internally with per-file accumulators. The
/// aggregation below the join is the only synchronization point. One
/// malformed file never prevents reporting on the rest of the batch.
pub fn analyze(files: &[SourceFile], config: &AnalysisConfig) -> AnalysisReport {
    let ((complexity, security), (performance, dependencies)) = rayon::join(
        || {
            rayon::join(
                || complexity::analyze(files, &config.complexity),
                || security::analyze(files, &config.security),
            )
        },
        || {
            rayon::join(
                || performance::analyze(files, &config.performance),
                || dependency::analyze(files),
            )
        },
    );

    aggregator::aggregate(complexity, security, performance, dependencies, files)
}
