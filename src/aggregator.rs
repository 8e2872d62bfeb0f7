use crate::core::{
    AnalysisReport, ComplexityReport, DependencyReport, Impact, PerformanceReport, Priority,
    Rating, Recommendation, SecurityReport, Severity, SourceFile, Summary,
};

/// Fold the four partial results into the final report. Pure aggregation
/// over already-validated inputs; this step cannot fail. Summary totals
/// count every input file, parse failures included.
pub fn aggregate(
    complexity: ComplexityReport,
    security: SecurityReport,
    performance: PerformanceReport,
    dependencies: DependencyReport,
    files: &[SourceFile],
) -> AnalysisReport {
    let summary = Summary {
        total_files: files.len(),
        total_lines: files.iter().map(|f| f.content.lines().count()).sum(),
    };

    let recommendations = recommend(&complexity, &security, &performance, &dependencies);

    AnalysisReport {
        complexity,
        security,
        performance,
        dependencies,
        summary,
        recommendations,
    }
}

/// One prioritized action item per dimension that has findings, worst first.
fn recommend(
    complexity: &ComplexityReport,
    security: &SecurityReport,
    performance: &PerformanceReport,
    dependencies: &DependencyReport,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if let Some(worst) = security
        .vulnerabilities
        .iter()
        .map(|v| v.severity)
        .max()
    {
        let count = security.vulnerabilities.len();
        recommendations.push(Recommendation {
            priority: priority_for_severity(worst),
            message: format!(
                "address {count} security finding{} (worst severity: {worst})",
                plural(count)
            ),
        });
    }

    if complexity.overall.over_threshold > 0 {
        let count = complexity.overall.over_threshold;
        let priority = match complexity.overall.rating {
            Rating::Critical => Priority::Critical,
            Rating::Poor => Priority::High,
            _ => Priority::Medium,
        };
        recommendations.push(Recommendation {
            priority,
            message: format!(
                "refactor {count} function{} above the cyclomatic complexity threshold",
                plural(count)
            ),
        });
    }

    if let Some(worst) = performance.bottlenecks.iter().map(|b| b.severity).max() {
        let count = performance.bottlenecks.len();
        recommendations.push(Recommendation {
            priority: priority_for_impact(worst),
            message: format!(
                "resolve {count} performance bottleneck{} (worst severity: {worst})",
                plural(count)
            ),
        });
    }

    if !dependencies.cycles.is_empty() {
        let count = dependencies.cycles.len();
        recommendations.push(Recommendation {
            priority: Priority::High,
            message: format!("break {count} circular import chain{}", plural(count)),
        });
    }

    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
    recommendations
}

fn priority_for_severity(severity: Severity) -> Priority {
    match severity {
        Severity::Critical => Priority::Critical,
        Severity::High => Priority::High,
        Severity::Medium => Priority::Medium,
        Severity::Low => Priority::Low,
    }
}

fn priority_for_impact(impact: Impact) -> Priority {
    match impact {
        Impact::High => Priority::High,
        Impact::Medium => Priority::Medium,
        Impact::Low => Priority::Low,
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
