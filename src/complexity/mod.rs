pub mod classes;
pub mod cognitive;
pub mod cyclomatic;

use crate::config::ComplexityThresholds;
use crate::core::ast::{node_line, node_text, walk};
use crate::core::{
    ClassMetrics, ComplexityReport, ComplexitySummary, FunctionMetrics, Rating, SourceFile,
};
use crate::parser::{self, SourceTree};
use rayon::prelude::*;
use tree_sitter::Node;

/// Score penalty weights. The overall score starts at 100 and loses up to
/// this much per dimension, scaled by the fraction of functions over the
/// corresponding threshold.
const CYCLOMATIC_PENALTY_WEIGHT: f64 = 50.0;
const COGNITIVE_PENALTY_WEIGHT: f64 = 50.0;

/// Structural complexity pass over the whole file set. Files are analyzed
/// in parallel into per-file accumulators and merged once at the end. A
/// syntax error suppresses only its own subtree; functions outside it are
/// still measured, and even a fully unparseable file counts in the
/// aggregate summary.
pub fn analyze(files: &[SourceFile], thresholds: &ComplexityThresholds) -> ComplexityReport {
    let per_file: Vec<(Vec<FunctionMetrics>, Vec<ClassMetrics>)> = files
        .par_iter()
        .map(|file| match parser::parse_or_warn(file) {
            Some(tree) => (
                extract_functions(&tree, thresholds),
                classes::extract_classes(&tree),
            ),
            None => (Vec::new(), Vec::new()),
        })
        .collect();

    let mut functions = Vec::new();
    let mut class_metrics = Vec::new();
    for (funcs, classes) in per_file {
        functions.extend(funcs);
        class_metrics.extend(classes);
    }
    functions.sort_by(|a, b| {
        (&a.file, a.line, &a.name).cmp(&(&b.file, b.line, &b.name))
    });
    class_metrics.sort_by(|a, b| (&a.file, a.line, &a.name).cmp(&(&b.file, b.line, &b.name)));

    let overall = summarize(&functions, thresholds);
    ComplexityReport {
        functions,
        classes: class_metrics,
        overall,
    }
}

pub fn extract_functions(
    tree: &SourceTree,
    thresholds: &ComplexityThresholds,
) -> Vec<FunctionMetrics> {
    let mut functions = Vec::new();
    walk(tree.root(), tree.source(), |node, kind, _| {
        if kind.is_function() {
            functions.push(analyze_function(node, tree, thresholds));
        }
    });
    functions
}

fn analyze_function(
    node: Node,
    tree: &SourceTree,
    thresholds: &ComplexityThresholds,
) -> FunctionMetrics {
    let source = tree.source();
    let mut metrics = FunctionMetrics::new(
        function_name(node, source),
        tree.path().to_path_buf(),
        node_line(&node),
    );

    metrics.cyclomatic = cyclomatic::cyclomatic_complexity(node, source);
    metrics.cognitive = cognitive::cognitive_complexity(node, source);
    metrics.nesting = cognitive::max_nesting(node, source);
    metrics.length = node.end_position().row - node.start_position().row + 1;
    metrics.params = param_count(node);
    metrics.warnings = threshold_warnings(&metrics, thresholds);
    metrics
}

fn threshold_warnings(metrics: &FunctionMetrics, thresholds: &ComplexityThresholds) -> Vec<String> {
    let mut warnings = Vec::new();
    if metrics.cyclomatic > thresholds.max_cyclomatic {
        warnings.push(format!(
            "cyclomatic complexity {} exceeds threshold {}",
            metrics.cyclomatic, thresholds.max_cyclomatic
        ));
    }
    if metrics.cognitive > thresholds.max_cognitive {
        warnings.push(format!(
            "cognitive complexity {} exceeds threshold {}",
            metrics.cognitive, thresholds.max_cognitive
        ));
    }
    if metrics.nesting > thresholds.max_nesting {
        warnings.push(format!(
            "nesting depth {} exceeds threshold {}",
            metrics.nesting, thresholds.max_nesting
        ));
    }
    warnings
}

fn function_name(node: Node, source: &str) -> String {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "identifier" || child.kind() == "property_identifier" {
            return node_text(&child, source).to_string();
        }
    }

    // Arrow functions take their name from the variable they are bound to.
    if node.kind() == "arrow_function" {
        if let Some(parent) = node.parent() {
            if parent.kind() == "variable_declarator" {
                if let Some(name) = parent.child_by_field_name("name") {
                    return node_text(&name, source).to_string();
                }
            }
        }
    }

    "<anonymous>".to_string()
}

fn param_count(node: Node) -> u32 {
    if let Some(params) = node.child_by_field_name("parameters") {
        params.named_child_count() as u32
    } else if node.child_by_field_name("parameter").is_some() {
        // Arrow function with a single bare parameter.
        1
    } else {
        0
    }
}

fn summarize(functions: &[FunctionMetrics], thresholds: &ComplexityThresholds) -> ComplexitySummary {
    let total = functions.len();
    if total == 0 {
        return ComplexitySummary {
            score: 100,
            rating: Rating::Excellent,
            total_functions: 0,
            average_cyclomatic: 0.0,
            max_cyclomatic: 0,
            over_threshold: 0,
        };
    }

    let over_cyclomatic = functions
        .iter()
        .filter(|f| f.cyclomatic > thresholds.max_cyclomatic)
        .count();
    let over_cognitive = functions
        .iter()
        .filter(|f| f.cognitive > thresholds.max_cognitive)
        .count();

    let penalty = (over_cyclomatic as f64 / total as f64 * CYCLOMATIC_PENALTY_WEIGHT
        + over_cognitive as f64 / total as f64 * COGNITIVE_PENALTY_WEIGHT)
        .min(100.0);
    let score = (100.0 - penalty).round() as u32;

    ComplexitySummary {
        score,
        rating: Rating::from_score(score),
        total_functions: total,
        average_cyclomatic: functions.iter().map(|f| f.cyclomatic as f64).sum::<f64>()
            / total as f64,
        max_cyclomatic: functions.iter().map(|f| f.cyclomatic).max().unwrap_or(0),
        over_threshold: over_cyclomatic,
    }
}
