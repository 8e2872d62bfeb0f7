pub mod ast;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One unit of input: a path plus its in-memory contents.
///
/// Files are owned by the caller and borrowed read-only by every analyzer.
/// A file whose contents could not be read is represented with empty text
/// rather than omitted, so it still participates in summary totals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Copy)]
pub enum Language {
    JavaScript,
    TypeScript,
    Tsx,
    Unknown,
}

impl Language {
    pub fn from_path(path: &std::path::Path) -> Language {
        match path.extension().and_then(|e| e.to_str()) {
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => Language::JavaScript,
            Some("ts") | Some("mts") | Some("cts") => Language::TypeScript,
            Some("tsx") => Language::Tsx,
            _ => Language::Unknown,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionMetrics {
    pub name: String,
    pub file: PathBuf,
    pub line: usize,
    pub cyclomatic: u32,
    pub cognitive: u32,
    pub nesting: u32,
    pub length: usize,
    pub params: u32,
    pub warnings: Vec<String>,
}

impl FunctionMetrics {
    pub fn new(name: String, file: PathBuf, line: usize) -> Self {
        Self {
            name,
            file,
            line,
            cyclomatic: 1,
            cognitive: 0,
            nesting: 0,
            length: 0,
            params: 0,
            warnings: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassMetrics {
    pub name: String,
    pub file: PathBuf,
    pub line: usize,
    pub complexity: u32,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
    pub cohesion: f64,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Copy, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl Rating {
    /// Rating bands: >=90 excellent, >=75 good, >=55 fair, >=30 poor, else critical.
    pub fn from_score(score: u32) -> Rating {
        match score {
            90..=u32::MAX => Rating::Excellent,
            75..=89 => Rating::Good,
            55..=74 => Rating::Fair,
            30..=54 => Rating::Poor,
            _ => Rating::Critical,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rating::Excellent => "excellent",
            Rating::Good => "good",
            Rating::Fair => "fair",
            Rating::Poor => "poor",
            Rating::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComplexitySummary {
    pub score: u32,
    pub rating: Rating,
    pub total_functions: usize,
    pub average_cyclomatic: f64,
    pub max_cyclomatic: u32,
    pub over_threshold: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComplexityReport {
    pub functions: Vec<FunctionMetrics>,
    pub classes: Vec<ClassMetrics>,
    pub overall: ComplexitySummary,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vulnerability {
    pub kind: String,
    pub severity: Severity,
    pub message: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SecurityReport {
    pub vulnerabilities: Vec<Vulnerability>,
    pub score: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Copy, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bottleneck {
    pub kind: String,
    pub severity: Impact,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PerformanceReport {
    pub bottlenecks: Vec<Bottleneck>,
    pub anti_patterns: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Import,
    Export,
}

/// One raw import/export relationship extracted from a single file, before
/// internal/external classification.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DependencyEdge {
    pub from: PathBuf,
    pub to: String,
    pub kind: EdgeKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DependencyReport {
    /// Resolved file paths of modules referenced from within the analyzed set.
    pub internal: std::collections::BTreeSet<String>,
    /// Raw specifiers of modules outside the analyzed set.
    pub external: std::collections::BTreeSet<String>,
    /// Each simple cycle once, as a closed path without repeating the first
    /// element, rotated so the lexically smallest file leads.
    pub cycles: Vec<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_files: usize,
    pub total_lines: usize,
}

/// Aggregate result of one analysis run. Serializes to a plain tree of
/// values so downstream renderers need no further processing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub complexity: ComplexityReport,
    pub security: SecurityReport,
    pub performance: PerformanceReport,
    pub dependencies: DependencyReport,
    pub summary: Summary,
    pub recommendations: Vec<Recommendation>,
}
