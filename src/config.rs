use serde::{Deserialize, Serialize};

fn default_max_cyclomatic() -> u32 {
    10
}

fn default_max_cognitive() -> u32 {
    15
}

fn default_max_nesting() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

/// Thresholds above which a function earns a warning. Injected rather than
/// hard-coded so callers can tune sensitivity per project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplexityThresholds {
    #[serde(default = "default_max_cyclomatic")]
    pub max_cyclomatic: u32,
    #[serde(default = "default_max_cognitive")]
    pub max_cognitive: u32,
    #[serde(default = "default_max_nesting")]
    pub max_nesting: u32,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            max_cyclomatic: default_max_cyclomatic(),
            max_cognitive: default_max_cognitive(),
            max_nesting: default_max_nesting(),
        }
    }
}

/// Per-category toggles for security rules. All enabled by default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityRules {
    #[serde(default = "default_true")]
    pub dangerous_eval: bool,
    #[serde(default = "default_true")]
    pub string_execution: bool,
    #[serde(default = "default_true")]
    pub xss_inner_html: bool,
    #[serde(default = "default_true")]
    pub sql_injection: bool,
    #[serde(default = "default_true")]
    pub hardcoded_secret: bool,
    #[serde(default = "default_true")]
    pub weak_hash: bool,
    #[serde(default = "default_true")]
    pub insecure_random: bool,
}

impl Default for SecurityRules {
    fn default() -> Self {
        Self {
            dangerous_eval: true,
            string_execution: true,
            xss_inner_html: true,
            sql_injection: true,
            hardcoded_secret: true,
            weak_hash: true,
            insecure_random: true,
        }
    }
}

/// Per-category toggles for performance detectors. All enabled by default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerformanceRules {
    #[serde(default = "default_true")]
    pub nested_iteration: bool,
    #[serde(default = "default_true")]
    pub blocking_io: bool,
    #[serde(default = "default_true")]
    pub anti_patterns: bool,
}

impl Default for PerformanceRules {
    fn default() -> Self {
        Self {
            nested_iteration: true,
            blocking_io: true,
            anti_patterns: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub complexity: ComplexityThresholds,
    #[serde(default)]
    pub security: SecurityRules,
    #[serde(default)]
    pub performance: PerformanceRules,
}
