pub mod ast_rules;
pub mod text_rules;

use crate::config::SecurityRules;
use crate::core::{SecurityReport, Severity, SourceFile, Vulnerability};
use crate::parser;
use rayon::prelude::*;

/// Security pass. AST rules run over the recovered tree, skipping any
/// unparseable spans; textual rules see the raw content regardless. A
/// malformed file therefore degrades instead of dropping out of the scan.
pub fn analyze(files: &[SourceFile], rules: &SecurityRules) -> SecurityReport {
    let per_file: Vec<Vec<Vulnerability>> = files
        .par_iter()
        .map(|file| {
            let mut found = Vec::new();
            if let Some(tree) = parser::parse_or_warn(file) {
                found.extend(ast_rules::scan(&tree, rules));
            }
            found.extend(text_rules::scan(file, rules));
            found
        })
        .collect();

    let mut vulnerabilities: Vec<Vulnerability> = per_file.into_iter().flatten().collect();
    vulnerabilities.sort_by(|a, b| {
        (&a.file, a.line, &a.kind, b.severity).cmp(&(&b.file, b.line, &b.kind, a.severity))
    });
    // Identical (file, line, type) findings collapse to one, keeping the
    // most severe; the AST and textual rule classes overlap by design.
    vulnerabilities.dedup_by(|a, b| a.file == b.file && a.line == b.line && a.kind == b.kind);

    let score = score_from(&vulnerabilities);
    SecurityReport {
        vulnerabilities,
        score,
    }
}

/// Score contract: 100 - 20*critical - 10*high - 5*medium - 2*low, clamped
/// to [0, 100]. Downstream consumers rely on these exact weights.
pub fn score_from(vulnerabilities: &[Vulnerability]) -> u32 {
    let penalty: i64 = vulnerabilities
        .iter()
        .map(|v| match v.severity {
            Severity::Critical => 20,
            Severity::High => 10,
            Severity::Medium => 5,
            Severity::Low => 2,
        })
        .sum();
    (100 - penalty).clamp(0, 100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn vuln(kind: &str, severity: Severity, line: usize) -> Vulnerability {
        Vulnerability {
            kind: kind.to_string(),
            severity,
            message: String::new(),
            file: PathBuf::from("t.js"),
            line: Some(line),
            suggestion: None,
        }
    }

    #[test]
    fn test_score_formula_one_of_each() {
        let vulns = vec![
            vuln("dangerous-eval", Severity::Critical, 1),
            vuln("sql-injection", Severity::High, 2),
            vuln("weak-hash", Severity::Medium, 3),
            vuln("insecure-random", Severity::Low, 4),
        ];
        assert_eq!(score_from(&vulns), 63);
    }

    #[test]
    fn test_score_clamped_to_zero() {
        let vulns: Vec<_> = (0..10)
            .map(|i| vuln("dangerous-eval", Severity::Critical, i))
            .collect();
        assert_eq!(score_from(&vulns), 0);
    }

    #[test]
    fn test_clean_input_scores_100() {
        assert_eq!(score_from(&[]), 100);
    }

    #[test]
    fn test_overlapping_rule_classes_deduplicate() {
        // This concatenated query trips both the AST rule and the textual
        // rule on the same line; the report must carry it once.
        let files = [SourceFile::new(
            "q.js",
            r#"const q = "SELECT id FROM users WHERE name = " + name;"#,
        )];
        let report = analyze(&files, &SecurityRules::default());
        assert_eq!(report.vulnerabilities.len(), 1);
        assert_eq!(report.vulnerabilities[0].kind, "sql-injection");
        assert_eq!(report.score, 90);
    }

    #[test]
    fn test_malformed_file_still_gets_text_findings() {
        let files = [SourceFile::new(
            "broken.js",
            "function f( {\nconst password = \"hunter2hunter2\";",
        )];
        let report = analyze(&files, &SecurityRules::default());
        assert_eq!(report.vulnerabilities.len(), 1);
        assert_eq!(report.vulnerabilities[0].kind, "hardcoded-secret");
    }

    #[test]
    fn test_ast_rules_survive_syntax_error_later_in_file() {
        let files = [SourceFile::new(
            "partial.js",
            "eval(cmd);\nfunction bad( { if (x) {",
        )];
        let report = analyze(&files, &SecurityRules::default());
        assert!(report
            .vulnerabilities
            .iter()
            .any(|v| v.kind == "dangerous-eval"));
    }

    #[test]
    fn test_findings_sorted_deterministically() {
        let files = [
            SourceFile::new("b.js", "eval(x);"),
            SourceFile::new("a.js", "eval(y);"),
        ];
        let report = analyze(&files, &SecurityRules::default());
        assert_eq!(report.vulnerabilities[0].file, PathBuf::from("a.js"));
        assert_eq!(report.vulnerabilities[1].file, PathBuf::from("b.js"));
    }
}
