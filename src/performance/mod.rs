use crate::config::PerformanceRules;
use crate::core::ast::{node_line, trailing_name, NodeKind};
use crate::core::{Bottleneck, Impact, PerformanceReport, SourceFile};
use crate::parser::{self, SourceTree};
use rayon::prelude::*;
use tree_sitter::Node;

const DOM_QUERIES: &[&str] = &[
    "querySelector",
    "querySelectorAll",
    "getElementById",
    "getElementsByClassName",
    "getElementsByTagName",
];

/// Performance pass: hard-scored bottlenecks plus unscored anti-pattern
/// notes. Per-file isolation as everywhere else; syntax errors suppress
/// only the unparseable spans, not the rest of the file.
pub fn analyze(files: &[SourceFile], rules: &PerformanceRules) -> PerformanceReport {
    let per_file: Vec<(Vec<Bottleneck>, Vec<String>)> = files
        .par_iter()
        .map(|file| match parser::parse_or_warn(file) {
            Some(tree) => scan_tree(&tree, rules),
            None => (Vec::new(), Vec::new()),
        })
        .collect();

    let mut bottlenecks = Vec::new();
    let mut anti_patterns = Vec::new();
    for (found, notes) in per_file {
        bottlenecks.extend(found);
        anti_patterns.extend(notes);
    }
    bottlenecks.sort_by(|a, b| (&a.file, a.line, &a.kind).cmp(&(&b.file, b.line, &b.kind)));
    anti_patterns.sort();
    anti_patterns.dedup();

    PerformanceReport {
        bottlenecks,
        anti_patterns,
    }
}

/// Single stack-based pass tracking loop depth explicitly: nested loops,
/// blocking synchronous calls, and in-loop anti-patterns all fall out of the
/// same traversal.
fn scan_tree(tree: &SourceTree, rules: &PerformanceRules) -> (Vec<Bottleneck>, Vec<String>) {
    let source = tree.source();
    let mut bottlenecks = Vec::new();
    let mut anti_patterns = Vec::new();

    let mut stack: Vec<(Node, u32)> = vec![(tree.root(), 0)];
    while let Some((node, loop_depth)) = stack.pop() {
        // Unparseable spans are skipped; their siblings still get scanned.
        if node.is_error() || node.is_missing() {
            continue;
        }
        let kind = NodeKind::of(&node, source);
        let depth_here = loop_depth + u32::from(kind == NodeKind::Loop);

        match kind {
            NodeKind::Loop if rules.nested_iteration && depth_here >= 2 => {
                // Quadratic at depth two; anything deeper compounds.
                let severity = if depth_here >= 3 {
                    Impact::High
                } else {
                    Impact::Medium
                };
                bottlenecks.push(Bottleneck {
                    kind: "nested-iteration".to_string(),
                    severity,
                    file: tree.path().to_path_buf(),
                    line: Some(node_line(&node)),
                    description: format!("loop nested {depth_here} levels deep"),
                });
            }
            NodeKind::Call => {
                if let Some(callee) = node.child_by_field_name("function") {
                    let name = trailing_name(&callee, source);
                    if rules.blocking_io && name.len() > 4 && name.ends_with("Sync") {
                        bottlenecks.push(Bottleneck {
                            kind: "blocking-io".to_string(),
                            severity: Impact::High,
                            file: tree.path().to_path_buf(),
                            line: Some(node_line(&node)),
                            description: format!("synchronous call {name}() blocks the event loop"),
                        });
                    }
                    if rules.anti_patterns && loop_depth >= 1 && DOM_QUERIES.contains(&name) {
                        anti_patterns.push(format!(
                            "dom-query-in-loop: {name}() at {}:{}",
                            tree.path().display(),
                            node_line(&node)
                        ));
                    }
                }
            }
            NodeKind::Await if rules.anti_patterns && loop_depth >= 1 => {
                anti_patterns.push(format!(
                    "await-in-loop: sequential await at {}:{}",
                    tree.path().display(),
                    node_line(&node)
                ));
            }
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push((child, depth_here));
        }
    }

    (bottlenecks, anti_patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn analyze_source(source: &str) -> PerformanceReport {
        analyze(
            &[SourceFile::new("t.js", source)],
            &PerformanceRules::default(),
        )
    }

    #[test]
    fn test_single_loop_not_flagged() {
        let report = analyze_source("for (const x of xs) { f(x); }");
        assert!(report.bottlenecks.is_empty());
    }

    #[test]
    fn test_double_loop_is_medium() {
        let report = analyze_source(indoc! {"
            for (const a of xs) {
              for (const b of ys) { f(a, b); }
            }
        "});
        assert_eq!(report.bottlenecks.len(), 1);
        assert_eq!(report.bottlenecks[0].kind, "nested-iteration");
        assert_eq!(report.bottlenecks[0].severity, Impact::Medium);
    }

    #[test]
    fn test_triple_loop_escalates_to_high() {
        let report = analyze_source(indoc! {"
            for (const a of xs) {
              for (const b of ys) {
                for (const c of zs) { f(a, b, c); }
              }
            }
        "});
        assert!(report
            .bottlenecks
            .iter()
            .any(|b| b.kind == "nested-iteration" && b.severity == Impact::High));
    }

    #[test]
    fn test_blocking_sync_call_flagged() {
        let report = analyze_source("const data = fs.readFileSync(path);");
        assert_eq!(report.bottlenecks.len(), 1);
        assert_eq!(report.bottlenecks[0].kind, "blocking-io");
        assert_eq!(report.bottlenecks[0].severity, Impact::High);
    }

    #[test]
    fn test_await_in_loop_recorded_as_anti_pattern() {
        let report = analyze_source(indoc! {"
            async function drain(items) {
              for (const item of items) {
                await push(item);
              }
            }
        "});
        assert!(report.bottlenecks.is_empty());
        assert_eq!(report.anti_patterns.len(), 1);
        assert!(report.anti_patterns[0].starts_with("await-in-loop"));
    }

    #[test]
    fn test_dom_query_in_loop_recorded() {
        let report = analyze_source(indoc! {"
            while (more) {
              const el = document.querySelector('.row');
            }
        "});
        assert!(report
            .anti_patterns
            .iter()
            .any(|p| p.starts_with("dom-query-in-loop")));
    }

    #[test]
    fn test_toggles_disable_categories() {
        let rules = PerformanceRules {
            nested_iteration: false,
            ..PerformanceRules::default()
        };
        let report = analyze(
            &[SourceFile::new(
                "t.js",
                "for (;;) { for (;;) { f(); } }",
            )],
            &rules,
        );
        assert!(report.bottlenecks.is_empty());
    }
}
