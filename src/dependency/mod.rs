pub mod graph;

use crate::core::ast::{node_text, walk, NodeKind};
use crate::core::{DependencyEdge, DependencyReport, EdgeKind, SourceFile};
use crate::parser::{self, SourceTree};
use graph::ModuleGraph;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Extensions tried, in order, when a relative specifier omits one.
const RESOLUTION_SUFFIXES: &[&str] = &[
    "", ".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", "/index.js", "/index.ts",
];

/// Dependency pass: per-file edge extraction runs in parallel; the cycle
/// search needs the whole graph and runs once after the merge.
pub fn analyze(files: &[SourceFile]) -> DependencyReport {
    let known: BTreeSet<String> = files
        .iter()
        .map(|f| normalize(&f.path.to_string_lossy()))
        .collect();

    let per_file: Vec<Vec<DependencyEdge>> = files
        .par_iter()
        .map(|file| match parser::parse_or_warn(file) {
            Some(tree) => extract_edges(&tree),
            None => Vec::new(),
        })
        .collect();

    let mut internal = BTreeSet::new();
    let mut external = BTreeSet::new();
    let mut module_graph = ModuleGraph::new();
    for path in &known {
        module_graph.add_node(path.clone());
    }

    let mut edges: Vec<DependencyEdge> = per_file.into_iter().flatten().collect();
    edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

    for edge in &edges {
        let from = normalize(&edge.from.to_string_lossy());
        match resolve(&from, &edge.to, &known) {
            Some(target) => {
                internal.insert(target.clone());
                // External packages never participate in a cycle; only
                // resolved files become graph edges.
                module_graph.add_edge(from, target);
            }
            None => {
                external.insert(edge.to.clone());
            }
        }
    }

    DependencyReport {
        internal,
        external,
        cycles: module_graph.detect_cycles(),
    }
}

/// Every import specifier and re-export in one file.
pub fn extract_edges(tree: &SourceTree) -> Vec<DependencyEdge> {
    let source = tree.source();
    let mut edges = Vec::new();

    walk(tree.root(), source, |node, kind, _| match kind {
        NodeKind::Import => {
            if let Some(spec) = node.child_by_field_name("source") {
                edges.push(edge(tree, node_text(&spec, source), EdgeKind::Import));
            }
        }
        NodeKind::Export => {
            if let Some(spec) = node.child_by_field_name("source") {
                edges.push(edge(tree, node_text(&spec, source), EdgeKind::Export));
            }
        }
        NodeKind::Call => {
            let Some(callee) = node.child_by_field_name("function") else {
                return;
            };
            // CommonJS require and dynamic import() both carry the
            // specifier as a string first argument.
            if callee.kind() == "import" || node_text(&callee, source) == "require" {
                let spec = node
                    .child_by_field_name("arguments")
                    .and_then(|args| args.named_child(0))
                    .filter(|arg| arg.kind() == "string");
                if let Some(spec) = spec {
                    edges.push(edge(tree, node_text(&spec, source), EdgeKind::Import));
                }
            }
        }
        _ => {}
    });

    edges
}

fn edge(tree: &SourceTree, raw_specifier: &str, kind: EdgeKind) -> DependencyEdge {
    DependencyEdge {
        from: tree.path().to_path_buf(),
        to: raw_specifier
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .to_string(),
        kind,
    }
}

/// Lexical resolution only: a specifier is internal when it is relative and
/// names a file in the analyzed set (directly or through a known suffix).
/// Nothing touches the file system.
fn resolve(from: &str, specifier: &str, known: &BTreeSet<String>) -> Option<String> {
    if !specifier.starts_with("./") && !specifier.starts_with("../") {
        return None;
    }
    let dir = match from.rfind('/') {
        Some(pos) => &from[..pos],
        None => "",
    };
    let joined = if dir.is_empty() {
        specifier.to_string()
    } else {
        format!("{dir}/{specifier}")
    };
    let base = normalize(&joined);
    RESOLUTION_SUFFIXES
        .iter()
        .map(|suffix| format!("{base}{suffix}"))
        .find(|candidate| known.contains(candidate))
}

/// Collapse `.` and `..` segments without consulting the file system.
fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_normalize_collapses_segments() {
        assert_eq!(normalize("src/./a/../b.js"), "src/b.js");
        assert_eq!(normalize("./a.js"), "a.js");
        assert_eq!(normalize("../a.js"), "../a.js");
    }

    #[test]
    fn test_import_forms_extracted() {
        let src = indoc! {r#"
            import { a } from './a';
            const b = require('./b.js');
            export { c } from './c';
            import('./lazy');
            import fs from 'fs';
        "#};
        let tree = parser::parse(&SourceFile::new("src/m.js", src)).unwrap();
        let edges = extract_edges(&tree);
        let specs: Vec<&str> = edges.iter().map(|e| e.to.as_str()).collect();
        assert_eq!(specs, vec!["./a", "./b.js", "./c", "./lazy", "fs"]);
        assert_eq!(edges[2].kind, EdgeKind::Export);
    }

    #[test]
    fn test_internal_external_classification() {
        let files = [
            SourceFile::new("src/a.js", "import { b } from './b'; import fs from 'fs';"),
            SourceFile::new("src/b.js", "export const b = 1;"),
        ];
        let report = analyze(&files);
        assert!(report.internal.contains("src/b.js"));
        assert!(report.external.contains("fs"));
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn test_unresolved_relative_specifier_is_external() {
        let files = [SourceFile::new(
            "src/a.js",
            "import { gone } from './missing';",
        )];
        let report = analyze(&files);
        assert!(report.internal.is_empty());
        assert!(report.external.contains("./missing"));
    }

    #[test]
    fn test_mutual_import_yields_exactly_one_cycle() {
        let files = [
            SourceFile::new("a.js", "import { b } from './b';"),
            SourceFile::new("b.js", "import { a } from './a';"),
        ];
        let report = analyze(&files);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0], vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_external_packages_never_in_cycles() {
        let files = [
            SourceFile::new("a.js", "import x from 'pkg'; import { b } from './b';"),
            SourceFile::new("b.js", "import y from 'pkg';"),
        ];
        let report = analyze(&files);
        assert!(report.cycles.is_empty());
        assert_eq!(report.external.len(), 1);
    }

    #[test]
    fn test_deterministic_across_input_order() {
        let a = SourceFile::new("a.js", "import { b } from './b';");
        let b = SourceFile::new("b.js", "import { a } from './a';");
        let forward = analyze(&[a.clone(), b.clone()]);
        let backward = analyze(&[b, a]);
        assert_eq!(forward, backward);
    }
}
