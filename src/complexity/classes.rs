use super::cyclomatic::cyclomatic_complexity;
use crate::core::ast::{node_line, node_text, walk, NodeKind};
use crate::core::ClassMetrics;
use crate::parser::SourceTree;
use std::collections::BTreeSet;
use tree_sitter::Node;

const COHESION_WARNING: f64 = 0.3;
const CLASS_COMPLEXITY_WARNING: u32 = 50;

pub fn extract_classes(tree: &SourceTree) -> Vec<ClassMetrics> {
    let mut classes = Vec::new();
    walk(tree.root(), tree.source(), |node, kind, _| {
        if kind == NodeKind::Class {
            classes.push(analyze_class(node, tree));
        }
    });
    classes
}

fn analyze_class(node: Node, tree: &SourceTree) -> ClassMetrics {
    let source = tree.source();
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())
        .unwrap_or_else(|| "<anonymous>".to_string());

    let mut methods = Vec::new();
    let mut properties = Vec::new();
    let mut complexity = 0u32;
    let mut field_sets: Vec<BTreeSet<String>> = Vec::new();

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match NodeKind::of(&member, source) {
                NodeKind::Method => {
                    let method_name = member
                        .child_by_field_name("name")
                        .map(|n| node_text(&n, source).to_string())
                        .unwrap_or_else(|| "<anonymous>".to_string());
                    complexity += cyclomatic_complexity(member, source);
                    field_sets.push(instance_fields(member, source));
                    methods.push(method_name);
                }
                NodeKind::Field => {
                    if let Some(prop) = member.child_by_field_name("property") {
                        properties.push(node_text(&prop, source).to_string());
                    }
                }
                _ => {}
            }
        }
    }

    let cohesion = cohesion_of(&field_sets);

    let mut warnings = Vec::new();
    if methods.len() >= 2 && cohesion < COHESION_WARNING {
        warnings.push(format!(
            "class '{name}' has low cohesion ({cohesion:.2}); methods share few instance fields"
        ));
    }
    if complexity > CLASS_COMPLEXITY_WARNING {
        warnings.push(format!(
            "class '{name}' has aggregate complexity {complexity} (limit {CLASS_COMPLEXITY_WARNING})"
        ));
    }

    ClassMetrics {
        name,
        file: tree.path().to_path_buf(),
        line: node_line(&node),
        complexity,
        methods,
        properties,
        cohesion,
        warnings,
    }
}

/// Instance fields a method touches, collected from `this.x` references.
fn instance_fields(method: Node, source: &str) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    walk(method, source, |node, kind, _| {
        if kind == NodeKind::Member {
            let is_this = node
                .child_by_field_name("object")
                .map(|obj| obj.kind() == "this")
                .unwrap_or(false);
            if is_this {
                if let Some(prop) = node.child_by_field_name("property") {
                    fields.insert(node_text(&prop, source).to_string());
                }
            }
        }
    });
    fields
}

/// LCOM-style heuristic: methods sharing at least one instance field merge
/// into a cluster; a method touching no fields is its own cluster.
/// cohesion = 1 - clusters/methods, clamped to [0, 1].
fn cohesion_of(field_sets: &[BTreeSet<String>]) -> f64 {
    let methods = field_sets.len();
    if methods == 0 {
        return 1.0;
    }

    let mut parent: Vec<usize> = (0..methods).collect();

    fn find(parent: &mut [usize], i: usize) -> usize {
        let mut root = i;
        while parent[root] != root {
            root = parent[root];
        }
        let mut cur = i;
        while parent[cur] != root {
            let next = parent[cur];
            parent[cur] = root;
            cur = next;
        }
        root
    }

    for i in 0..methods {
        for j in (i + 1)..methods {
            if !field_sets[i].is_disjoint(&field_sets[j])
                && !field_sets[i].is_empty()
                && !field_sets[j].is_empty()
            {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }

    let clusters = (0..methods)
        .map(|i| find(&mut parent, i))
        .collect::<BTreeSet<_>>()
        .len();

    (1.0 - clusters as f64 / methods as f64).clamp(0.0, 1.0)
}
