//! Grammar-aware security rules. These see call-expression shape and
//! assignment targets, so they carry more signal than the textual rules in
//! `text_rules`, but they still have no semantic scope information.

use crate::config::SecurityRules;
use crate::core::ast::{node_line, node_text, trailing_name, walk, NodeKind};
use crate::core::{Severity, Vulnerability};
use crate::parser::SourceTree;
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

static SQL_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(select\s+.+\s+from|insert\s+into|update\s+\w+\s+set|delete\s+from)\b")
        .expect("sql keyword pattern")
});

const HTML_SINKS: &[&str] = &["innerHTML", "outerHTML"];
const SCHEDULERS: &[&str] = &["setTimeout", "setInterval"];

pub fn scan(tree: &SourceTree, rules: &SecurityRules) -> Vec<Vulnerability> {
    let source = tree.source();
    let mut found = Vec::new();

    walk(tree.root(), source, |node, kind, _| match kind {
        NodeKind::Call => check_call(node, tree, rules, &mut found),
        NodeKind::Assignment => check_assignment(node, tree, rules, &mut found),
        NodeKind::TemplateString => check_template_query(node, tree, rules, &mut found),
        NodeKind::Concat => check_concat_query(node, tree, rules, &mut found),
        _ => {}
    });

    found
}

fn check_call(node: Node, tree: &SourceTree, rules: &SecurityRules, found: &mut Vec<Vulnerability>) {
    let source = tree.source();
    let Some(callee) = node.child_by_field_name("function") else {
        return;
    };
    let callee_name = trailing_name(&callee, source);

    if rules.dangerous_eval && callee_name == "eval" {
        found.push(vulnerability(
            "dangerous-eval",
            Severity::Critical,
            "dynamic code execution via eval()",
            tree,
            node,
            Some("replace eval with direct function calls or JSON.parse"),
        ));
    }

    if rules.string_execution && SCHEDULERS.contains(&callee_name) {
        if let Some(first_arg) = first_argument(node) {
            if is_string_shaped(&first_arg, source) {
                found.push(vulnerability(
                    "string-execution",
                    Severity::High,
                    &format!("string passed to {callee_name}() is evaluated as code"),
                    tree,
                    node,
                    Some("pass a function reference instead of a string"),
                ));
            }
        }
    }
}

fn check_assignment(
    node: Node,
    tree: &SourceTree,
    rules: &SecurityRules,
    found: &mut Vec<Vulnerability>,
) {
    if !rules.xss_inner_html {
        return;
    }
    let source = tree.source();
    let Some(left) = node.child_by_field_name("left") else {
        return;
    };
    if NodeKind::of(&left, source) != NodeKind::Member {
        return;
    }
    let sink = left
        .child_by_field_name("property")
        .map(|p| node_text(&p, source))
        .unwrap_or("");
    if !HTML_SINKS.contains(&sink) {
        return;
    }
    let assigns_literal = node
        .child_by_field_name("right")
        .map(|r| NodeKind::of(&r, source) == NodeKind::StringLit)
        .unwrap_or(true);
    if !assigns_literal {
        found.push(vulnerability(
            "xss-innerHTML",
            Severity::High,
            &format!("non-literal value assigned to {sink}"),
            tree,
            node,
            Some("sanitize the value or use textContent"),
        ));
    }
}

fn check_template_query(
    node: Node,
    tree: &SourceTree,
    rules: &SecurityRules,
    found: &mut Vec<Vulnerability>,
) {
    if !rules.sql_injection {
        return;
    }
    let source = tree.source();
    let text = node_text(&node, source);
    if !SQL_KEYWORD.is_match(text) {
        return;
    }
    let mut cursor = node.walk();
    let interpolates = node
        .children(&mut cursor)
        .any(|c| c.kind() == "template_substitution");
    if interpolates {
        found.push(vulnerability(
            "sql-injection",
            Severity::High,
            "query built by interpolating variables into a template string",
            tree,
            node,
            Some("use parameterized queries"),
        ));
    }
}

fn check_concat_query(
    node: Node,
    tree: &SourceTree,
    rules: &SecurityRules,
    found: &mut Vec<Vulnerability>,
) {
    if !rules.sql_injection {
        return;
    }
    let source = tree.source();
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return;
    };

    // One side is a query-looking string literal, the other is dynamic.
    let sides = [(&left, &right), (&right, &left)];
    for (literal, dynamic) in sides {
        if NodeKind::of(literal, source) == NodeKind::StringLit
            && SQL_KEYWORD.is_match(node_text(literal, source))
            && NodeKind::of(dynamic, source) != NodeKind::StringLit
        {
            found.push(vulnerability(
                "sql-injection",
                Severity::High,
                "query built by concatenating a variable into a SQL string",
                tree,
                node,
                Some("use parameterized queries"),
            ));
            return;
        }
    }
}

fn first_argument<'a>(call: Node<'a>) -> Option<Node<'a>> {
    call.child_by_field_name("arguments")
        .and_then(|args| args.named_child(0))
}

/// Whether an expression is provably string-valued: a literal, a template,
/// or a concatenation involving one. Bare identifiers are not flagged; the
/// common `setTimeout(fn, ms)` idiom passes a function by name and cannot be
/// distinguished without type information.
fn is_string_shaped(node: &Node, source: &str) -> bool {
    match NodeKind::of(node, source) {
        NodeKind::StringLit | NodeKind::TemplateString => true,
        NodeKind::Concat => {
            let left = node.child_by_field_name("left");
            let right = node.child_by_field_name("right");
            [left, right]
                .into_iter()
                .flatten()
                .any(|side| is_string_shaped(&side, source))
        }
        _ => false,
    }
}

fn vulnerability(
    kind: &str,
    severity: Severity,
    message: &str,
    tree: &SourceTree,
    node: Node,
    suggestion: Option<&str>,
) -> Vulnerability {
    Vulnerability {
        kind: kind.to_string(),
        severity,
        message: message.to_string(),
        file: tree.path().to_path_buf(),
        line: Some(node_line(&node)),
        suggestion: suggestion.map(str::to_string),
    }
}
