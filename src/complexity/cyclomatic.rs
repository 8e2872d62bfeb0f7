use crate::core::ast::{walk, NodeKind};
use tree_sitter::Node;

/// Cyclomatic complexity: 1 + the number of decision points in the span.
/// Decision points are `if` (an `else if` parses as a nested `if`), ternary,
/// `case`, every loop form, `catch`, and each short-circuit `&&`/`||`.
pub fn cyclomatic_complexity(node: Node, source: &str) -> u32 {
    let mut complexity = 1u32;
    walk(node, source, |_, kind, _| {
        if is_decision_point(kind) {
            complexity += 1;
        }
    });
    complexity
}

fn is_decision_point(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::If
            | NodeKind::Ternary
            | NodeKind::SwitchCase
            | NodeKind::Loop
            | NodeKind::Catch
            | NodeKind::LogicalOp
    )
}
