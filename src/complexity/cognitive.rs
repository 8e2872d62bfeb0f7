use crate::core::ast::{walk, NodeKind};
use tree_sitter::Node;

/// Cognitive complexity: every decision point cyclomatic counts, but
/// structural ones are weighted by how deeply they are nested (a decision at
/// depth 1 contributes 1, at depth 2 contributes 2, ...) and chained
/// `&&`/`||` operators add a flat boolean-sequence penalty of 1 each.
/// Nesting costs more than breadth, which is the point: this approximates
/// reading difficulty, not path count.
pub fn cognitive_complexity(node: Node, source: &str) -> u32 {
    let mut total = 0u32;
    walk(node, source, |_, kind, depth| {
        total += match kind {
            // These open their own nesting level; depth excludes it, so the
            // 1-based weight is depth + 1.
            NodeKind::If | NodeKind::Loop => depth + 1,
            NodeKind::Ternary => depth + 1,
            // A case sits inside its switch and a catch inside its try, so
            // the enclosing construct already supplied the level.
            NodeKind::SwitchCase | NodeKind::Catch => depth.max(1),
            NodeKind::LogicalOp => 1,
            _ => 0,
        };
    });
    total
}

/// Maximum block nesting level inside the span.
pub fn max_nesting(node: Node, source: &str) -> u32 {
    let mut max = 0u32;
    walk(node, source, |_, kind, depth| {
        max = max.max(depth + u32::from(kind.increases_nesting()));
    });
    max
}
